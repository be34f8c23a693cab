//! Extraction options and configuration.

/// Options for extracting tables from a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Skip columns occupied by spans from earlier rows when placing cells
    pub auto_span: bool,

    /// Pad short rows with empty cells so the grid is rectangular
    pub auto_pad: bool,

    /// Harvest caption, heading chain and surrounding text
    pub extract_context: bool,

    /// Which tables to return
    pub nested: NestedTables,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable span resolution.
    pub fn with_auto_span(mut self, auto_span: bool) -> Self {
        self.auto_span = auto_span;
        self
    }

    /// Enable or disable padding.
    pub fn with_auto_pad(mut self, auto_pad: bool) -> Self {
        self.auto_pad = auto_pad;
        self
    }

    /// Enable or disable context harvesting.
    pub fn with_context(mut self, extract_context: bool) -> Self {
        self.extract_context = extract_context;
        self
    }

    /// Set which tables to return.
    pub fn with_nested(mut self, nested: NestedTables) -> Self {
        self.nested = nested;
        self
    }

    /// Return only tables that contain no other table.
    pub fn innermost_only(mut self) -> Self {
        self.nested = NestedTables::InnermostOnly;
        self
    }

    /// Keep cells exactly where the markup puts them.
    pub fn raw(mut self) -> Self {
        self.auto_span = false;
        self.auto_pad = false;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            auto_span: true,
            auto_pad: true,
            extract_context: false,
            nested: NestedTables::All,
        }
    }
}

/// Which tables of a page are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NestedTables {
    /// Every table, outer and nested
    #[default]
    All,
    /// Only tables without a nested table (layout wrappers are dropped)
    InnermostOnly,
}

/// Options for context harvesting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    /// Maximum characters kept for caption and surrounding text (0 = unlimited)
    pub max_context_chars: usize,

    /// Preceding element siblings inspected for a caption-like label
    pub caption_lookback: usize,
}

impl ContextOptions {
    /// Create new context options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text bound.
    pub fn with_max_context_chars(mut self, max: usize) -> Self {
        self.max_context_chars = max;
        self
    }

    /// Set the caption lookback bound.
    pub fn with_caption_lookback(mut self, lookback: usize) -> Self {
        self.caption_lookback = lookback;
        self
    }
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            max_context_chars: 512,
            caption_lookback: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_options_builder() {
        let options = ExtractOptions::new()
            .with_auto_span(false)
            .with_context(true)
            .innermost_only();

        assert!(!options.auto_span);
        assert!(options.auto_pad);
        assert!(options.extract_context);
        assert_eq!(options.nested, NestedTables::InnermostOnly);
    }

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        assert!(options.auto_span);
        assert!(options.auto_pad);
        assert!(!options.extract_context);
        assert_eq!(options.nested, NestedTables::All);

        let raw = ExtractOptions::new().raw();
        assert!(!raw.auto_span && !raw.auto_pad);
    }

    #[test]
    fn test_context_options() {
        let options = ContextOptions::new()
            .with_max_context_chars(64)
            .with_caption_lookback(0);
        assert_eq!(options.max_context_chars, 64);
        assert_eq!(options.caption_lookback, 0);
        assert_eq!(ContextOptions::default().max_context_chars, 512);
    }
}
