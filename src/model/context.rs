//! Page context attached to an extracted table.

use serde::{Deserialize, Serialize};

/// A section heading that is open where a table appears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading level (1-6)
    pub level: u8,

    /// Heading text
    pub text: String,
}

impl Heading {
    /// Create a new heading.
    pub fn new(level: u8, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// Where a table sits in its page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Table caption or nearby caption-like label
    pub caption: Option<String>,

    /// Open section headings, outermost first
    pub heading_chain: Vec<Heading>,

    /// Nearest text before the table
    pub preceding_text: Option<String>,

    /// Nearest text after the table
    pub following_text: Option<String>,

    /// Page title supplied by the caller
    pub page_title: Option<String>,

    /// Page URL supplied by the caller
    pub page_url: String,
}

impl Context {
    /// Create an empty context for a page.
    pub fn new(page_url: impl Into<String>) -> Self {
        Self {
            page_url: page_url.into(),
            ..Default::default()
        }
    }

    /// Innermost open heading.
    pub fn nearest_heading(&self) -> Option<&Heading> {
        self.heading_chain.last()
    }

    /// Heading texts joined outermost to innermost with ` > `.
    pub fn heading_path(&self) -> String {
        self.heading_chain
            .iter()
            .map(|h| h.text.as_str())
            .collect::<Vec<_>>()
            .join(" > ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_path() {
        let mut context = Context::new("https://example.org");
        assert!(context.nearest_heading().is_none());
        assert_eq!(context.heading_path(), "");

        context.heading_chain.push(Heading::new(1, "Geography"));
        context.heading_chain.push(Heading::new(2, "Mountains"));
        assert_eq!(context.heading_path(), "Geography > Mountains");
        assert_eq!(context.nearest_heading().map(|h| h.level), Some(2));
    }
}
