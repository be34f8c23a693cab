//! Table extraction pipeline.
//!
//! One call parses the page once, locates every table, builds its grid and
//! optionally harvests its context. The extractor holds no mutable state, so
//! a single instance can serve any number of threads.

use std::sync::Arc;

use crate::error::Result;
use crate::model::{Diagnostic, ExtractedTable, ExtractionStats, RawTable};
use crate::parser::{
    ContextHarvester, ExtractOptions, GridBuilder, HeadingContextHarvester, HtmlParser,
    NestedTables, NoopHarvester, TableLocator,
};

/// Tables of one page together with what was absorbed while extracting them.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Extracted tables in document order
    pub tables: Vec<ExtractedTable>,

    /// Counts over the tables and diagnostics
    pub stats: ExtractionStats,

    /// Non-fatal irregularities in the order they were found
    pub diagnostics: Vec<Diagnostic>,
}

/// Extracts normalized tables from HTML pages.
///
/// # Example
///
/// ```
/// use untable::TableExtractor;
///
/// let html = "<h2>Mountains</h2><table><tr><td rowspan=2>Everest</td><td>8849</td></tr>\
///             <tr><td>29032</td></tr></table>";
/// let tables = TableExtractor::default()
///     .extract("https://example.org/peaks", html, true, true, true)?;
///
/// assert_eq!(tables.len(), 1);
/// assert_eq!(tables[0].grid.texts(), vec![vec!["Everest", "8849"], vec!["Everest", "29032"]]);
/// assert_eq!(tables[0].id, "https://example.org/peaks?table_no=0");
/// # Ok::<(), untable::Error>(())
/// ```
#[derive(Clone)]
pub struct TableExtractor {
    parser: HtmlParser,
    locator: TableLocator,
    harvester: Arc<dyn ContextHarvester>,
}

impl TableExtractor {
    /// Create an extractor using the given context harvester.
    pub fn new(harvester: Arc<dyn ContextHarvester>) -> Self {
        Self {
            parser: HtmlParser::new(),
            locator: TableLocator::new(),
            harvester,
        }
    }

    /// Create an extractor that never attaches context.
    pub fn without_context() -> Self {
        Self::new(Arc::new(NoopHarvester))
    }

    /// Extract all tables of a page.
    ///
    /// # Arguments
    ///
    /// * `url` - Page URL, used for table ids and context
    /// * `html` - Page markup
    /// * `auto_span` - Resolve row and column spans
    /// * `auto_pad` - Pad rows to a rectangular grid
    /// * `extract_context` - Harvest caption, headings and surrounding text
    pub fn extract(
        &self,
        url: &str,
        html: &str,
        auto_span: bool,
        auto_pad: bool,
        extract_context: bool,
    ) -> Result<Vec<ExtractedTable>> {
        let options = ExtractOptions::new()
            .with_auto_span(auto_span)
            .with_auto_pad(auto_pad)
            .with_context(extract_context);
        self.extract_with_options(url, html, &options)
    }

    /// Extract all tables of a page with options.
    pub fn extract_with_options(
        &self,
        url: &str,
        html: &str,
        options: &ExtractOptions,
    ) -> Result<Vec<ExtractedTable>> {
        Ok(self.extract_with_stats(url, html, options)?.tables)
    }

    /// Extract all tables of a page, reporting statistics and diagnostics.
    pub fn extract_with_stats(
        &self,
        url: &str,
        html: &str,
        options: &ExtractOptions,
    ) -> Result<ExtractionReport> {
        let tree = self.parser.parse(html)?;

        let mut diagnostics = Vec::new();
        let raw_tables = self.locator.locate_with_diagnostics(&tree, &mut diagnostics);
        let builder = GridBuilder::from_options(options);
        let page_title = if options.extract_context {
            tree.title()
        } else {
            None
        };

        let mut tables = Vec::with_capacity(raw_tables.len());
        let mut nodes = Vec::with_capacity(raw_tables.len());

        for (index, raw) in raw_tables.iter().enumerate() {
            if options.nested == NestedTables::InnermostOnly && wraps_table(raw, &raw_tables) {
                log::debug!("Skipping {}: contains another table", raw.source_path);
                continue;
            }

            let grid = builder.build_with_diagnostics(raw, &mut diagnostics);
            let mut table = ExtractedTable::new(grid, raw.source_path.clone(), raw.nesting_depth);
            table.index = index as u32;
            table.id = table_id(url, table.index);
            table.attrs = raw.attrs.clone();

            tables.push(table);
            nodes.push(raw.node);
        }

        if options.extract_context {
            let contexts = self
                .harvester
                .harvest_all(&tree, &nodes, page_title.as_deref(), url);
            for (table, context) in tables.iter_mut().zip(contexts) {
                table.context = context;
            }
        }

        let mut stats = ExtractionStats::new();
        for table in &tables {
            count_table(&mut stats, table);
        }
        for diagnostic in &diagnostics {
            stats.record(diagnostic);
        }

        log::debug!(
            "Extracted {} tables from {} ({} diagnostics)",
            tables.len(),
            url,
            diagnostics.len()
        );

        Ok(ExtractionReport {
            tables,
            stats,
            diagnostics,
        })
    }

    /// Extract tables from many pages.
    ///
    /// Pages are independent; results keep the input order. With the
    /// `parallel` feature pages are processed on rayon's thread pool.
    pub fn extract_batch(
        &self,
        pages: &[(&str, &str)],
        options: &ExtractOptions,
    ) -> Vec<Result<Vec<ExtractedTable>>> {
        #[cfg(feature = "parallel")]
        let results = {
            use rayon::prelude::*;
            pages
                .par_iter()
                .map(|(url, html)| self.extract_with_options(url, html, options))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let results = pages
            .iter()
            .map(|(url, html)| self.extract_with_options(url, html, options))
            .collect();

        results
    }
}

impl Default for TableExtractor {
    fn default() -> Self {
        Self::new(Arc::new(HeadingContextHarvester::new()))
    }
}

impl std::fmt::Debug for TableExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableExtractor").finish_non_exhaustive()
    }
}

/// Id of a table: the page URL with a `table_no` query parameter.
///
/// The parameter is appended to an existing query and placed before any
/// fragment.
pub fn table_id(url: &str, index: u32) -> String {
    let (base, fragment) = url.split_at(url.find('#').unwrap_or(url.len()));
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}table_no={}{}", base, separator, index, fragment)
}

fn wraps_table(raw: &RawTable, all: &[RawTable]) -> bool {
    let prefix = format!("{}/", raw.source_path);
    all.iter()
        .any(|other| other.nesting_depth > raw.nesting_depth && other.source_path.starts_with(&prefix))
}

fn count_table(stats: &mut ExtractionStats, table: &ExtractedTable) {
    stats.table_count += 1;
    if table.is_nested() {
        stats.nested_table_count += 1;
    }
    if table.context.is_some() {
        stats.context_count += 1;
    }
    for cell in table.grid.rows.iter().flatten() {
        stats.cell_count += 1;
        if cell.is_padding() {
            stats.padding_count += 1;
        } else if cell.is_spanned_fill {
            stats.spanned_fill_count += 1;
        }
    }
}
