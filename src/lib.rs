//! # untable
//!
//! Table extraction from real-world HTML pages.
//!
//! This library finds every `<table>` in a page, resolves row and column
//! spans into a rectangular grid and, on request, records where the table
//! sits in the page: its caption, the open section headings and the nearest
//! text around it.
//!
//! ## Quick Start
//!
//! ```
//! use untable::extract_tables;
//!
//! fn main() -> untable::Result<()> {
//!     let html = "<table><tr><th>Peak</th><th>Height</th></tr>\
//!                 <tr><td>Everest</td><td>8849</td></tr></table>";
//!     let tables = extract_tables("https://example.org/", html)?;
//!
//!     assert_eq!(tables[0].grid.width, 2);
//!     let bytes = tables[0].to_bytes()?;
//!     assert_eq!(untable::ExtractedTable::from_bytes(&bytes)?, tables[0]);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Tolerant parsing**: malformed markup is recovered the way browsers do
//! - **Span resolution**: `rowspan`/`colspan` expanded into spanned copies
//! - **Padding**: ragged rows padded into a rectangular grid
//! - **Page context**: caption, heading chain and surrounding text
//! - **Serialization**: compact binary encoding and JSON
//! - **Parallel batches**: uses Rayon for many pages at once

pub mod codec;
pub mod error;
pub mod extractor;
pub mod model;
pub mod parser;
pub mod text;

// Re-export commonly used types
pub use codec::JsonFormat;
pub use error::{Error, Result};
pub use extractor::{table_id, ExtractionReport, TableExtractor};
pub use model::{
    CellKind, CellOrigin, Context, Diagnostic, DocumentTree, ExtractedTable, ExtractionStats,
    Grid, GridCell, Heading, NodeId, RawCell, RawRow, RawTable,
};
pub use parser::{
    ContextHarvester, ContextOptions, ExtractOptions, GridBuilder, HeadingContextHarvester,
    HtmlParser, NestedTables, NoopHarvester, TableLocator,
};

use std::path::Path;

/// Extract tables from a page with span resolution and padding, without context.
///
/// # Arguments
///
/// * `url` - Page URL, used for table ids
/// * `html` - Page markup
///
/// # Example
///
/// ```
/// let tables = untable::extract_tables("u", "<table><tr><td>a</td></tr></table>").unwrap();
/// assert_eq!(tables[0].grid.texts(), vec![vec!["a"]]);
/// ```
pub fn extract_tables(url: &str, html: &str) -> Result<Vec<ExtractedTable>> {
    extract_tables_with_options(url, html, &ExtractOptions::default())
}

/// Extract tables from a page with custom options.
///
/// Context is harvested with [`HeadingContextHarvester`] when requested.
///
/// # Example
///
/// ```
/// use untable::{extract_tables_with_options, ExtractOptions};
///
/// let html = "<h1>Report</h1><table><tr><td>a</td></tr></table>";
/// let options = ExtractOptions::new().with_context(true);
/// let tables = extract_tables_with_options("u", html, &options).unwrap();
/// let context = tables[0].context.as_ref().unwrap();
/// assert_eq!(context.heading_path(), "Report");
/// ```
pub fn extract_tables_with_options(
    url: &str,
    html: &str,
    options: &ExtractOptions,
) -> Result<Vec<ExtractedTable>> {
    TableExtractor::default().extract_with_options(url, html, options)
}

/// Extract tables from an HTML file.
///
/// Invalid UTF-8 is replaced rather than rejected.
///
/// # Example
///
/// ```no_run
/// use untable::{extract_file, ExtractOptions};
///
/// let tables = extract_file("page.html", "https://example.org/page", &ExtractOptions::default())?;
/// println!("{} tables", tables.len());
/// # Ok::<(), untable::Error>(())
/// ```
pub fn extract_file<P: AsRef<Path>>(
    path: P,
    url: &str,
    options: &ExtractOptions,
) -> Result<Vec<ExtractedTable>> {
    let data = std::fs::read(path)?;
    let html = String::from_utf8_lossy(&data);
    TableExtractor::default().extract_with_options(url, &html, options)
}
