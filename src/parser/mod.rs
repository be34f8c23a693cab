//! HTML parsing and table structure recovery.

mod context;
mod grid;
mod html_parser;
mod locator;
mod options;

pub use context::{ContextHarvester, HeadingContextHarvester, NoopHarvester};
pub use grid::GridBuilder;
pub use html_parser::HtmlParser;
pub use locator::{parse_span, TableLocator, MAX_COLSPAN, MAX_ROWSPAN};
pub use options::{ContextOptions, ExtractOptions, NestedTables};
