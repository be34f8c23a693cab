//! Data model for parsed pages and extracted tables.
//!
//! The document tree is the read-only view of a parsed page; raw tables
//! mirror the markup; grids, contexts and [`ExtractedTable`]s are the
//! owned, serializable output.

mod context;
mod extracted;
mod stats;
mod table;
mod tree;

pub use context::{Context, Heading};
pub use extracted::ExtractedTable;
pub use stats::{Diagnostic, ExtractionStats};
pub use table::{CellKind, CellOrigin, Grid, GridCell, RawCell, RawRow, RawTable};
pub use tree::{Ancestors, Descendants, DocumentTree, Node, NodeData, NodeId};
