//! The record returned for each table found in a page.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Context, Grid};
use crate::codec::{binary, table_from_json, table_to_json, JsonFormat};
use crate::error::Result;

/// A table extracted from a page.
///
/// Holds only owned data; nothing here refers back into the document tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedTable {
    /// Page URL with a `table_no` query parameter identifying this table
    pub id: String,

    /// Position of the table in document order
    pub index: u32,

    /// Path of the `<table>` element within the page
    pub source_path: String,

    /// Number of enclosing tables
    pub nesting_depth: u32,

    /// Attributes of the `<table>` element
    pub attrs: BTreeMap<String, String>,

    /// Normalized cells
    pub grid: Grid,

    /// Page context, present only when requested
    pub context: Option<Context>,
}

impl ExtractedTable {
    /// Create a record for a grid with no context.
    pub fn new(grid: Grid, source_path: impl Into<String>, nesting_depth: u32) -> Self {
        Self {
            id: String::new(),
            index: 0,
            source_path: source_path.into(),
            nesting_depth,
            attrs: BTreeMap::new(),
            grid,
            context: None,
        }
    }

    /// Attach a context and return self.
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    /// Check if this table sits inside another table.
    pub fn is_nested(&self) -> bool {
        self.nesting_depth > 0
    }

    /// Check if `other` is nested somewhere inside this table.
    pub fn contains(&self, other: &ExtractedTable) -> bool {
        other.nesting_depth > self.nesting_depth
            && other
                .source_path
                .strip_prefix(self.source_path.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Caption from the context, if any.
    pub fn caption(&self) -> Option<&str> {
        self.context.as_ref().and_then(|c| c.caption.as_deref())
    }

    /// Encode into the deterministic binary form.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        binary::encode(self)
    }

    /// Decode a table produced by [`ExtractedTable::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        binary::decode(bytes)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        table_to_json(self, format)
    }

    /// Parse a table from JSON.
    pub fn from_json(data: &str) -> Result<Self> {
        table_from_json(data)
    }
}
