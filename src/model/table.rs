//! Table types: raw markup rows and the normalized grid.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::NodeId;

/// Whether a cell came from `<th>` or `<td>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    /// `<th>`
    Header,
    /// `<td>`
    #[default]
    Data,
}

/// A cell as declared in the markup, spans already normalized to ≥1.
#[derive(Debug, Clone)]
pub struct RawCell {
    /// Header or data cell
    pub kind: CellKind,

    /// Number of rows this cell spans
    pub rowspan: u32,

    /// Number of columns this cell spans
    pub colspan: u32,

    /// Visible text of the cell (nested tables flattened in)
    pub text: String,

    /// Markup of the `td`/`th` element, links and inline formatting kept
    pub html: String,

    /// The `td`/`th` element
    pub node: NodeId,

    /// Cell attributes
    pub attrs: BTreeMap<String, String>,
}

impl RawCell {
    /// Create a data cell spanning one slot.
    pub fn data(text: impl Into<String>, node: NodeId) -> Self {
        Self {
            kind: CellKind::Data,
            rowspan: 1,
            colspan: 1,
            text: text.into(),
            html: String::new(),
            node,
            attrs: BTreeMap::new(),
        }
    }

    /// Create a header cell spanning one slot.
    pub fn header(text: impl Into<String>, node: NodeId) -> Self {
        Self {
            kind: CellKind::Header,
            ..Self::data(text, node)
        }
    }

    /// Set the cell markup and return self.
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = html.into();
        self
    }

    /// Set colspan and return self.
    pub fn colspan(mut self, span: u32) -> Self {
        self.colspan = span.max(1);
        self
    }

    /// Set rowspan and return self.
    pub fn rowspan(mut self, span: u32) -> Self {
        self.rowspan = span.max(1);
        self
    }

    /// Check if this is a header cell.
    pub fn is_header(&self) -> bool {
        self.kind == CellKind::Header
    }

    /// Check if this cell spans multiple rows or columns.
    pub fn is_merged(&self) -> bool {
        self.rowspan > 1 || self.colspan > 1
    }
}

/// A `<tr>` as declared in the markup.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    /// Cells in source order
    pub cells: Vec<RawCell>,

    /// Row attributes
    pub attrs: BTreeMap<String, String>,
}

impl RawRow {
    /// Create a row from cells.
    pub fn new(cells: Vec<RawCell>) -> Self {
        Self {
            cells,
            attrs: BTreeMap::new(),
        }
    }
}

/// A `<table>` as declared in the markup.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Rows in source order
    pub rows: Vec<RawRow>,

    /// The `<table>` element
    pub node: NodeId,

    /// Number of enclosing tables
    pub nesting_depth: u32,

    /// Path of the table element within the document
    pub source_path: String,

    /// Table attributes
    pub attrs: BTreeMap<String, String>,

    /// Text of the table's own `<caption>` child
    pub caption: Option<String>,
}

impl RawTable {
    /// Create a top-level table with the given rows.
    pub fn new(node: NodeId, rows: Vec<RawRow>) -> Self {
        Self {
            rows,
            node,
            nesting_depth: 0,
            source_path: String::new(),
            attrs: BTreeMap::new(),
            caption: None,
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check if any cell spans multiple slots.
    pub fn has_merged_cells(&self) -> bool {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .any(RawCell::is_merged)
    }
}

/// Position of the raw cell that produced a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellOrigin {
    /// Row index in the raw table
    pub row: u32,
    /// Cell index within that raw row
    pub cell: u32,
}

/// A slot of the normalized grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    /// Cell text
    pub text: String,

    /// Markup of the producing cell; empty for padding
    pub html: String,

    /// Whether the producing cell was a `<th>`
    pub is_header: bool,

    /// Raw cell this value comes from; `None` for padding
    pub origin: Option<CellOrigin>,

    /// True when the slot was synthesized by a span or padding
    pub is_spanned_fill: bool,
}

impl GridCell {
    /// Create the anchor slot of a raw cell.
    pub fn anchor(cell: &RawCell, origin: CellOrigin) -> Self {
        Self {
            text: cell.text.clone(),
            html: cell.html.clone(),
            is_header: cell.is_header(),
            origin: Some(origin),
            is_spanned_fill: false,
        }
    }

    /// Create a copy of this cell marking a spanned slot.
    pub fn spanned_copy(&self) -> Self {
        Self {
            is_spanned_fill: true,
            ..self.clone()
        }
    }

    /// Create an empty synthetic cell used for padding.
    pub fn padding() -> Self {
        Self {
            text: String::new(),
            html: String::new(),
            is_header: false,
            origin: None,
            is_spanned_fill: true,
        }
    }

    /// Check if this slot is padding rather than content.
    pub fn is_padding(&self) -> bool {
        self.origin.is_none()
    }
}

/// Normalized table grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Number of columns (maximum row length)
    pub width: u32,

    /// Number of rows
    pub height: u32,

    /// Cells, row-major
    pub rows: Vec<Vec<GridCell>>,
}

impl Grid {
    /// Create an empty `0 × 0` grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grid from rows, computing its dimensions.
    pub fn from_rows(rows: Vec<Vec<GridCell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        Self {
            width,
            height: rows.len() as u32,
            rows,
        }
    }

    /// Check if the grid has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<&GridCell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Check if every row has exactly `width` cells.
    pub fn is_rectangular(&self) -> bool {
        self.rows.iter().all(|r| r.len() == self.width as usize)
    }

    /// Text of each cell, row-major.
    pub fn texts(&self) -> Vec<Vec<&str>> {
        self.rows
            .iter()
            .map(|r| r.iter().map(|c| c.text.as_str()).collect())
            .collect()
    }

    /// Number of leading rows made only of header cells.
    pub fn header_row_count(&self) -> usize {
        self.rows
            .iter()
            .take_while(|r| !r.is_empty() && r.iter().all(|c| c.is_header || c.is_padding()))
            .take_while(|r| r.iter().any(|c| c.is_header))
            .count()
    }

    /// Plain text representation: tab-separated cells, one row per line.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| c.text.replace('\n', " "))
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
