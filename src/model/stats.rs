//! Non-fatal diagnostics and extraction statistics.

use serde::{Deserialize, Serialize};

/// A structural irregularity that was resolved without failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A span attribute was empty, zero or non-numeric and became 1.
    AttributeDefaultApplied {
        /// `rowspan` or `colspan`
        attribute: String,
        /// The declared value
        value: String,
    },

    /// A cell claimed a grid slot that another cell already occupied.
    OverlapResolved {
        /// Grid row of the contested slot
        row: u32,
        /// Grid column of the contested slot
        column: u32,
    },
}

/// Statistics collected during extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Number of tables extracted
    pub table_count: u32,

    /// Number of tables nested inside another table
    pub nested_table_count: u32,

    /// Number of grid slots across all tables
    pub cell_count: u32,

    /// Number of slots filled from a span
    pub spanned_fill_count: u32,

    /// Number of synthetic padding slots
    pub padding_count: u32,

    /// Number of tables that received a context
    pub context_count: u32,

    /// Span attributes that fell back to 1
    pub default_span_count: u32,

    /// Overlapping placements that were overwritten or clipped
    pub overlap_count: u32,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a diagnostic.
    pub fn record(&mut self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::AttributeDefaultApplied { .. } => self.default_span_count += 1,
            Diagnostic::OverlapResolved { .. } => self.overlap_count += 1,
        }
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.table_count += other.table_count;
        self.nested_table_count += other.nested_table_count;
        self.cell_count += other.cell_count;
        self.spanned_fill_count += other.spanned_fill_count;
        self.padding_count += other.padding_count;
        self.context_count += other.context_count;
        self.default_span_count += other.default_span_count;
        self.overlap_count += other.overlap_count;
    }

    /// Check if any irregularity was absorbed.
    pub fn has_diagnostics(&self) -> bool {
        self.default_span_count > 0 || self.overlap_count > 0
    }
}
