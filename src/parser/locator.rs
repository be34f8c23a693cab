//! Table location and raw row/cell collection.
//!
//! Every `<table>` in the document is returned in document order, nested
//! tables included. Content of `script`, `style`, `noscript` and `template`
//! elements is never searched.

use crate::model::{CellKind, Diagnostic, DocumentTree, NodeId, RawCell, RawRow, RawTable};
use crate::text::{self, node_text};

/// Largest rowspan honored; larger values are clamped.
pub const MAX_ROWSPAN: u32 = 65534;

/// Largest colspan honored; larger values are clamped.
pub const MAX_COLSPAN: u32 = 1000;

/// Locates tables in a document tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableLocator;

impl TableLocator {
    /// Create a new locator.
    pub fn new() -> Self {
        Self
    }

    /// Find all tables in document order.
    pub fn locate(&self, tree: &DocumentTree) -> Vec<RawTable> {
        let mut diagnostics = Vec::new();
        self.locate_with_diagnostics(tree, &mut diagnostics)
    }

    /// Find all tables, pushing span irregularities into `diagnostics`.
    pub fn locate_with_diagnostics(
        &self,
        tree: &DocumentTree,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<RawTable> {
        let mut tables = Vec::new();
        let mut iter = tree.descendants(tree.root());

        while let Some(id) = iter.next() {
            let Some(tag) = tree.tag(id) else {
                continue;
            };
            if text::is_discarded(tag) {
                iter.skip_children();
                continue;
            }
            if tag == "table" {
                tables.push(self.read_table(tree, id, diagnostics));
            }
        }

        log::debug!("TableLocator: found {} tables", tables.len());
        tables
    }

    fn read_table(
        &self,
        tree: &DocumentTree,
        table: NodeId,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> RawTable {
        let mut raw = RawTable::new(table, Vec::new());
        raw.nesting_depth = tree
            .ancestors(table)
            .filter(|a| tree.node(*a).is_tag("table"))
            .count() as u32;
        raw.source_path = tree.path(table);
        raw.attrs = tree.node(table).attrs().cloned().unwrap_or_default();

        for child in tree.child_elements(table) {
            match tree.tag(child) {
                Some("caption") if raw.caption.is_none() => {
                    let caption = node_text(tree, child);
                    if !caption.is_empty() {
                        raw.caption = Some(caption);
                    }
                }
                Some("thead" | "tbody" | "tfoot") => {
                    for row in tree.child_elements(child) {
                        if tree.node(row).is_tag("tr") {
                            raw.rows.push(read_row(tree, row, diagnostics));
                        }
                    }
                }
                Some("tr") => raw.rows.push(read_row(tree, child, diagnostics)),
                _ => {}
            }
        }

        log::trace!(
            "TableLocator: {} at depth {} has {} rows",
            raw.source_path,
            raw.nesting_depth,
            raw.rows.len()
        );
        raw
    }
}

fn read_row(tree: &DocumentTree, row: NodeId, diagnostics: &mut Vec<Diagnostic>) -> RawRow {
    let cells = tree
        .child_elements(row)
        .filter_map(|cell| {
            let kind = match tree.tag(cell)? {
                "th" => CellKind::Header,
                "td" => CellKind::Data,
                _ => return None,
            };
            let node = tree.node(cell);
            Some(RawCell {
                kind,
                rowspan: parse_span(node.attr("rowspan"), "rowspan", MAX_ROWSPAN, diagnostics),
                colspan: parse_span(node.attr("colspan"), "colspan", MAX_COLSPAN, diagnostics),
                text: node_text(tree, cell),
                html: tree.outer_html(cell),
                node: cell,
                attrs: node.attrs().cloned().unwrap_or_default(),
            })
        })
        .collect();

    RawRow {
        cells,
        attrs: tree.node(row).attrs().cloned().unwrap_or_default(),
    }
}

/// Parse a declared span.
///
/// Absent means 1. Empty, zero, signed or non-numeric values also become 1
/// and are reported; oversized values are clamped to `max`.
pub fn parse_span(
    value: Option<&str>,
    attribute: &str,
    max: u32,
    diagnostics: &mut Vec<Diagnostic>,
) -> u32 {
    let Some(declared) = value else {
        return 1;
    };

    let trimmed = declared.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        // all digits, so parsing can only fail on overflow
        let span = trimmed.parse::<u64>().unwrap_or(u64::MAX);
        if span > 0 {
            return span.min(u64::from(max)) as u32;
        }
    }

    log::debug!("{}=\"{}\" is not a positive integer, using 1", attribute, declared);
    diagnostics.push(Diagnostic::AttributeDefaultApplied {
        attribute: attribute.to_string(),
        value: declared.to_string(),
    });
    1
}
