//! Span and pad resolution.
//!
//! Turns the rows of a [`RawTable`] into a [`Grid`] where every slot holds
//! a concrete cell. A cell spanning `r × c` slots is copied into each slot
//! of its footprint; only the top-left copy is the anchor.

use crate::model::{CellOrigin, Diagnostic, Grid, GridCell, RawTable};

use super::options::ExtractOptions;

/// Builds normalized grids from raw tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBuilder {
    auto_span: bool,
    auto_pad: bool,
}

impl GridBuilder {
    /// Create a builder.
    pub fn new(auto_span: bool, auto_pad: bool) -> Self {
        Self {
            auto_span,
            auto_pad,
        }
    }

    /// Create a builder from extraction options.
    pub fn from_options(options: &ExtractOptions) -> Self {
        Self::new(options.auto_span, options.auto_pad)
    }

    /// Build the grid of a table.
    pub fn build(&self, table: &RawTable) -> Grid {
        let mut diagnostics = Vec::new();
        self.build_with_diagnostics(table, &mut diagnostics)
    }

    /// Build the grid of a table, pushing overlaps into `diagnostics`.
    pub fn build_with_diagnostics(
        &self,
        table: &RawTable,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Grid {
        let height = table.rows.len();
        if height == 0 {
            return Grid::new();
        }

        let mut slots: Vec<Vec<Option<GridCell>>> = vec![Vec::new(); height];

        for (r, row) in table.rows.iter().enumerate() {
            let mut col = 0;

            for (c, cell) in row.cells.iter().enumerate() {
                if self.auto_span {
                    while is_occupied(&slots[r], col) {
                        col += 1;
                    }
                }

                // browsers never create rows for a span reaching past the table
                let rowspan = (cell.rowspan.max(1) as usize).min(height - r);
                let mut colspan = cell.colspan.max(1) as usize;

                if self.auto_span {
                    // rows below can only be held by spans that also hold row `r`,
                    // so the free run in row `r` bounds the whole footprint
                    let free = (col..col + colspan)
                        .take_while(|j| !is_occupied(&slots[r], *j))
                        .count();
                    if free < colspan {
                        report_overlap(diagnostics, r, col + free);
                        colspan = free;
                    }
                }

                let anchor = GridCell::anchor(
                    cell,
                    CellOrigin {
                        row: r as u32,
                        cell: c as u32,
                    },
                );

                for dr in 0..rowspan {
                    for dc in 0..colspan {
                        let value = if dr == 0 && dc == 0 {
                            anchor.clone()
                        } else {
                            anchor.spanned_copy()
                        };
                        if place(&mut slots[r + dr], col + dc, value).is_some() {
                            report_overlap(diagnostics, r + dr, col + dc);
                        }
                    }
                }

                col += colspan;
            }
        }

        let width = slots.iter().map(Vec::len).max().unwrap_or(0);
        let rows = slots
            .into_iter()
            .map(|row| {
                let mut cells: Vec<GridCell> = row
                    .into_iter()
                    .map(|slot| slot.unwrap_or_else(GridCell::padding))
                    .collect();
                if self.auto_pad {
                    cells.resize(width, GridCell::padding());
                }
                cells
            })
            .collect();

        Grid {
            width: width as u32,
            height: height as u32,
            rows,
        }
    }
}

impl Default for GridBuilder {
    fn default() -> Self {
        Self::new(true, true)
    }
}

fn is_occupied(row: &[Option<GridCell>], col: usize) -> bool {
    matches!(row.get(col), Some(Some(_)))
}

/// Put a cell into a slot, growing the row; returns the previous occupant.
fn place(row: &mut Vec<Option<GridCell>>, col: usize, cell: GridCell) -> Option<GridCell> {
    if row.len() <= col {
        row.resize(col + 1, None);
    }
    row[col].replace(cell)
}

fn report_overlap(diagnostics: &mut Vec<Diagnostic>, row: usize, column: usize) {
    log::debug!("GridBuilder: overlapping cells at ({}, {})", row, column);
    diagnostics.push(Diagnostic::OverlapResolved {
        row: row as u32,
        column: column as u32,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocumentTree, NodeId, RawCell, RawRow};

    fn node() -> NodeId {
        DocumentTree::new("table").root()
    }

    fn cell(text: &str) -> RawCell {
        RawCell::data(text, node())
    }

    fn table(rows: Vec<Vec<RawCell>>) -> RawTable {
        RawTable::new(node(), rows.into_iter().map(RawRow::new).collect())
    }

    #[test]
    fn test_plain_table() {
        let grid = GridBuilder::default().build(&table(vec![
            vec![cell("a"), cell("b")],
            vec![cell("c"), cell("d")],
        ]));
        assert_eq!((grid.width, grid.height), (2, 2));
        assert_eq!(grid.texts(), vec![vec!["a", "b"], vec!["c", "d"]]);
        assert!(grid.rows.iter().flatten().all(|c| !c.is_spanned_fill));
    }

    #[test]
    fn test_rowspan_and_colspan_block() {
        let grid = GridBuilder::default().build(&table(vec![
            vec![cell("A").rowspan(2).colspan(2)],
            vec![],
        ]));
        assert_eq!((grid.width, grid.height), (2, 2));
        let anchor = grid.get(0, 0).unwrap();
        assert!(!anchor.is_spanned_fill);
        assert_eq!(anchor.origin, Some(CellOrigin { row: 0, cell: 0 }));
        for (r, c) in [(0, 1), (1, 0), (1, 1)] {
            let fill = grid.get(r, c).unwrap();
            assert!(fill.is_spanned_fill);
            assert_eq!(fill.text, "A");
            assert_eq!(fill.origin, anchor.origin);
        }
    }

    #[test]
    fn test_rowspan_shifts_later_cells() {
        let grid = GridBuilder::default().build(&table(vec![
            vec![cell("a").rowspan(2), cell("b"), cell("c")],
            vec![cell("d"), cell("e")],
        ]));
        assert_eq!(grid.texts(), vec![vec!["a", "b", "c"], vec!["a", "d", "e"]]);
        assert_eq!(grid.get(1, 1).unwrap().origin, Some(CellOrigin { row: 1, cell: 0 }));
    }

    #[test]
    fn test_padding_ragged_rows() {
        let grid = GridBuilder::default().build(&table(vec![
            vec![cell("a"), cell("b"), cell("c")],
            vec![cell("d")],
        ]));
        assert_eq!(grid.width, 3);
        assert!(grid.is_rectangular());
        let pads: Vec<_> = grid.rows[1][1..].iter().collect();
        assert_eq!(pads.len(), 2);
        assert!(pads.iter().all(|c| c.is_padding() && c.is_spanned_fill && c.text.is_empty()));
    }

    #[test]
    fn test_without_padding_rows_stay_ragged() {
        let grid = GridBuilder::new(true, false).build(&table(vec![
            vec![cell("a"), cell("b"), cell("c")],
            vec![cell("d")],
        ]));
        assert_eq!(grid.width, 3);
        assert_eq!(grid.rows[1].len(), 1);
        assert!(!grid.is_rectangular());
    }

    #[test]
    fn test_rowspan_clipped_to_table() {
        let grid = GridBuilder::default().build(&table(vec![vec![cell("a").rowspan(50)]]));
        assert_eq!((grid.width, grid.height), (1, 1));
    }

    #[test]
    fn test_colspan_clipped_at_occupied_slot() {
        let mut diagnostics = Vec::new();
        let grid = GridBuilder::default().build_with_diagnostics(
            &table(vec![
                vec![cell("x"), cell("y"), cell("z").rowspan(2)],
                vec![cell("wide").colspan(3), cell("after")],
            ]),
            &mut diagnostics,
        );
        assert_eq!(
            grid.texts(),
            vec![vec!["x", "y", "z", ""], vec!["wide", "wide", "z", "after"]]
        );
        assert_eq!(diagnostics, vec![Diagnostic::OverlapResolved { row: 1, column: 2 }]);
    }

    #[test]
    fn test_no_auto_span_overwrites() {
        let mut diagnostics = Vec::new();
        let grid = GridBuilder::new(false, true).build_with_diagnostics(
            &table(vec![
                vec![cell("a").rowspan(2), cell("b")],
                vec![cell("c"), cell("d")],
            ]),
            &mut diagnostics,
        );
        assert_eq!(grid.texts(), vec![vec!["a", "b"], vec!["c", "d"]]);
        assert_eq!(diagnostics, vec![Diagnostic::OverlapResolved { row: 1, column: 0 }]);
    }

    #[test]
    fn test_holes_filled_without_padding() {
        // without span resolution a spanned slot left of the cursor stays a hole
        let grid = GridBuilder::new(false, false).build(&table(vec![
            vec![cell("a"), cell("b").rowspan(2).colspan(2)],
            vec![],
        ]));
        assert_eq!(grid.rows[1].len(), 3);
        assert!(grid.rows[1][0].is_padding());
        assert_eq!(grid.rows[1][1].text, "b");
    }

    #[test]
    fn test_empty_table() {
        let grid = GridBuilder::default().build(&table(vec![]));
        assert_eq!((grid.width, grid.height), (0, 0));

        let grid = GridBuilder::default().build(&table(vec![vec![], vec![]]));
        assert_eq!((grid.width, grid.height), (0, 2));
        assert!(grid.rows.iter().all(Vec::is_empty));
    }
}
