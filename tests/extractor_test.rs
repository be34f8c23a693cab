//! Integration tests for the extraction pipeline.

use std::collections::HashSet;

use untable::{
    CellOrigin, Diagnostic, Error, ExtractOptions, ExtractedTable, TableExtractor,
};

const URL: &str = "https://example.org/wiki/Peaks";

fn extract(html: &str, auto_span: bool, auto_pad: bool) -> Vec<ExtractedTable> {
    TableExtractor::without_context()
        .extract(URL, html, auto_span, auto_pad, false)
        .unwrap()
}

/// A page mixing spans, ragged rows, nesting and junk markup.
fn messy_page() -> String {
    r#"<!DOCTYPE html>
<html><head><title>Peaks</title><style>td { color: red }</style></head>
<body>
  <h1>Peaks</h1>
  <table class="wikitable">
    <thead><tr><th rowspan="2">Name</th><th colspan="2">Height</th></tr>
    <tr><th>m</th><th>ft</th></tr></thead>
    <tbody>
      <tr><td>Everest</td><td>8849</td><td>29032</td></tr>
      <tr><td rowspan="3">K2</td><td>8611</td></tr>
      <tr><td colspan="5">wide</td>
      <tr><td>x</td><td>y</td><td>z</td><td>w</td></tr>
      <tr></tr>
    </tbody>
  </table>
  <div><table><tr><td>outer<table><tr><td>inner</td><td rowspan="abc">bad</td></tr></table></td></tr></table></div>
  <script>document.write("<table><tr><td>never</td></tr></table>")</script>
</body></html>"#
        .to_string()
}

// ==================== Scenario Tests ====================

#[test]
fn test_block_span_fills_empty_row() {
    let tables = extract(
        "<table><tr><td rowspan=2 colspan=2>A</td></tr><tr></tr></table>",
        true,
        true,
    );
    let grid = &tables[0].grid;
    assert_eq!((grid.width, grid.height), (2, 2));

    let anchor = grid.get(0, 0).unwrap();
    assert!(!anchor.is_spanned_fill);
    assert_eq!(anchor.origin, Some(CellOrigin { row: 0, cell: 0 }));

    let fills: Vec<_> = grid
        .rows
        .iter()
        .flatten()
        .filter(|c| c.is_spanned_fill)
        .collect();
    assert_eq!(fills.len(), 3);
    assert!(fills.iter().all(|c| c.text == "A" && c.origin == anchor.origin));
}

#[test]
fn test_ragged_rows_are_padded() {
    let tables = extract(
        "<table><tr><td>a</td><td>b</td><td>c</td></tr><tr><td>d</td></tr></table>",
        true,
        true,
    );
    let grid = &tables[0].grid;
    assert_eq!(grid.width, 3);
    let synthetic: Vec<_> = grid.rows[1].iter().filter(|c| c.is_padding()).collect();
    assert_eq!(synthetic.len(), 2);
    assert!(synthetic
        .iter()
        .all(|c| c.text.is_empty() && !c.is_header && c.is_spanned_fill));
}

#[test]
fn test_ragged_rows_without_padding() {
    let tables = extract(
        "<table><tr><td>a</td><td>b</td><td>c</td></tr><tr><td>d</td></tr></table>",
        true,
        false,
    );
    let grid = &tables[0].grid;
    assert_eq!(grid.width, 3);
    assert_eq!(grid.rows[0].len(), 3);
    assert_eq!(grid.rows[1].len(), 1);
}

#[test]
fn test_cell_markup_follows_spans() {
    let tables = extract(
        "<table><tr><td rowspan=2><a href=\"/wiki/K2\">K2</a></td><td>8611</td><td>x</td></tr>\
         <tr><td><b>28251</b></td></tr></table>",
        true,
        true,
    );
    let grid = &tables[0].grid;
    let link = "<td rowspan=\"2\"><a href=\"/wiki/K2\">K2</a></td>";
    assert_eq!(grid.get(0, 0).unwrap().html, link);
    assert_eq!(grid.get(1, 0).unwrap().html, link);
    assert_eq!(grid.get(1, 1).unwrap().html, "<td><b>28251</b></td>");
    assert!(grid.get(1, 2).unwrap().is_padding());
    assert!(grid.get(1, 2).unwrap().html.is_empty());
}

// ==================== Invariant Tests ====================

#[test]
fn test_padded_grids_are_rectangular() {
    for table in extract(&messy_page(), true, true) {
        assert!(table.grid.is_rectangular(), "{} is ragged", table.source_path);
        assert_eq!(table.grid.rows.len(), table.grid.height as usize);
    }
}

#[test]
fn test_spans_never_overlap() {
    let tables = extract(&messy_page(), true, true);
    for table in &tables {
        // every anchor appears exactly once and each fill points at an anchor
        let mut anchors = HashSet::new();
        for cell in table.grid.rows.iter().flatten() {
            if let (Some(origin), false) = (cell.origin, cell.is_spanned_fill) {
                assert!(anchors.insert((origin.row, origin.cell)), "duplicate anchor");
            }
        }
        for cell in table.grid.rows.iter().flatten() {
            if let (Some(origin), true) = (cell.origin, cell.is_spanned_fill) {
                assert!(anchors.contains(&(origin.row, origin.cell)));
            }
        }
    }
}

#[test]
fn test_messy_page_grid() {
    let tables = extract(&messy_page(), true, true);
    assert_eq!(tables.len(), 3);

    let main = &tables[0];
    assert_eq!(main.attrs.get("class").map(String::as_str), Some("wikitable"));
    assert_eq!(main.grid.header_row_count(), 2);
    // the colspan of "wide" starts after K2 and runs one column past the header
    assert_eq!(main.grid.width, 6);
    let texts = main.grid.texts();
    assert_eq!(texts[0][..3], ["Name", "Height", "Height"]);
    assert_eq!(texts[1][..3], ["Name", "m", "ft"]);
    assert_eq!(texts[3][..2], ["K2", "8611"]);
    // K2 keeps column 0 for the next two rows
    assert_eq!(texts[4][..2], ["K2", "wide"]);
    assert_eq!(texts[5][..5], ["K2", "x", "y", "z", "w"]);
    assert!(texts[6].iter().all(|t| t.is_empty()));
}

#[test]
fn test_zero_tables() {
    let tables = extract("<p>Just prose.</p>", true, true);
    assert!(tables.is_empty());
}

#[test]
fn test_empty_input_is_parse_error() {
    let extractor = TableExtractor::default();
    assert!(matches!(
        extractor.extract(URL, "", true, true, true),
        Err(Error::Parse(_))
    ));
    assert!(matches!(
        extractor.extract(URL, "\n\t  ", true, true, true),
        Err(Error::Parse(_))
    ));
}

#[test]
fn test_empty_table_element() {
    let tables = extract("<table></table>", true, true);
    assert_eq!(tables.len(), 1);
    assert_eq!((tables[0].grid.width, tables[0].grid.height), (0, 0));
}

// ==================== Nesting Tests ====================

#[test]
fn test_nested_tables_are_separate_records() {
    let tables = extract(&messy_page(), true, true);
    let outer = &tables[1];
    let inner = &tables[2];

    assert_eq!(outer.nesting_depth, 0);
    assert_eq!(inner.nesting_depth, 1);
    assert!(outer.contains(inner));
    assert!(inner.source_path.starts_with(&outer.source_path));
    assert!(outer.grid.get(0, 0).unwrap().text.contains("inner"));
    assert_eq!(inner.grid.texts(), vec![vec!["inner", "bad"]]);
}

#[test]
fn test_innermost_only() {
    let options = ExtractOptions::new().innermost_only();
    let tables = TableExtractor::without_context()
        .extract_with_options(URL, &messy_page(), &options)
        .unwrap();
    let paths: Vec<_> = tables.iter().map(|t| t.nesting_depth).collect();
    assert_eq!(paths, vec![0, 1]);
    assert_eq!(tables[1].id, format!("{}?table_no=2", URL));
}

#[test]
fn test_script_tables_ignored() {
    let tables = extract(&messy_page(), true, true);
    assert!(tables
        .iter()
        .all(|t| !t.grid.plain_text().contains("never")));
}

// ==================== Diagnostics Tests ====================

#[test]
fn test_malformed_spans_are_reported() {
    let report = TableExtractor::without_context()
        .extract_with_stats(URL, &messy_page(), &ExtractOptions::default())
        .unwrap();
    assert!(report.diagnostics.contains(&Diagnostic::AttributeDefaultApplied {
        attribute: "rowspan".to_string(),
        value: "abc".to_string(),
    }));
    assert_eq!(report.stats.default_span_count, 1);
    assert_eq!(report.stats.table_count, 3);
    assert_eq!(report.stats.nested_table_count, 1);
    assert!(report.stats.has_diagnostics());
}

#[test]
fn test_overlap_without_span_resolution() {
    let html = "<table><tr><td rowspan=2>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>";

    let report = TableExtractor::without_context()
        .extract_with_stats(URL, html, &ExtractOptions::new().raw())
        .unwrap();
    assert_eq!(report.tables[0].grid.texts(), vec![vec!["a", "b"], vec!["c", "d"]]);
    assert_eq!(
        report.diagnostics,
        vec![Diagnostic::OverlapResolved { row: 1, column: 0 }]
    );

    let resolved = extract(html, true, true);
    assert_eq!(
        resolved[0].grid.texts(),
        vec![vec!["a", "b", ""], vec!["a", "c", "d"]]
    );
}

#[test]
fn test_huge_spans_are_clamped() {
    let tables = extract(
        "<table><tr><td colspan=99999 rowspan=99999>x</td></tr><tr><td>y</td></tr></table>",
        true,
        true,
    );
    let grid = &tables[0].grid;
    assert_eq!(grid.height, 2);
    assert_eq!(grid.get(1, 999).map(|c| c.text.as_str()), Some("x"));
    // the second row is full, so its own cell lands after the span
    assert_eq!(grid.get(1, 1000).map(|c| c.text.as_str()), Some("y"));
    assert_eq!(grid.width, 1001);
}

// ==================== Determinism Tests ====================

#[test]
fn test_extraction_is_deterministic() {
    let extractor = TableExtractor::default();
    let encode = || -> Vec<Vec<u8>> {
        extractor
            .extract(URL, &messy_page(), true, true, true)
            .unwrap()
            .iter()
            .map(|t| t.to_bytes().unwrap())
            .collect()
    };
    assert_eq!(encode(), encode());
}

#[test]
fn test_batch_matches_single_page() {
    let extractor = TableExtractor::default();
    let page = messy_page();
    let pages: Vec<(&str, &str)> = vec![(URL, page.as_str()); 4];
    let options = ExtractOptions::new().with_context(true);

    let single = extractor.extract_with_options(URL, &page, &options).unwrap();
    for result in extractor.extract_batch(&pages, &options) {
        assert_eq!(result.unwrap(), single);
    }
}

#[test]
fn test_extractor_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TableExtractor>();
}
