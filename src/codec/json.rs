//! JSON rendering for extracted tables.

use crate::error::{Error, Result};
use crate::model::ExtractedTable;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a single table to JSON.
pub fn table_to_json(table: &ExtractedTable, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(table),
        JsonFormat::Compact => serde_json::to_string(table),
    };

    result.map_err(|e| Error::Json(format!("JSON serialization error: {}", e)))
}

/// Convert a list of tables to a JSON array.
pub fn tables_to_json(tables: &[ExtractedTable], format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(tables),
        JsonFormat::Compact => serde_json::to_string(tables),
    };

    result.map_err(|e| Error::Json(format!("JSON serialization error: {}", e)))
}

/// Parse a single table from JSON.
pub fn table_from_json(data: &str) -> Result<ExtractedTable> {
    Ok(serde_json::from_str(data)?)
}

/// Parse a JSON array of tables.
pub fn tables_from_json(data: &str) -> Result<Vec<ExtractedTable>> {
    Ok(serde_json::from_str(data)?)
}
