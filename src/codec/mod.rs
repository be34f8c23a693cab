//! Serialization of extracted tables.
//!
//! The binary form is the compact, deterministic contract used for storage;
//! JSON is offered for inspection and interchange.

pub mod binary;
mod json;

pub use binary::{FORMAT_VERSION, MAGIC};
pub use json::{table_from_json, table_to_json, tables_from_json, tables_to_json, JsonFormat};
