//! Binary encoding of extracted tables.
//!
//! Layout: the 4-byte magic `UTBL`, one format-version byte, then the record
//! encoded with postcard (varint integers, length-prefixed strings and
//! sequences, explicit tags for every `Option`). Field order is fixed by the
//! struct definitions, so equal tables always encode to equal bytes.

use crate::error::{Error, Result};
use crate::model::ExtractedTable;

/// Leading bytes of every encoded table.
pub const MAGIC: &[u8; 4] = b"UTBL";

/// Current layout version.
pub const FORMAT_VERSION: u8 = 1;

const HEADER_LEN: usize = MAGIC.len() + 1;

/// Encode a table.
pub fn encode(table: &ExtractedTable) -> Result<Vec<u8>> {
    let body = postcard::to_allocvec(table).map_err(|e| Error::Encode(e.to_string()))?;

    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(MAGIC);
    out.push(FORMAT_VERSION);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Decode a table produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<ExtractedTable> {
    if bytes.len() < HEADER_LEN || !bytes.starts_with(MAGIC) {
        return Err(Error::Decode("missing UTBL header".to_string()));
    }

    let version = bytes[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(Error::Decode(format!(
            "unsupported format version {} (expected {})",
            version, FORMAT_VERSION
        )));
    }

    postcard::from_bytes(&bytes[HEADER_LEN..]).map_err(|e| Error::Decode(e.to_string()))
}

/// Check if the bytes start with a table header.
pub fn is_encoded_table(bytes: &[u8]) -> bool {
    bytes.len() >= HEADER_LEN && bytes.starts_with(MAGIC)
}
