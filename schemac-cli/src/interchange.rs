//! Schema interchange.
//!
//! The scanned schema as pretty-printed JSON, for tools that want the type
//! model without parsing the headers themselves.

use crate::error::{CliResult, InterchangeError};
use schemac::Schema;
use std::path::Path;

/// Encode `schema` as pretty JSON with a trailing newline.
pub fn to_json(schema: &Schema) -> Result<String, InterchangeError> {
    let mut text = serde_json::to_string_pretty(schema)?;
    text.push('\n');
    Ok(text)
}

/// Decode a schema from JSON text.
pub fn from_json(text: &str) -> Result<Schema, InterchangeError> {
    Ok(serde_json::from_str(text)?)
}

/// Read a schema interchange file.
pub fn read(path: &Path) -> CliResult<Schema> {
    let text = std::fs::read_to_string(path).map_err(|e| InterchangeError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(from_json(&text)?)
}
