//! JSON I/O handling for CLI
//!
//! - Input: one JSON array of document objects, from a file or stdin
//! - Output: one JSON value per line on stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::document::Document;

use super::errors::{CliError, CliResult};

/// Read a batch from `path`, or stdin when `None`
pub fn read_batch(path: Option<&Path>) -> CliResult<Vec<Document>> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| CliError::io_error(format!("{}: {}", path.display(), e)))?,
        None => {
            let mut buf = String::new();
            io::stdin().lock().read_to_string(&mut buf)?;
            buf
        }
    };
    parse_batch(&text)
}

/// Parse a JSON array into documents
pub fn parse_batch(text: &str) -> CliResult<Vec<Document>> {
    if text.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    let value: Value = serde_json::from_str(text)?;
    let items = match value {
        Value::Array(items) => items,
        _ => return Err(CliError::invalid_input("Batch must be a JSON array")),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            Document::from_value(item)
                .map_err(|e| CliError::invalid_input(format!("document {}: {}", idx, e)))
        })
        .collect()
}

/// Write one JSON line to stdout
pub fn write_line<T: Serialize>(value: &T) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    write_line_to(&mut stdout, value)
}

/// Write one JSON line to `writer`
pub fn write_line_to<W: Write, T: Serialize>(writer: &mut W, value: &T) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
