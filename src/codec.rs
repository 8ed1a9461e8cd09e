//! JSON text in and out of the tree.
//!
//! Decoding errors propagate. Encoding never fails: anything serde_json
//! refuses degrades to `{}`.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::container::Container;
use crate::errors::{TreeError, TreeResult};

pub const EMPTY_OBJECT: &[u8] = b"{}";

/// Parse JSON text into a fresh tree.
pub fn parse_json(sample: &[u8]) -> TreeResult<Container> {
    let value: Value = serde_json::from_slice(sample)?;
    Ok(Container::consume(value))
}

/// Read and parse a JSON file. An empty path fails before any I/O.
#[instrument(level = "debug", skip_all)]
pub fn parse_json_file(path: impl AsRef<Path>) -> TreeResult<Container> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(TreeError::InvalidPath);
    }
    debug!("reading {}", path.display());
    let content =
        fs::read(path).map_err(|e| TreeError::io(format!("read {}", path.display()), e))?;
    debug!("read {} bytes", content.len());
    parse_json(&content)
}

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_else(|e| {
        warn!("encoding failed, falling back to {{}}: {}", e);
        EMPTY_OBJECT.to_vec()
    })
}

/// Pretty-print with `indent` per nesting level and `prefix` at the start of
/// every line except the first.
pub fn encode_indent<T: Serialize + ?Sized>(value: &T, prefix: &str, indent: &str) -> Vec<u8> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    if let Err(e) = value.serialize(&mut serializer) {
        warn!("encoding failed, falling back to {{}}: {}", e);
        return EMPTY_OBJECT.to_vec();
    }
    if prefix.is_empty() {
        return out;
    }
    // Encoded strings escape newlines, so every raw newline is a line break.
    let mut prefixed = Vec::with_capacity(out.len());
    for byte in out {
        prefixed.push(byte);
        if byte == b'\n' {
            prefixed.extend_from_slice(prefix.as_bytes());
        }
    }
    prefixed
}

/// Write the value under `container` to `path` as indented JSON.
pub fn write_json_file(
    path: impl AsRef<Path>,
    container: &Container,
    prefix: &str,
    indent: &str,
) -> TreeResult<()> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(TreeError::InvalidPath);
    }
    let mut content = container.bytes_indent(prefix, indent);
    content.push(b'\n');
    fs::write(path, content).map_err(|e| TreeError::io(format!("write {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_indent_applies_prefix_after_newlines() {
        let out = encode_indent(&json!({"a": [1]}), ">", "  ");
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\n>  \"a\": [\n>    1\n>  ]\n>}"
        );
    }

    #[test]
    fn test_encode_indent_keeps_escaped_newlines() {
        let out = encode_indent(&json!("a\nb"), "#", "\t");
        assert_eq!(String::from_utf8(out).unwrap(), "\"a\\nb\"");
    }
}
