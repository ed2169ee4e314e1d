//! # File Ports
//!
//! Reads and writes messages to disk in either wire or text form.
//!
//! Writers accept an optional path. Without one, a new file with a unique name is created in
//! the system temporary directory and kept after the call returns. Nothing coordinates
//! concurrent writers of the same explicit path: the last write wins.
use super::{TransportError, text, wire};
use prost_reflect::{DynamicMessage, MessageDescriptor};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const TEMP_PREFIX: &str = "protree-";

/// Writes the wire bytes of `message`, returning the path written to.
pub fn write_binary(message: &DynamicMessage, path: Option<&Path>) -> Result<PathBuf, TransportError> {
    write_file(path, &wire::to_bytes(message), ".bin")
}

/// Reads a file of raw wire bytes as a message of type `schema`.
pub fn read_binary(schema: &MessageDescriptor, path: &Path) -> Result<DynamicMessage, TransportError> {
    let bytes = read_file(path)?;
    Ok(wire::from_bytes(schema, &bytes)?)
}

/// Writes the text rendering of `message` followed by a single newline.
pub fn write_text(message: &DynamicMessage, path: Option<&Path>) -> Result<PathBuf, TransportError> {
    let mut rendered = text::to_text(message);
    rendered.push('\n');
    write_file(path, rendered.as_bytes(), ".txt")
}

/// Reads a text file written by [`write_text`]. Exactly one trailing newline is dropped.
pub fn read_text(schema: &MessageDescriptor, path: &Path) -> Result<DynamicMessage, TransportError> {
    let bytes = read_file(path)?;
    let content =
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let content = content.strip_suffix('\n').unwrap_or(&content);

    Ok(text::from_text(schema, content)?)
}

fn read_file(path: &Path) -> Result<Vec<u8>, TransportError> {
    if !path.is_file() {
        return Err(TransportError::NotFound(path.to_path_buf()));
    }

    Ok(fs::read(path)?)
}

fn write_file(path: Option<&Path>, contents: &[u8], suffix: &str) -> Result<PathBuf, TransportError> {
    if let Some(path) = path {
        fs::write(path, contents)?;
        return Ok(path.to_path_buf());
    }

    let mut file = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(suffix)
        .tempfile()?;

    // An unkept temp file is removed on drop.
    file.write_all(contents)?;
    let (_, path) = file.keep().map_err(|e| e.error)?;
    tracing::debug!(path = %path.display(), "Allocated temporary output file");

    Ok(path)
}
