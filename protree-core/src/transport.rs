//! # Transport Adapters
//!
//! Everything that moves a [`prost_reflect::DynamicMessage`] in or out of memory:
//!
//! * [`wire`]: the native Protobuf binary encoding.
//! * [`text`]: the human readable Protobuf text format, used for fixtures and inspection.
//! * [`file`]: reading and writing either form to disk.
//!
//! These functions report failures as typed errors. The [`crate::converter::Converter`]
//! facade is the boundary where I/O failures are logged and reduced to absent results.
pub mod file;
pub mod text;
pub mod wire;

use std::path::PathBuf;

/// A payload could not be turned back into a message.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to decode Protobuf bytes: {0}")]
    Wire(#[from] prost::DecodeError),

    #[error("Failed to parse Protobuf text format: {0}")]
    Text(#[from] prost_reflect::text_format::ParseError),
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("File '{}' not found", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
