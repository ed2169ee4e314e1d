//! # Binary Wire Format
//!
//! Thin wrappers over the Protobuf binary encoding of a [`DynamicMessage`]. No framing,
//! length prefix or checksum is added.
use super::ParseError;
use prost::Message;
use prost_reflect::{DynamicMessage, MessageDescriptor};

/// Serializes `message` into its wire bytes.
pub fn to_bytes(message: &DynamicMessage) -> Vec<u8> {
    message.encode_to_vec()
}

/// Parses wire bytes as a message of type `schema`.
pub fn from_bytes(schema: &MessageDescriptor, bytes: &[u8]) -> Result<DynamicMessage, ParseError> {
    Ok(DynamicMessage::decode(schema.clone(), bytes)?)
}
