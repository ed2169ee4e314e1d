//! # Debug Text Format
//!
//! Renders messages in the Protobuf text format (`field: value` pairs, braces for
//! nested messages, `[pkg.ext]` for extensions). The parser is whitespace tolerant.
//! This is not a wire format and makes no compatibility promises.
use super::ParseError;
use prost_reflect::{DynamicMessage, MessageDescriptor, text_format::FormatOptions};

/// Renders `message` as multi-line text.
pub fn to_text(message: &DynamicMessage) -> String {
    message.to_text_format_with_options(&FormatOptions::new().pretty(true))
}

/// Parses text as a message of type `schema`.
pub fn from_text(schema: &MessageDescriptor, text: &str) -> Result<DynamicMessage, ParseError> {
    Ok(DynamicMessage::parse_text_format(schema.clone(), text)?)
}
