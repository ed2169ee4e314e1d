//! # Tree <-> Message Conversion
//!
//! The reflection-driven core of the crate. Both directions walk the field descriptors of a
//! [`prost_reflect::MessageDescriptor`] at runtime, so no per-schema code is ever generated.
//!
//! * [`encoder`]: builds a [`prost_reflect::DynamicMessage`] from a [`crate::tree::TreeValue`].
//! * [`decoder`]: flattens a message back into a tree, through a [`CoercionTable`].
//!
//! ## Extensions
//!
//! Extension fields are keyed by numeric tag, never by name, and grouped under the single
//! reserved key [`EXTENSION_KEY`] so they cannot collide with a regular field of the same name:
//!
//! ```json
//! { "name": "Ann", "___X": { "100": 7 } }
//! ```
pub mod coercion;
pub mod decoder;
pub mod encoder;

pub use coercion::{Coercion, CoercionTable, ScalarKind};
pub use decoder::decode;
pub use encoder::encode;

use crate::tree::TreeValue;
use prost_reflect::Kind;

/// Mapping key under which extension values are grouped.
pub const EXTENSION_KEY: &str = "___X";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("Field '{field}' missing from input for message '{message}'")]
    Validation { message: String, field: String },

    #[error("Key '{key}' can not be mapped to a field of message '{message}'")]
    UnknownField { message: String, key: String },

    #[error("Field '{field}' has type '{kind}' which has no registered coercion")]
    UnsupportedType { field: String, kind: ScalarKind },

    #[error("Coercion for field '{field}' ({kind}) rejected its value")]
    Coercion { field: String, kind: ScalarKind },

    #[error("Field '{field}' expects {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },
}

impl ConvertError {
    pub(crate) fn mismatch(field: &str, expected: impl Into<String>, found: &TreeValue) -> Self {
        ConvertError::TypeMismatch {
            field: field.to_string(),
            expected: expected.into(),
            found: found.kind_name().to_string(),
        }
    }
}

/// Name of a field kind as written in `.proto` files, `message` for message kinds.
pub(crate) fn kind_label(kind: &Kind) -> String {
    ScalarKind::of(kind).map_or_else(|| "message".to_string(), |k| k.to_string())
}
