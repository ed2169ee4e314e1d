//! # Scalar Coercion Table
//!
//! Maps every non-message field kind to the function that turns a decoded
//! [`prost_reflect::Value`] into its [`TreeValue`] form. The decoder consults it for every
//! scalar and enum field.
//!
//! Callers can swap individual entries, for example to keep `bytes` fields as raw bytes:
//!
//! ```rust
//! use protree_core::convert::{CoercionTable, ScalarKind, coercion};
//!
//! let table = CoercionTable::default().with(ScalarKind::Bytes, coercion::raw_bytes);
//! assert!(table.get(ScalarKind::Bytes).is_some());
//! ```
use crate::tree::TreeValue;
use prost_reflect::{Kind, Value};
use std::collections::HashMap;
use std::fmt;

/// Turns a decoded value into a tree value. `None` means the value was not of the expected shape.
pub type Coercion = fn(&Value) -> Option<TreeValue>;

/// Every field kind except `message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
    Enum,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 16] = [
        ScalarKind::Double,
        ScalarKind::Float,
        ScalarKind::Int32,
        ScalarKind::Int64,
        ScalarKind::Uint32,
        ScalarKind::Uint64,
        ScalarKind::Sint32,
        ScalarKind::Sint64,
        ScalarKind::Fixed32,
        ScalarKind::Fixed64,
        ScalarKind::Sfixed32,
        ScalarKind::Sfixed64,
        ScalarKind::Bool,
        ScalarKind::String,
        ScalarKind::Bytes,
        ScalarKind::Enum,
    ];

    /// Returns `None` for message kinds.
    pub fn of(kind: &Kind) -> Option<Self> {
        let scalar = match kind {
            Kind::Double => ScalarKind::Double,
            Kind::Float => ScalarKind::Float,
            Kind::Int32 => ScalarKind::Int32,
            Kind::Int64 => ScalarKind::Int64,
            Kind::Uint32 => ScalarKind::Uint32,
            Kind::Uint64 => ScalarKind::Uint64,
            Kind::Sint32 => ScalarKind::Sint32,
            Kind::Sint64 => ScalarKind::Sint64,
            Kind::Fixed32 => ScalarKind::Fixed32,
            Kind::Fixed64 => ScalarKind::Fixed64,
            Kind::Sfixed32 => ScalarKind::Sfixed32,
            Kind::Sfixed64 => ScalarKind::Sfixed64,
            Kind::Bool => ScalarKind::Bool,
            Kind::String => ScalarKind::String,
            Kind::Bytes => ScalarKind::Bytes,
            Kind::Enum(_) => ScalarKind::Enum,
            Kind::Message(_) => return None,
        };
        Some(scalar)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::Double => "double",
            ScalarKind::Float => "float",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::Uint32 => "uint32",
            ScalarKind::Uint64 => "uint64",
            ScalarKind::Sint32 => "sint32",
            ScalarKind::Sint64 => "sint64",
            ScalarKind::Fixed32 => "fixed32",
            ScalarKind::Fixed64 => "fixed64",
            ScalarKind::Sfixed32 => "sfixed32",
            ScalarKind::Sfixed64 => "sfixed64",
            ScalarKind::Bool => "bool",
            ScalarKind::String => "string",
            ScalarKind::Bytes => "bytes",
            ScalarKind::Enum => "enum",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct CoercionTable {
    entries: HashMap<ScalarKind, Coercion>,
}

impl CoercionTable {
    /// A table with no entries; every scalar field will be unsupported.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers `coercion` for `kind`, returning the one it replaced.
    pub fn insert(&mut self, kind: ScalarKind, coercion: Coercion) -> Option<Coercion> {
        self.entries.insert(kind, coercion)
    }

    pub fn with(mut self, kind: ScalarKind, coercion: Coercion) -> Self {
        self.insert(kind, coercion);
        self
    }

    pub fn remove(&mut self, kind: ScalarKind) -> Option<Coercion> {
        self.entries.remove(&kind)
    }

    pub fn get(&self, kind: ScalarKind) -> Option<Coercion> {
        self.entries.get(&kind).copied()
    }
}

impl Default for CoercionTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for kind in ScalarKind::ALL {
            let coercion: Coercion = match kind {
                ScalarKind::Double | ScalarKind::Float => float,
                ScalarKind::Bool => boolean,
                ScalarKind::String => string,
                ScalarKind::Bytes => bytes_as_text,
                _ => integer,
            };
            table.insert(kind, coercion);
        }
        table
    }
}

pub fn float(value: &Value) -> Option<TreeValue> {
    match value {
        Value::F32(f) => Some(TreeValue::Float((*f).into())),
        Value::F64(f) => Some(TreeValue::Float(*f)),
        _ => None,
    }
}

/// Any integer kind, and enums as their number.
pub fn integer(value: &Value) -> Option<TreeValue> {
    let int = match value {
        Value::I32(i) => (*i).into(),
        Value::I64(i) => (*i).into(),
        Value::U32(u) => (*u).into(),
        Value::U64(u) => (*u).into(),
        Value::EnumNumber(n) => (*n).into(),
        _ => return None,
    };
    Some(TreeValue::Int(int))
}

pub fn boolean(value: &Value) -> Option<TreeValue> {
    value.as_bool().map(TreeValue::Bool)
}

pub fn string(value: &Value) -> Option<TreeValue> {
    value.as_str().map(TreeValue::from)
}

/// Bytes as text when they are valid UTF-8, the mirror of how the encoder treats strings
/// given for `bytes` fields. Anything else stays raw.
pub fn bytes_as_text(value: &Value) -> Option<TreeValue> {
    let bytes = value.as_bytes()?;
    Some(match std::str::from_utf8(bytes) {
        Ok(text) => TreeValue::from(text),
        Err(_) => TreeValue::Bytes(bytes.to_vec()),
    })
}

pub fn raw_bytes(value: &Value) -> Option<TreeValue> {
    value.as_bytes().map(|b| TreeValue::Bytes(b.to_vec()))
}
