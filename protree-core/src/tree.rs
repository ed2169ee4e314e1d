//! # Tree Values
//!
//! [`TreeValue`] is the untyped side of every conversion: the shape of data you get from
//! parsing JSON. The encoder consumes it and the decoder produces it.
//!
//! Mappings are kept in a `BTreeMap`, so keys are unique and always iterate (and serialize)
//! in lexicographic order.
use crate::transport::TransportError;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// The key/value container used by [`TreeValue::Mapping`].
pub type Mapping = BTreeMap<String, TreeValue>;

/// A loosely typed, JSON-like value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TreeValue {
    #[default]
    Null,
    Bool(bool),
    /// Wide enough to hold every Protobuf integer type exactly, `uint64` included.
    Int(i128),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Sequence(Vec<TreeValue>),
    Mapping(Mapping),
}

impl TreeValue {
    /// Short human readable name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TreeValue::Null => "null",
            TreeValue::Bool(_) => "boolean",
            TreeValue::Int(_) => "integer",
            TreeValue::Float(_) => "float",
            TreeValue::String(_) => "string",
            TreeValue::Bytes(_) => "bytes",
            TreeValue::Sequence(_) => "sequence",
            TreeValue::Mapping(_) => "mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, TreeValue::Null)
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            TreeValue::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[TreeValue]> {
        match self {
            TreeValue::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TreeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up `key` if this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&TreeValue> {
        self.as_mapping().and_then(|m| m.get(key))
    }
}

impl From<bool> for TreeValue {
    fn from(value: bool) -> Self {
        TreeValue::Bool(value)
    }
}

impl From<i32> for TreeValue {
    fn from(value: i32) -> Self {
        TreeValue::Int(value.into())
    }
}

impl From<i64> for TreeValue {
    fn from(value: i64) -> Self {
        TreeValue::Int(value.into())
    }
}

impl From<u64> for TreeValue {
    fn from(value: u64) -> Self {
        TreeValue::Int(value.into())
    }
}

impl From<f64> for TreeValue {
    fn from(value: f64) -> Self {
        TreeValue::Float(value)
    }
}

impl From<&str> for TreeValue {
    fn from(value: &str) -> Self {
        TreeValue::String(value.to_string())
    }
}

impl From<String> for TreeValue {
    fn from(value: String) -> Self {
        TreeValue::String(value)
    }
}

impl From<Vec<TreeValue>> for TreeValue {
    fn from(value: Vec<TreeValue>) -> Self {
        TreeValue::Sequence(value)
    }
}

impl From<Mapping> for TreeValue {
    fn from(value: Mapping) -> Self {
        TreeValue::Mapping(value)
    }
}

impl From<serde_json::Value> for TreeValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => TreeValue::Null,
            serde_json::Value::Bool(b) => TreeValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    TreeValue::Int(i.into())
                } else if let Some(u) = n.as_u64() {
                    TreeValue::Int(u.into())
                } else {
                    n.as_f64().map_or(TreeValue::Null, TreeValue::Float)
                }
            }
            serde_json::Value::String(s) => TreeValue::String(s),
            serde_json::Value::Array(items) => {
                TreeValue::Sequence(items.into_iter().map(TreeValue::from).collect())
            }
            serde_json::Value::Object(map) => TreeValue::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, TreeValue::from(v)))
                    .collect(),
            ),
        }
    }
}

// JSON has no byte strings: valid UTF-8 is written as text, anything else as an array of
// byte values. Integers outside the 64-bit ranges degrade to floats.
impl Serialize for TreeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TreeValue::Null => serializer.serialize_unit(),
            TreeValue::Bool(b) => serializer.serialize_bool(*b),
            TreeValue::Int(i) => {
                if let Ok(v) = i64::try_from(*i) {
                    serializer.serialize_i64(v)
                } else if let Ok(v) = u64::try_from(*i) {
                    serializer.serialize_u64(v)
                } else {
                    serializer.serialize_f64(*i as f64)
                }
            }
            TreeValue::Float(f) => serializer.serialize_f64(*f),
            TreeValue::String(s) => serializer.serialize_str(s),
            TreeValue::Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => serializer.serialize_str(text),
                Err(_) => {
                    let mut seq = serializer.serialize_seq(Some(bytes.len()))?;
                    for b in bytes {
                        seq.serialize_element(b)?;
                    }
                    seq.end()
                }
            },
            TreeValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            TreeValue::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

/// Parses a JSON document into a [`TreeValue`].
pub fn from_json_str(input: &str) -> Result<TreeValue, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    Ok(value.into())
}

/// Renders a [`TreeValue`] as pretty JSON with four space indentation.
///
/// Keys come out sorted and non-ASCII characters are written as-is.
pub fn to_json_string(value: &TreeValue) -> Result<String, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Reads a JSON file into a [`TreeValue`].
pub fn read_json_file(path: &Path) -> Result<TreeValue, TransportError> {
    if !path.is_file() {
        return Err(TransportError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    Ok(from_json_str(&content)?)
}

/// Writes `value` as JSON followed by a newline.
///
/// With `append` the document is added to the end of an existing file instead of replacing it.
pub fn write_json_file(path: &Path, value: &TreeValue, append: bool) -> Result<(), TransportError> {
    let json = to_json_string(value)?;

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;

    writeln!(file, "{json}")?;
    Ok(())
}
