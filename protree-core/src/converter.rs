//! # Converter
//!
//! [`Converter`] is the context object tying everything together: it owns the
//! [`SchemaRegistry`] and the [`CoercionTable`] and exposes every conversion by type name.
//!
//! ## Error policy
//!
//! * Structural problems (validation, unknown keys, type mismatches, unsupported kinds) and
//!   malformed in-memory payloads are returned as [`Error`].
//! * File operations are the adapter boundary: failures (missing file, I/O error, unparsable
//!   content, unknown type name) are logged with `tracing` and reported as `None` / `false`.
//!   Callers must check these return values.
//!
//! ## Example
//!
//! ```rust,no_run
//! use protree_core::converter::Converter;
//! use protree_core::registry::{RegistryConfig, SchemaRegistry};
//! use protree_core::tree;
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RegistryConfig::new("descriptors").with_registrations(["shop.v1"]);
//! let converter = Converter::new(SchemaRegistry::from_config(&config)?);
//!
//! let input = tree::from_json_str(r#"{ "id": "A-1", "items": [{ "sku": "x" }] }"#)?;
//! let order = converter.encode("shop.v1.Order", &input, true)?;
//! let path = converter.write_binary_file(&order, None);
//! # Ok(())
//! # }
//! ```
use crate::{
    convert::{self, CoercionTable, ConvertError},
    registry::SchemaRegistry,
    transport::{ParseError, TransportError, file, text, wire},
    tree::{self, TreeValue},
};
use prost_reflect::{DynamicMessage, MessageDescriptor};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Message type '{0}' is not registered")]
    SchemaNotFound(String),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Clone)]
pub struct Converter {
    registry: SchemaRegistry,
    coercions: CoercionTable,
}

impl Converter {
    /// Creates a converter using the default [`CoercionTable`].
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            registry,
            coercions: CoercionTable::default(),
        }
    }

    pub fn with_coercions(mut self, coercions: CoercionTable) -> Self {
        self.coercions = coercions;
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn coercions(&self) -> &CoercionTable {
        &self.coercions
    }

    /// Resolves a registered type name. `None` if it is not registered.
    pub fn schema(&self, type_name: &str) -> Option<MessageDescriptor> {
        self.registry.resolve(type_name)
    }

    fn require_schema(&self, type_name: &str) -> Result<MessageDescriptor, Error> {
        self.schema(type_name)
            .ok_or_else(|| Error::SchemaNotFound(type_name.to_string()))
    }

    /// Builds a message of type `type_name` from `tree`. See [`convert::encode`].
    pub fn encode(
        &self,
        type_name: &str,
        tree: &TreeValue,
        strict: bool,
    ) -> Result<DynamicMessage, Error> {
        let schema = self.require_schema(type_name)?;
        Ok(convert::encode(&schema, tree, strict)?)
    }

    /// Flattens `message` into a tree. See [`convert::decode`].
    pub fn decode(
        &self,
        message: &DynamicMessage,
        use_enum_labels: bool,
    ) -> Result<TreeValue, ConvertError> {
        convert::decode(message, &self.coercions, use_enum_labels)
    }

    pub fn encode_to_bytes(
        &self,
        type_name: &str,
        tree: &TreeValue,
        strict: bool,
    ) -> Result<Vec<u8>, Error> {
        let message = self.encode(type_name, tree, strict)?;
        Ok(wire::to_bytes(&message))
    }

    pub fn from_bytes(&self, type_name: &str, bytes: &[u8]) -> Result<DynamicMessage, Error> {
        let schema = self.require_schema(type_name)?;
        Ok(wire::from_bytes(&schema, bytes)?)
    }

    pub fn bytes_to_tree(
        &self,
        type_name: &str,
        bytes: &[u8],
        use_enum_labels: bool,
    ) -> Result<TreeValue, Error> {
        let message = self.from_bytes(type_name, bytes)?;
        Ok(self.decode(&message, use_enum_labels)?)
    }

    pub fn from_text(&self, type_name: &str, input: &str) -> Result<DynamicMessage, Error> {
        let schema = self.require_schema(type_name)?;
        Ok(text::from_text(&schema, input)?)
    }

    /// Writes the wire bytes of `message` to `path`, or to a new temporary file.
    ///
    /// Returns the path written to, or `None` if the write failed.
    pub fn write_binary_file(&self, message: &DynamicMessage, path: Option<&Path>) -> Option<PathBuf> {
        logged("write binary file", path, file::write_binary(message, path))
    }

    /// Writes the text rendering of `message` to `path`, or to a new temporary file.
    pub fn write_text_file(&self, message: &DynamicMessage, path: Option<&Path>) -> Option<PathBuf> {
        logged("write text file", path, file::write_text(message, path))
    }

    /// Encodes `tree` and writes its wire bytes.
    ///
    /// Encoding errors are returned; a failed write yields `Ok(None)`.
    pub fn encode_to_file(
        &self,
        type_name: &str,
        tree: &TreeValue,
        path: Option<&Path>,
        strict: bool,
    ) -> Result<Option<PathBuf>, Error> {
        let message = self.encode(type_name, tree, strict)?;
        Ok(self.write_binary_file(&message, path))
    }

    pub fn read_binary_file(&self, type_name: &str, path: &Path) -> Option<DynamicMessage> {
        let schema = self.logged_schema(type_name)?;
        logged("read binary file", Some(path), file::read_binary(&schema, path))
    }

    pub fn read_text_file(&self, type_name: &str, path: &Path) -> Option<DynamicMessage> {
        let schema = self.logged_schema(type_name)?;
        logged("read text file", Some(path), file::read_text(&schema, path))
    }

    /// Reads a wire file and decodes it. `Ok(None)` when the file could not be read.
    pub fn binary_file_to_tree(
        &self,
        type_name: &str,
        path: &Path,
        use_enum_labels: bool,
    ) -> Result<Option<TreeValue>, ConvertError> {
        self.read_binary_file(type_name, path)
            .map(|message| self.decode(&message, use_enum_labels))
            .transpose()
    }

    /// Reads a text file and decodes it. `Ok(None)` when the file could not be read.
    pub fn text_file_to_tree(
        &self,
        type_name: &str,
        path: &Path,
        use_enum_labels: bool,
    ) -> Result<Option<TreeValue>, ConvertError> {
        self.read_text_file(type_name, path)
            .map(|message| self.decode(&message, use_enum_labels))
            .transpose()
    }

    /// Converts a text file into a JSON file. `Ok(false)` when either file operation failed.
    pub fn text_file_to_json_file(
        &self,
        type_name: &str,
        input: &Path,
        output: &Path,
        use_enum_labels: bool,
    ) -> Result<bool, ConvertError> {
        let Some(tree) = self.text_file_to_tree(type_name, input, use_enum_labels)? else {
            return Ok(false);
        };
        Ok(Self::write_json_file(output, &tree, false))
    }

    pub fn read_json_file(path: &Path) -> Option<TreeValue> {
        logged("read JSON file", Some(path), tree::read_json_file(path))
    }

    pub fn write_json_file(path: &Path, value: &TreeValue, append: bool) -> bool {
        logged(
            "write JSON file",
            Some(path),
            tree::write_json_file(path, value, append),
        )
        .is_some()
    }

    fn logged_schema(&self, type_name: &str) -> Option<MessageDescriptor> {
        let schema = self.schema(type_name);
        if schema.is_none() {
            tracing::error!(type_name, "Message type is not registered");
        }
        schema
    }
}

fn logged<T>(operation: &str, path: Option<&Path>, result: Result<T, TransportError>) -> Option<T> {
    result
        .inspect_err(|err| {
            tracing::error!(operation, path = ?path, error = %err, "File operation failed");
        })
        .ok()
}
