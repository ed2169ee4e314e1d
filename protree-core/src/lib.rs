//! # Protree Core
//!
//! `protree-core` converts between loosely typed data trees (the shape you get from parsing
//! JSON) and Protobuf messages, driven entirely by runtime reflection over compiled
//! descriptors. No per-schema conversion code is generated or written.
//!
//! ```text
//! TreeValue  <->  DynamicMessage  <->  { wire bytes, text format, files }
//!     ^
//!     '-> JSON
//! ```
//!
//! ## Key Components
//!
//! * **[`converter::Converter`]:** The main entry point. It owns the schema registry and the
//!   coercion table and exposes every conversion by type name.
//! * **[`registry::SchemaRegistry`]:** An immutable name -> descriptor table, loaded once from
//!   compiled `FileDescriptorSet` files.
//! * **[`tree::TreeValue`]:** The untyped side of every conversion.
//! * **[`convert`]:** The reflection-driven encoder and decoder, plus the scalar coercion table.
//! * **[`transport`]:** Wire, text format and file adapters.
//!
//! ## Re-exports
//!
//! This crate re-exports `prost` and `prost-reflect` so that consumers use versions
//! compatible with the descriptors and messages it hands out.
pub mod convert;
pub mod converter;
pub mod registry;
pub mod transport;
pub mod tree;

// Re-exports
pub use prost;
pub use prost_reflect;
