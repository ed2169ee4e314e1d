//! # Schema Registry
//!
//! An immutable table from type name to [`MessageDescriptor`], built once at startup.
//!
//! The descriptors themselves come from already compiled `FileDescriptorSet` files
//! (e.g. produced by `protoc --descriptor_set_out`). The registry never parses `.proto`
//! sources and never evaluates type names: resolving a name is a plain map lookup.
//!
//! ## Registrations
//!
//! A registration selects which messages of the loaded pool become resolvable:
//!
//! * a fully qualified message name (e.g. `shop.v1.Order`), or
//! * a package name (e.g. `shop.v1`), registering every message in it.
//!
//! With no registrations at all, every message of the pool is registered.
//! Registered messages resolve by full name, and by short name (`Order`) as long as no
//! other registered message shares it.
use prost_reflect::{DescriptorPool, MessageDescriptor};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable holding the directory of compiled descriptor sets.
pub const DESCRIPTOR_DIR_ENV: &str = "PB_FILES_ROOT";

/// Environment variable holding newline separated registrations.
pub const REGISTRATIONS_ENV: &str = "PB_IMPORTING";

const DESCRIPTOR_EXTENSIONS: &[&str] = &["bin", "pb", "desc", "protoset"];

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Failed to read descriptor directory '{}': {source}", .path.display())]
    ReadDir { path: PathBuf, source: io::Error },

    #[error("Failed to read descriptor file '{}': {source}", .path.display())]
    ReadFile { path: PathBuf, source: io::Error },

    #[error("Invalid descriptor set in '{}': {source}", .path.display())]
    InvalidDescriptor {
        path: PathBuf,
        source: prost_reflect::DescriptorError,
    },

    #[error("Registration '{0}' does not match any message or package")]
    UnknownRegistration(String),
}

/// Where to load descriptors from and which messages to register.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    pub descriptor_dir: PathBuf,
    pub registrations: Vec<String>,
}

impl RegistryConfig {
    pub fn new(descriptor_dir: impl Into<PathBuf>) -> Self {
        Self {
            descriptor_dir: descriptor_dir.into(),
            registrations: Vec::new(),
        }
    }

    pub fn with_registrations<I, S>(mut self, registrations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registrations = registrations.into_iter().map(Into::into).collect();
        self
    }

    /// Reads the configuration from `PB_FILES_ROOT` and `PB_IMPORTING`.
    ///
    /// Returns `None` when `PB_FILES_ROOT` is unset or blank.
    pub fn from_env() -> Option<Self> {
        let dir = std::env::var(DESCRIPTOR_DIR_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())?;

        let registrations = std::env::var(REGISTRATIONS_ENV)
            .map(|raw| parse_registrations(&raw))
            .unwrap_or_default();

        Some(Self {
            descriptor_dir: PathBuf::from(dir),
            registrations,
        })
    }
}

/// Splits a registration list on newlines.
///
/// A literal `\n` (backslash, `n`) also separates entries, since that is what ends up in the
/// variable when it is set from a single-line shell string.
pub fn parse_registrations(raw: &str) -> Vec<String> {
    raw.replace("\\n", "\n")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    pool: DescriptorPool,
    schemas: HashMap<String, MessageDescriptor>,
}

impl SchemaRegistry {
    /// Loads every descriptor set found in `config.descriptor_dir` and applies the registrations.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let pool = load_descriptor_dir(&config.descriptor_dir)?;
        Self::from_pool(pool, &config.registrations)
    }

    /// Builds the registry from an already loaded pool.
    pub fn from_pool(pool: DescriptorPool, registrations: &[String]) -> Result<Self, RegistryError> {
        let mut selected = Vec::new();

        if registrations.is_empty() {
            selected.extend(pool.all_messages());
        }

        for registration in registrations {
            let registration = registration.trim();

            if let Some(message) = pool.get_message_by_name(registration) {
                selected.push(message);
                continue;
            }

            let in_package: Vec<_> = pool
                .all_messages()
                .filter(|m| m.package_name() == registration)
                .collect();

            if in_package.is_empty() {
                return Err(RegistryError::UnknownRegistration(registration.to_string()));
            }

            selected.extend(in_package);
        }

        let mut schemas = HashMap::new();
        // `None` marks a short name claimed by more than one message.
        let mut short_names: HashMap<String, Option<MessageDescriptor>> = HashMap::new();

        for message in selected.into_iter().filter(|m| !m.is_map_entry()) {
            short_names
                .entry(message.name().to_string())
                .and_modify(|existing| {
                    if existing
                        .as_ref()
                        .is_some_and(|m| m.full_name() != message.full_name())
                    {
                        *existing = None;
                    }
                })
                .or_insert_with(|| Some(message.clone()));

            schemas.insert(message.full_name().to_string(), message);
        }

        for (name, message) in short_names {
            match message {
                Some(message) => {
                    schemas.entry(name).or_insert(message);
                }
                None => {
                    tracing::warn!(name = %name, "Ambiguous short name, only full names will resolve")
                }
            }
        }

        tracing::debug!(entries = schemas.len(), "Schema registry initialized");

        Ok(Self { pool, schemas })
    }

    /// Looks up a registered message by full or short name.
    pub fn resolve(&self, type_name: &str) -> Option<MessageDescriptor> {
        self.schemas
            .get(type_name.trim_start_matches('.'))
            .cloned()
    }

    /// Fully qualified names of every registered message, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.values().map(|m| m.full_name()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// The pool every registered descriptor belongs to.
    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }
}

fn load_descriptor_dir(dir: &Path) -> Result<DescriptorPool, RegistryError> {
    let read_dir_error = |source: io::Error| RegistryError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir_error)? {
        let path = entry.map_err(read_dir_error)?.path();
        let is_descriptor = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| DESCRIPTOR_EXTENSIONS.contains(&ext));

        if is_descriptor && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut pool = DescriptorPool::new();
    for path in files {
        let bytes = fs::read(&path).map_err(|source| RegistryError::ReadFile {
            path: path.clone(),
            source,
        })?;

        pool.decode_file_descriptor_set(bytes.as_slice())
            .map_err(|source| RegistryError::InvalidDescriptor {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), "Loaded descriptor set");
    }

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_registrations() {
        assert_eq!(
            parse_registrations("shop.v1.Order\n  shop.v1 \n\n"),
            vec!["shop.v1.Order", "shop.v1"]
        );
        assert_eq!(parse_registrations("a.B\\nc.D"), vec!["a.B", "c.D"]);
        assert!(parse_registrations("").is_empty());
    }

    #[test]
    fn test_missing_descriptor_dir() {
        let config = RegistryConfig::new("/definitely/not/a/dir");
        let err = SchemaRegistry::from_config(&config).unwrap_err();

        assert!(matches!(err, RegistryError::ReadDir { .. }));
    }
}
