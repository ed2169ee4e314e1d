use prost::Message;
use prost_types::{DescriptorProto, FileDescriptorProto, FileDescriptorSet};
use protree_core::prost_reflect::DescriptorPool;
use protree_core::registry::{RegistryConfig, RegistryError, SchemaRegistry};
use std::fs;
use std::path::Path;

mod schema_fixtures;

fn descriptor_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("fixtures.bin"), schema_fixtures::descriptor_set_bytes()).unwrap();
    // Files without a descriptor extension are skipped.
    fs::write(dir.path().join("README.txt"), "not a descriptor").unwrap();
    dir
}

fn config(dir: &Path, registrations: &[&str]) -> RegistryConfig {
    RegistryConfig::new(dir).with_registrations(registrations.iter().copied())
}

#[test]
fn test_register_everything_by_default() {
    let dir = descriptor_dir();
    let registry = SchemaRegistry::from_config(&config(dir.path(), &[])).unwrap();

    assert_eq!(
        registry.type_names(),
        vec![
            "fixtures.Account",
            "fixtures.Address",
            "fixtures.Node",
            "fixtures.Person"
        ]
    );
}

#[test]
fn test_register_single_message() {
    let dir = descriptor_dir();
    let registry = SchemaRegistry::from_config(&config(dir.path(), &["fixtures.Person"])).unwrap();

    assert_eq!(registry.type_names(), vec!["fixtures.Person"]);

    let by_full_name = registry.resolve("fixtures.Person").unwrap();
    let by_short_name = registry.resolve("Person").unwrap();
    assert_eq!(by_full_name, by_short_name);
    assert!(registry.resolve(".fixtures.Person").is_some());

    // Known to the pool, but not registered.
    assert!(registry.pool().get_message_by_name("fixtures.Account").is_some());
    assert!(registry.resolve("fixtures.Account").is_none());
}

#[test]
fn test_register_package() {
    let dir = descriptor_dir();
    let registry = SchemaRegistry::from_config(&config(dir.path(), &["fixtures"])).unwrap();

    assert!(registry.resolve("Account").is_some());
    assert!(registry.resolve("Node").is_some());
    // Map entry types never become resolvable.
    assert!(registry.resolve("fixtures.Person.ScoresEntry").is_none());
}

#[test]
fn test_unknown_registration() {
    let dir = descriptor_dir();
    let err = SchemaRegistry::from_config(&config(dir.path(), &["fixtures.Ghost"])).unwrap_err();

    assert!(matches!(err, RegistryError::UnknownRegistration(name) if name == "fixtures.Ghost"));
}

#[test]
fn test_invalid_descriptor_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.pb"), [0xff, 0xff, 0xff]).unwrap();

    let err = SchemaRegistry::from_config(&config(dir.path(), &[])).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidDescriptor { .. }));
}

#[test]
fn test_ambiguous_short_names_only_resolve_fully_qualified() {
    let mut files = schema_fixtures::file_descriptor_set();
    files.file.push(FileDescriptorProto {
        name: Some("other.proto".to_string()),
        package: Some("other".to_string()),
        message_type: vec![DescriptorProto {
            name: Some("Address".to_string()),
            ..Default::default()
        }],
        ..Default::default()
    });

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("all.desc"), files.encode_to_vec()).unwrap();

    let registry = SchemaRegistry::from_config(&config(dir.path(), &[])).unwrap();

    assert!(registry.resolve("Address").is_none());
    assert!(registry.resolve("fixtures.Address").is_some());
    assert!(registry.resolve("other.Address").is_some());
    assert!(registry.resolve("Person").is_some());
}

#[test]
fn test_descriptor_sets_are_merged() {
    let other = FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some("other.proto".to_string()),
            package: Some("other".to_string()),
            message_type: vec![DescriptorProto {
                name: Some("Ping".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }],
    };

    let dir = descriptor_dir();
    fs::write(dir.path().join("other.protoset"), other.encode_to_vec()).unwrap();

    let registry = SchemaRegistry::from_config(&config(dir.path(), &["other", "fixtures.Node"])).unwrap();

    assert_eq!(registry.type_names(), vec!["fixtures.Node", "other.Ping"]);
}

#[test]
fn test_from_pool() {
    let pool: DescriptorPool = schema_fixtures::pool();
    let registry = SchemaRegistry::from_pool(pool, &["fixtures.Address".to_string()]).unwrap();

    assert_eq!(registry.type_names(), vec!["fixtures.Address"]);
}
