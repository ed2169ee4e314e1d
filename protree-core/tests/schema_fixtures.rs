// Descriptors shared by the integration tests.
// They are built from descriptor protos directly, so no `protoc` is needed. The equivalent
// proto2 source is:
//
//   package fixtures;
//
//   enum Color { RED = 0; GREEN = 1; BLUE = 2; }
//
//   message Address { optional string city = 1; }
//
//   message Person {
//     required string name = 1;
//     optional int32 age = 2;
//     repeated string tags = 3;
//     optional Address address = 4;
//     optional Color color = 5;
//     optional bytes avatar = 6;
//     repeated Address previous = 7;
//     map<string, int32> scores = 8;
//     optional uint64 id = 9;
//     optional double score = 10;
//     optional float ratio = 11;
//     extensions 100 to 199;
//   }
//
//   extend Person {
//     optional int32 priority = 100;
//     repeated string aliases = 101;
//     optional string age = 102;
//   }
//
//   message Account {
//     required string id = 1 [default = "anonymous"];
//     optional Person owner = 2;
//   }
//
//   message Node {
//     optional string label = 1;
//     repeated Node children = 2;
//   }
#![allow(dead_code)]

use prost::Message;
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileDescriptorSet, MessageOptions,
    descriptor_proto::ExtensionRange,
    field_descriptor_proto::{Label, Type},
};
use protree_core::converter::Converter;
use protree_core::prost_reflect::DescriptorPool;
use protree_core::registry::SchemaRegistry;

pub const PERSON: &str = "fixtures.Person";
pub const ACCOUNT: &str = "fixtures.Account";
pub const NODE: &str = "fixtures.Node";

fn scalar(name: &str, number: i32, label: Label, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

fn typed(name: &str, number: i32, label: Label, ty: Type, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(type_name.to_string()),
        ..scalar(name, number, label, ty)
    }
}

fn extension(name: &str, number: i32, label: Label, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        extendee: Some(".fixtures.Person".to_string()),
        ..scalar(name, number, label, ty)
    }
}

fn color() -> EnumDescriptorProto {
    let value = |name: &str, number: i32| EnumValueDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        ..Default::default()
    };

    EnumDescriptorProto {
        name: Some("Color".to_string()),
        value: vec![value("RED", 0), value("GREEN", 1), value("BLUE", 2)],
        ..Default::default()
    }
}

fn person() -> DescriptorProto {
    let scores_entry = DescriptorProto {
        name: Some("ScoresEntry".to_string()),
        field: vec![
            scalar("key", 1, Label::Optional, Type::String),
            scalar("value", 2, Label::Optional, Type::Int32),
        ],
        options: Some(MessageOptions {
            map_entry: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    };

    DescriptorProto {
        name: Some("Person".to_string()),
        field: vec![
            scalar("name", 1, Label::Required, Type::String),
            scalar("age", 2, Label::Optional, Type::Int32),
            scalar("tags", 3, Label::Repeated, Type::String),
            typed("address", 4, Label::Optional, Type::Message, ".fixtures.Address"),
            typed("color", 5, Label::Optional, Type::Enum, ".fixtures.Color"),
            scalar("avatar", 6, Label::Optional, Type::Bytes),
            typed("previous", 7, Label::Repeated, Type::Message, ".fixtures.Address"),
            typed(
                "scores",
                8,
                Label::Repeated,
                Type::Message,
                ".fixtures.Person.ScoresEntry",
            ),
            scalar("id", 9, Label::Optional, Type::Uint64),
            scalar("score", 10, Label::Optional, Type::Double),
            scalar("ratio", 11, Label::Optional, Type::Float),
        ],
        nested_type: vec![scores_entry],
        extension_range: vec![ExtensionRange {
            start: Some(100),
            end: Some(200),
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn account() -> DescriptorProto {
    DescriptorProto {
        name: Some("Account".to_string()),
        field: vec![
            FieldDescriptorProto {
                default_value: Some("anonymous".to_string()),
                ..scalar("id", 1, Label::Required, Type::String)
            },
            typed("owner", 2, Label::Optional, Type::Message, ".fixtures.Person"),
        ],
        ..Default::default()
    }
}

fn node() -> DescriptorProto {
    DescriptorProto {
        name: Some("Node".to_string()),
        field: vec![
            scalar("label", 1, Label::Optional, Type::String),
            typed("children", 2, Label::Repeated, Type::Message, ".fixtures.Node"),
        ],
        ..Default::default()
    }
}

fn address() -> DescriptorProto {
    DescriptorProto {
        name: Some("Address".to_string()),
        field: vec![scalar("city", 1, Label::Optional, Type::String)],
        ..Default::default()
    }
}

pub fn file_descriptor_set() -> FileDescriptorSet {
    let file = FileDescriptorProto {
        name: Some("fixtures.proto".to_string()),
        package: Some("fixtures".to_string()),
        syntax: Some("proto2".to_string()),
        message_type: vec![address(), person(), account(), node()],
        enum_type: vec![color()],
        extension: vec![
            extension("priority", 100, Label::Optional, Type::Int32),
            extension("aliases", 101, Label::Repeated, Type::String),
            extension("age", 102, Label::Optional, Type::String),
        ],
        ..Default::default()
    };

    FileDescriptorSet { file: vec![file] }
}

pub fn descriptor_set_bytes() -> Vec<u8> {
    file_descriptor_set().encode_to_vec()
}

pub fn pool() -> DescriptorPool {
    DescriptorPool::from_file_descriptor_set(file_descriptor_set())
        .expect("Fixture descriptors must be valid")
}

pub fn converter() -> Converter {
    let registry = SchemaRegistry::from_pool(pool(), &[]).expect("Failed to build registry");
    Converter::new(registry)
}
