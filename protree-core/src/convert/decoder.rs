//! # Decoder (Message -> Tree)
//!
//! Flattens a [`DynamicMessage`] into a [`TreeValue::Mapping`]. Only fields that are set appear
//! in the output: an unset field is absent, never `null`.
//!
//! Each field is converted by a per-field coercion, resolved from its kind before any value is
//! looked at:
//!
//! * message fields recurse,
//! * enum fields become their symbolic name when `use_enum_labels` is set,
//! * everything else goes through the [`CoercionTable`].
//!
//! Repeated fields apply the coercion element-wise. Extensions are grouped by numeric tag
//! under [`EXTENSION_KEY`].
use super::{ConvertError, EXTENSION_KEY, coercion::Coercion};
use crate::convert::{CoercionTable, ScalarKind};
use crate::tree::{Mapping, TreeValue};
use prost_reflect::{DynamicMessage, EnumDescriptor, Kind, MapKey, Value};

/// Decodes `message` into a tree mapping.
///
/// # Returns
///
/// * `Ok(TreeValue::Mapping)` - Field names (and the extension key, if any extension is set)
///   to their values.
/// * `Err(ConvertError::UnsupportedType)` - A set field has a kind with no coercion in `coercions`.
pub fn decode(
    message: &DynamicMessage,
    coercions: &CoercionTable,
    use_enum_labels: bool,
) -> Result<TreeValue, ConvertError> {
    Decoder {
        coercions,
        use_enum_labels,
    }
    .message(message)
}

enum FieldCoercion {
    Message,
    EnumLabel(EnumDescriptor),
    Scalar(ScalarKind, Coercion),
}

struct Decoder<'a> {
    coercions: &'a CoercionTable,
    use_enum_labels: bool,
}

impl Decoder<'_> {
    fn message(&self, message: &DynamicMessage) -> Result<TreeValue, ConvertError> {
        let mut result = Mapping::new();

        for (field, value) in message.fields() {
            let tree = self.field(&field.kind(), field.is_map(), field.full_name(), value)?;
            result.insert(field.name().to_string(), tree);
        }

        let mut extensions = Mapping::new();
        for (extension, value) in message.extensions() {
            let tree = self.field(
                &extension.kind(),
                extension.is_map(),
                extension.full_name(),
                value,
            )?;
            extensions.insert(extension.number().to_string(), tree);
        }

        if !extensions.is_empty() {
            result.insert(EXTENSION_KEY.to_string(), TreeValue::Mapping(extensions));
        }

        Ok(TreeValue::Mapping(result))
    }

    fn field(
        &self,
        kind: &Kind,
        is_map: bool,
        name: &str,
        value: &Value,
    ) -> Result<TreeValue, ConvertError> {
        if is_map {
            return self.map(kind, name, value);
        }

        let coercion = self.resolve(kind, name)?;

        match value {
            Value::List(items) => items
                .iter()
                .map(|item| self.apply(&coercion, name, item))
                .collect::<Result<Vec<_>, _>>()
                .map(TreeValue::Sequence),
            single => self.apply(&coercion, name, single),
        }
    }

    /// Map entries are keyed by the text form of their key.
    fn map(&self, kind: &Kind, name: &str, value: &Value) -> Result<TreeValue, ConvertError> {
        let (Kind::Message(entry), Value::Map(map)) = (kind, value) else {
            return Err(unexpected(name, "a map", value));
        };

        let coercion = self.resolve(&entry.map_entry_value_field().kind(), name)?;

        let mut result = Mapping::new();
        for (key, item) in map {
            result.insert(map_key_text(key), self.apply(&coercion, name, item)?);
        }

        Ok(TreeValue::Mapping(result))
    }

    fn resolve(&self, kind: &Kind, name: &str) -> Result<FieldCoercion, ConvertError> {
        let Some(scalar) = ScalarKind::of(kind) else {
            return Ok(FieldCoercion::Message);
        };

        if let (true, Kind::Enum(enum_desc)) = (self.use_enum_labels, kind) {
            return Ok(FieldCoercion::EnumLabel(enum_desc.clone()));
        }

        self.coercions
            .get(scalar)
            .map(|coercion| FieldCoercion::Scalar(scalar, coercion))
            .ok_or_else(|| ConvertError::UnsupportedType {
                field: name.to_string(),
                kind: scalar,
            })
    }

    fn apply(
        &self,
        coercion: &FieldCoercion,
        name: &str,
        value: &Value,
    ) -> Result<TreeValue, ConvertError> {
        match coercion {
            FieldCoercion::Message => match value {
                Value::Message(message) => self.message(message),
                other => Err(unexpected(name, "a message", other)),
            },
            // Numbers with no declared name (open enums) stay numeric.
            FieldCoercion::EnumLabel(enum_desc) => match value {
                Value::EnumNumber(number) => Ok(enum_desc.get_value(*number).map_or(
                    TreeValue::Int((*number).into()),
                    |v| TreeValue::from(v.name()),
                )),
                other => Err(unexpected(name, "an enum", other)),
            },
            FieldCoercion::Scalar(kind, coercion) => {
                coercion(value).ok_or_else(|| ConvertError::Coercion {
                    field: name.to_string(),
                    kind: *kind,
                })
            }
        }
    }
}

fn map_key_text(key: &MapKey) -> String {
    match key {
        MapKey::Bool(b) => b.to_string(),
        MapKey::I32(i) => i.to_string(),
        MapKey::I64(i) => i.to_string(),
        MapKey::U32(u) => u.to_string(),
        MapKey::U64(u) => u.to_string(),
        MapKey::String(s) => s.clone(),
    }
}

fn unexpected(field: &str, expected: &str, value: &Value) -> ConvertError {
    ConvertError::TypeMismatch {
        field: field.to_string(),
        expected: expected.to_string(),
        found: format!("{value:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_reflect::DescriptorPool;
    use prost_types::{
        DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
        FileDescriptorProto, FileDescriptorSet,
        field_descriptor_proto::{Label, Type},
    };

    fn palette() -> DynamicMessage {
        let color = EnumDescriptorProto {
            name: Some("Color".into()),
            value: vec![
                EnumValueDescriptorProto {
                    name: Some("RED".into()),
                    number: Some(0),
                    ..Default::default()
                },
                EnumValueDescriptorProto {
                    name: Some("GREEN".into()),
                    number: Some(1),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let palette = DescriptorProto {
            name: Some("Palette".into()),
            field: vec![FieldDescriptorProto {
                name: Some("colors".into()),
                number: Some(1),
                label: Some(Label::Repeated as i32),
                r#type: Some(Type::Enum as i32),
                type_name: Some(".paint.Color".into()),
                ..Default::default()
            }],
            ..Default::default()
        };

        let file = FileDescriptorProto {
            name: Some("paint.proto".into()),
            package: Some("paint".into()),
            message_type: vec![palette],
            enum_type: vec![color],
            ..Default::default()
        };

        let pool = DescriptorPool::from_file_descriptor_set(FileDescriptorSet { file: vec![file] })
            .unwrap();
        let desc = pool.get_message_by_name("paint.Palette").unwrap();

        let mut message = DynamicMessage::new(desc);
        message.set_field_by_name(
            "colors",
            Value::List(vec![Value::EnumNumber(1), Value::EnumNumber(7)]),
        );
        message
    }

    #[test]
    fn test_enum_labels_fall_back_to_numbers() {
        let tree = decode(&palette(), &CoercionTable::default(), true).unwrap();

        assert_eq!(
            tree.get("colors"),
            Some(&TreeValue::Sequence(vec![
                TreeValue::from("GREEN"),
                TreeValue::Int(7)
            ]))
        );
    }

    #[test]
    fn test_enum_numbers_without_labels() {
        let tree = decode(&palette(), &CoercionTable::default(), false).unwrap();

        assert_eq!(
            tree.get("colors"),
            Some(&TreeValue::Sequence(vec![TreeValue::Int(1), TreeValue::Int(7)]))
        );
    }

    #[test]
    fn test_missing_coercion_is_unsupported() {
        let err = decode(&palette(), &CoercionTable::empty(), false).unwrap_err();

        assert_eq!(
            err,
            ConvertError::UnsupportedType {
                field: "paint.Palette.colors".into(),
                kind: ScalarKind::Enum,
            }
        );
    }
}
