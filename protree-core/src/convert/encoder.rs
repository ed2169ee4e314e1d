//! # Encoder (Tree -> Message)
//!
//! Builds a fresh [`DynamicMessage`] from a [`TreeValue`] mapping.
//!
//! 1. **Presence validation**: a field that is `required` *and* declares a default value must
//!    appear in the input. Required fields without a default are not checked.
//! 2. **Strict mode**: every input key must name a field of the schema.
//! 3. **Population**: each present field is set from its raw input value. Sub-messages are
//!    encoded recursively, in non-strict mode.
//!
//! Values are mapped onto the field kind without any semantic conversion: integers and `float`
//! values must fit the target width, enums take either their number or their symbolic name and
//! `bytes` fields take a string's UTF-8 encoding.
use super::{ConvertError, EXTENSION_KEY, kind_label};
use crate::tree::{Mapping, TreeValue};
use bytes::Bytes;
use prost_reflect::{
    Cardinality, DynamicMessage, Kind, MapKey, MessageDescriptor, ReflectMessage, Value,
};
use std::collections::HashMap;

/// Encodes `tree` as a message of type `schema`.
///
/// # Returns
///
/// * `Ok(DynamicMessage)` - The populated message.
/// * `Err(ConvertError::Validation)` - A required field with a default value is missing.
/// * `Err(ConvertError::UnknownField)` - `strict` is set and a key matches no field.
/// * `Err(ConvertError::TypeMismatch)` - A value does not fit its field.
pub fn encode(
    schema: &MessageDescriptor,
    tree: &TreeValue,
    strict: bool,
) -> Result<DynamicMessage, ConvertError> {
    let input = tree
        .as_mapping()
        .ok_or_else(|| ConvertError::mismatch(schema.full_name(), "a mapping", tree))?;

    check_presence(schema, input)?;

    if strict {
        check_keys(schema, input)?;
    }

    let mut message = DynamicMessage::new(schema.clone());

    for field in schema.fields() {
        let Some(item) = input.get(field.name()).filter(|v| !v.is_null()) else {
            continue;
        };

        let value = field_value(
            &field.kind(),
            field.is_list(),
            field.is_map(),
            field.full_name(),
            item,
        )?;

        message
            .try_set_field(&field, value)
            .map_err(|e| ConvertError::TypeMismatch {
                field: field.full_name().to_string(),
                expected: kind_label(&field.kind()),
                found: e.to_string(),
            })?;
    }

    if let Some(extensions) = input.get(EXTENSION_KEY).filter(|v| !v.is_null()) {
        encode_extensions(&mut message, extensions, strict)?;
    }

    Ok(message)
}

fn check_presence(schema: &MessageDescriptor, input: &Mapping) -> Result<(), ConvertError> {
    for field in schema.fields() {
        let required = matches!(field.cardinality(), Cardinality::Required);
        let has_default = field.field_descriptor_proto().default_value.is_some();

        let missing = input.get(field.name()).is_none_or(TreeValue::is_null);

        if required && has_default && missing {
            return Err(ConvertError::Validation {
                message: schema.full_name().to_string(),
                field: field.name().to_string(),
            });
        }
    }
    Ok(())
}

fn check_keys(schema: &MessageDescriptor, input: &Mapping) -> Result<(), ConvertError> {
    for key in input.keys() {
        if key != EXTENSION_KEY && schema.get_field_by_name(key).is_none() {
            return Err(ConvertError::UnknownField {
                message: schema.full_name().to_string(),
                key: key.clone(),
            });
        }
    }
    Ok(())
}

/// Extensions arrive as a mapping from numeric tag to value.
fn encode_extensions(
    message: &mut DynamicMessage,
    tree: &TreeValue,
    strict: bool,
) -> Result<(), ConvertError> {
    let schema = message.descriptor();
    let entries = tree
        .as_mapping()
        .ok_or_else(|| ConvertError::mismatch(EXTENSION_KEY, "a mapping", tree))?;

    for (tag, item) in entries {
        let extension = tag.parse::<u32>().ok().and_then(|n| schema.get_extension(n));

        let Some(extension) = extension else {
            if strict {
                return Err(ConvertError::UnknownField {
                    message: schema.full_name().to_string(),
                    key: format!("{EXTENSION_KEY}.{tag}"),
                });
            }
            continue;
        };

        if item.is_null() {
            continue;
        }

        let value = field_value(
            &extension.kind(),
            extension.is_list(),
            extension.is_map(),
            extension.full_name(),
            item,
        )?;

        if !value.is_valid_for_extension(&extension) {
            return Err(ConvertError::mismatch(
                extension.full_name(),
                kind_label(&extension.kind()),
                item,
            ));
        }

        message.set_extension(&extension, value);
    }
    Ok(())
}

fn field_value(
    kind: &Kind,
    is_list: bool,
    is_map: bool,
    field: &str,
    item: &TreeValue,
) -> Result<Value, ConvertError> {
    if is_map {
        return map_value(kind, field, item);
    }

    if is_list {
        let items = item
            .as_sequence()
            .ok_or_else(|| ConvertError::mismatch(field, "a sequence", item))?;

        let values = items
            .iter()
            .map(|element| element_value(kind, field, element))
            .collect::<Result<Vec<_>, _>>()?;

        return Ok(Value::List(values));
    }

    element_value(kind, field, item)
}

fn element_value(kind: &Kind, field: &str, item: &TreeValue) -> Result<Value, ConvertError> {
    let mismatch = || ConvertError::mismatch(field, kind_label(kind), item);

    let value = match (kind, item) {
        (Kind::Message(schema), _) => Value::Message(encode(schema, item, false)?),

        (Kind::Double, TreeValue::Float(f)) => Value::F64(*f),
        (Kind::Double, TreeValue::Int(i)) => Value::F64(*i as f64),
        (Kind::Float, TreeValue::Float(f)) => Value::F32(narrow_f32(*f, field, item)?),
        (Kind::Float, TreeValue::Int(i)) => Value::F32(narrow_f32(*i as f64, field, item)?),

        (Kind::Int32 | Kind::Sint32 | Kind::Sfixed32, TreeValue::Int(i)) => {
            Value::I32(narrow(*i, kind, field)?)
        }
        (Kind::Int64 | Kind::Sint64 | Kind::Sfixed64, TreeValue::Int(i)) => {
            Value::I64(narrow(*i, kind, field)?)
        }
        (Kind::Uint32 | Kind::Fixed32, TreeValue::Int(i)) => Value::U32(narrow(*i, kind, field)?),
        (Kind::Uint64 | Kind::Fixed64, TreeValue::Int(i)) => Value::U64(narrow(*i, kind, field)?),

        (Kind::Bool, TreeValue::Bool(b)) => Value::Bool(*b),
        (Kind::String, TreeValue::String(s)) => Value::String(s.clone()),
        (Kind::Bytes, TreeValue::String(s)) => Value::Bytes(Bytes::copy_from_slice(s.as_bytes())),
        (Kind::Bytes, TreeValue::Bytes(b)) => Value::Bytes(Bytes::copy_from_slice(b)),

        (Kind::Enum(_), TreeValue::Int(i)) => Value::EnumNumber(narrow(*i, kind, field)?),
        (Kind::Enum(enum_desc), TreeValue::String(label)) => {
            let number = enum_desc
                .get_value_by_name(label)
                .ok_or_else(mismatch)?
                .number();
            Value::EnumNumber(number)
        }

        _ => return Err(mismatch()),
    };

    Ok(value)
}

fn map_value(kind: &Kind, field: &str, item: &TreeValue) -> Result<Value, ConvertError> {
    let Kind::Message(entry) = kind else {
        return Err(ConvertError::mismatch(field, "a map entry", item));
    };

    let entries = item
        .as_mapping()
        .ok_or_else(|| ConvertError::mismatch(field, "a mapping", item))?;

    let key_kind = entry.map_entry_key_field().kind();
    let value_kind = entry.map_entry_value_field().kind();

    let mut map = HashMap::with_capacity(entries.len());
    for (key, value) in entries {
        map.insert(
            map_key(&key_kind, field, key)?,
            element_value(&value_kind, field, value)?,
        );
    }

    Ok(Value::Map(map))
}

fn map_key(kind: &Kind, field: &str, key: &str) -> Result<MapKey, ConvertError> {
    let invalid = || ConvertError::TypeMismatch {
        field: field.to_string(),
        expected: format!("a {} map key", kind_label(kind)),
        found: format!("'{key}'"),
    };

    let key = match kind {
        Kind::String => MapKey::String(key.to_string()),
        Kind::Bool => MapKey::Bool(key.parse().map_err(|_| invalid())?),
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => {
            MapKey::I32(key.parse().map_err(|_| invalid())?)
        }
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => {
            MapKey::I64(key.parse().map_err(|_| invalid())?)
        }
        Kind::Uint32 | Kind::Fixed32 => MapKey::U32(key.parse().map_err(|_| invalid())?),
        Kind::Uint64 | Kind::Fixed64 => MapKey::U64(key.parse().map_err(|_| invalid())?),
        _ => return Err(invalid()),
    };

    Ok(key)
}

fn narrow<T: TryFrom<i128>>(value: i128, kind: &Kind, field: &str) -> Result<T, ConvertError> {
    T::try_from(value).map_err(|_| ConvertError::TypeMismatch {
        field: field.to_string(),
        expected: kind_label(kind),
        found: format!("out of range integer {value}"),
    })
}

/// Finite values that overflow `f32` are rejected instead of becoming infinite.
fn narrow_f32(value: f64, field: &str, item: &TreeValue) -> Result<f32, ConvertError> {
    let narrowed = value as f32;
    if value.is_finite() && !narrowed.is_finite() {
        return Err(ConvertError::TypeMismatch {
            field: field.to_string(),
            expected: "float".to_string(),
            found: format!("out of range {} {value}", item.kind_name()),
        });
    }
    Ok(narrowed)
}
