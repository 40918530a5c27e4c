//! Avro to Iceberg conversion.
//!
//! IDs missing from the Avro schema are allocated in post-order: a field's
//! type is converted before the field's own ID is resolved, array items
//! before `element-id`, and map values before `key-id` and `value-id`.
//! Fields are visited in declaration order, so the same Avro schema always
//! receives the same IDs.

use std::sync::Arc;

use iceberg::spec::{
    ListType, Literal, MapType, NestedField, NestedFieldRef, PrimitiveType, Schema, StructType,
    Type,
};
use log::debug;
use serde_json::Value;

use crate::{
    avro::{
        ArraySchema, AvroSchema, ELEMENT_ID_PROP, FIELD_ID_PROP, ICEBERG_FIELD_NAME_PROP,
        KEY_ID_PROP, MapSchema, RecordField, VALUE_ID_PROP,
    },
    catalog::DEFAULT_SCHEMA_ID,
    error::{Error, Result},
    ids::IdAllocator,
    mapping::{avro_fixed_to_iceberg, avro_primitive_to_iceberg},
    union::resolve_union,
};

/// Converts an Avro record schema into an Iceberg schema.
///
/// The top-level schema must be a record. Fails on the first node that
/// cannot be converted, and when an ID is used twice.
pub fn avro_to_iceberg(schema: &AvroSchema) -> Result<Schema> {
    let AvroSchema::Record(record) = schema else {
        return Err(Error::NotARecord {
            found: schema.type_name().to_string(),
        });
    };
    debug!(
        "Converting Avro record '{}' with {} field(s) to Iceberg",
        record.name.name,
        record.fields.len()
    );

    let mut converter = AvroToIceberg::default();
    let fields = converter.convert_fields(&record.fields)?;
    let schema = Schema::builder()
        .with_schema_id(DEFAULT_SCHEMA_ID)
        .with_fields(fields)
        .build()?;

    debug!(
        "Converted Avro record '{}'; highest field id {}",
        record.name.name,
        schema.highest_field_id()
    );
    Ok(schema)
}

#[derive(Debug, Default)]
struct AvroToIceberg {
    ids: IdAllocator,
}

impl AvroToIceberg {
    fn convert_fields(&mut self, fields: &[RecordField]) -> Result<Vec<NestedFieldRef>> {
        fields
            .iter()
            .map(|field| self.convert_field(field).map(Arc::new))
            .collect()
    }

    fn convert_field(&mut self, field: &RecordField) -> Result<NestedField> {
        let (schema, required) = resolve_union(&field.schema)?;
        let field_type = self.convert_type(schema)?;
        let id = self.ids.resolve(&field.props, FIELD_ID_PROP)?;
        let name = field
            .props
            .get(ICEBERG_FIELD_NAME_PROP)
            .and_then(Value::as_str)
            .unwrap_or(field.name.as_str());

        let write_default = match &field.default {
            Some(default) => parse_default(name, default, &field_type)?,
            None => None,
        };
        let mut converted = NestedField::new(id, name, field_type, required);
        if let Some(doc) = &field.doc {
            converted = converted.with_doc(doc);
        }
        if let Some(default) = write_default {
            converted = converted.with_write_default(default);
        }
        Ok(converted)
    }

    fn convert_type(&mut self, schema: &AvroSchema) -> Result<Type> {
        match schema {
            AvroSchema::Record(record) => Ok(Type::Struct(StructType::new(
                self.convert_fields(&record.fields)?,
            ))),
            AvroSchema::Array(array) if array.is_logical_map() => self.convert_logical_map(array),
            AvroSchema::Array(array) => self.convert_array(array),
            AvroSchema::Map(map) => self.convert_map(map),
            AvroSchema::Enum(_) => Ok(Type::Primitive(PrimitiveType::String)),
            AvroSchema::Fixed(fixed) => Ok(Type::Primitive(avro_fixed_to_iceberg(fixed)?)),
            AvroSchema::Primitive(primitive) => {
                Ok(Type::Primitive(avro_primitive_to_iceberg(primitive)?))
            }
            // Unions are only meaningful as the type of a field, array items
            // or map values, where resolve_union has already unwrapped them.
            AvroSchema::Union(_) => Err(Error::UnsupportedUnion(schema.to_string())),
        }
    }

    fn convert_array(&mut self, array: &ArraySchema) -> Result<Type> {
        let (items, element_required) = resolve_union(&array.items)?;
        let element_type = self.convert_type(items)?;
        let element_id = self.ids.resolve(&array.props, ELEMENT_ID_PROP)?;
        Ok(Type::List(ListType::new(Arc::new(
            NestedField::list_element(element_id, element_type, element_required),
        ))))
    }

    fn convert_map(&mut self, map: &MapSchema) -> Result<Type> {
        let (values, value_required) = resolve_union(&map.values)?;
        let value_type = self.convert_type(values)?;
        let key_id = self.ids.resolve(&map.props, KEY_ID_PROP)?;
        let value_id = self.ids.resolve(&map.props, VALUE_ID_PROP)?;
        Ok(Type::Map(MapType::new(
            Arc::new(NestedField::map_key_element(
                key_id,
                Type::Primitive(PrimitiveType::String),
            )),
            Arc::new(NestedField::map_value_element(
                value_id,
                value_type,
                value_required,
            )),
        )))
    }

    /// Arrays tagged `logicalType: map` hold (key, value) records.
    fn convert_logical_map(&mut self, array: &ArraySchema) -> Result<Type> {
        let AvroSchema::Record(entry) = array.items.as_ref() else {
            return Err(Error::InvalidLogicalMap(array.items.to_string()));
        };
        let [key_field, value_field] = entry.fields.as_slice() else {
            return Err(Error::InvalidLogicalMap(array.items.to_string()));
        };
        let key = self.convert_field(key_field)?;
        let value = self.convert_field(value_field)?;
        Ok(Type::Map(MapType::new(
            Arc::new(NestedField::map_key_element(key.id, *key.field_type)),
            Arc::new(NestedField::map_value_element(
                value.id,
                *value.field_type,
                value.required,
            )),
        )))
    }
}

/// Reads an Avro field default as a literal of the field's type. A null
/// default means the field has no write default.
fn parse_default(
    field: &str,
    default: &Value,
    field_type: &Type,
) -> Result<Option<Literal>> {
    Literal::try_from_json(default.clone(), field_type).map_err(|err| Error::InvalidDefault {
        field: field.to_string(),
        reason: err.to_string(),
    })
}
