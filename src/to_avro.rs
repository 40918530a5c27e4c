//! Iceberg to Avro conversion.
//!
//! The top-level struct becomes a record named after the table; any nested
//! struct becomes a record named `r{id}` after the field, list element or
//! map entry that holds it. Field IDs travel as `field-id`, `element-id`,
//! `key-id` and `value-id` properties.

use iceberg::{
    ErrorKind,
    spec::{
        ListType, MapType, NestedField, NestedFieldRef, PrimitiveType, Schema, SchemaVisitor,
        StructType, visit_schema,
    },
};
use log::{debug, trace};
use serde_json::Value;

use crate::{
    avro::{
        AvroSchema, ELEMENT_ID_PROP, FIELD_ID_PROP, ICEBERG_FIELD_NAME_PROP, KEY_ID_PROP,
        LOGICAL_MAP, LOGICAL_TYPE_PROP, PrimitiveKind, PrimitiveSchema, Properties, RecordField,
        VALUE_ID_PROP,
    },
    error::{Error, Result},
    mapping::iceberg_primitive_to_avro,
    sanitize::sanitize_name,
};

const MAP_KEY_NAME: &str = "key";
const MAP_VALUE_NAME: &str = "value";

/// Converts an Iceberg schema into an Avro record named `name`.
///
/// `name` is sanitized like a field name, so `my-table` produces the record
/// `my_x2Dtable`. Fails when two different records would share a name.
pub fn iceberg_to_avro(name: &str, schema: &Schema) -> Result<AvroSchema> {
    let record_name = sanitize_name(name)?;
    debug!(
        "Converting Iceberg schema {} with {} field(s) to Avro record '{record_name}'",
        schema.schema_id(),
        schema.as_struct().fields().len()
    );
    let mut visitor = ToAvroVisitor::new(record_name);
    let avro = match visit_schema(schema, &mut visitor) {
        Ok(avro) => avro,
        Err(err) => return Err(visitor.failure.take().unwrap_or(Error::Iceberg(err))),
    };
    avro.check_names()?;
    Ok(avro)
}

struct ToAvroVisitor {
    depth: usize,
    /// IDs of the fields, elements, keys and values enclosing the node
    /// being visited, innermost last.
    field_ids: Vec<i32>,
    schema_name: String,
    /// The typed error behind the last `iceberg::Error` handed to the walk.
    failure: Option<Error>,
}

impl ToAvroVisitor {
    fn new(schema_name: String) -> Self {
        Self {
            depth: 0,
            field_ids: Vec::new(),
            schema_name,
            failure: None,
        }
    }

    /// Keeps `err` for `iceberg_to_avro` and returns the error that stops
    /// the walk.
    fn fail(&mut self, err: Error) -> iceberg::Error {
        let stop = iceberg::Error::new(ErrorKind::DataInvalid, err.to_string());
        self.failure = Some(err);
        stop
    }

    fn enter(&mut self, field: &NestedFieldRef) -> iceberg::Result<()> {
        self.depth += 1;
        self.field_ids.push(field.id);
        Ok(())
    }

    fn leave(&mut self, field: &NestedFieldRef) -> iceberg::Result<()> {
        match self.depth.checked_sub(1) {
            Some(depth) => self.depth = depth,
            None => {
                return Err(self.fail(Error::Internal(format!(
                    "unbalanced traversal leaving field {}",
                    field.id
                ))));
            }
        }
        self.field_ids.pop();
        Ok(())
    }

    fn record_name(&self) -> Result<String> {
        if self.depth == 0 {
            return Ok(self.schema_name.clone());
        }
        self.field_ids
            .last()
            .map(|id| format!("r{id}"))
            .ok_or_else(|| {
                Error::Internal(format!(
                    "struct at depth {} has no enclosing field id",
                    self.depth
                ))
            })
    }
}

impl SchemaVisitor for ToAvroVisitor {
    type T = AvroSchema;

    fn before_struct_field(&mut self, field: &NestedFieldRef) -> iceberg::Result<()> {
        self.enter(field)
    }

    fn after_struct_field(&mut self, field: &NestedFieldRef) -> iceberg::Result<()> {
        self.leave(field)
    }

    fn before_list_element(&mut self, field: &NestedFieldRef) -> iceberg::Result<()> {
        self.enter(field)
    }

    fn after_list_element(&mut self, field: &NestedFieldRef) -> iceberg::Result<()> {
        self.leave(field)
    }

    fn before_map_key(&mut self, field: &NestedFieldRef) -> iceberg::Result<()> {
        self.enter(field)
    }

    fn after_map_key(&mut self, field: &NestedFieldRef) -> iceberg::Result<()> {
        self.leave(field)
    }

    fn before_map_value(&mut self, field: &NestedFieldRef) -> iceberg::Result<()> {
        self.enter(field)
    }

    fn after_map_value(&mut self, field: &NestedFieldRef) -> iceberg::Result<()> {
        self.leave(field)
    }

    fn schema(&mut self, _schema: &Schema, value: AvroSchema) -> iceberg::Result<AvroSchema> {
        Ok(value)
    }

    fn field(&mut self, field: &NestedFieldRef, value: AvroSchema) -> iceberg::Result<AvroSchema> {
        if field.required {
            return Ok(value);
        }
        Ok(make_optional(value, field.write_default.is_some()))
    }

    fn r#struct(
        &mut self,
        st: &StructType,
        results: Vec<AvroSchema>,
    ) -> iceberg::Result<AvroSchema> {
        if results.len() != st.fields().len() {
            return Err(self.fail(Error::Internal(format!(
                "struct with {} field(s) produced {} result(s)",
                st.fields().len(),
                results.len()
            ))));
        }
        let name = self.record_name().map_err(|err| self.fail(err))?;
        trace!("Naming record '{name}' at depth {}", self.depth);

        let fields = st
            .fields()
            .iter()
            .zip(results)
            .map(|(field, schema)| record_field(field, schema))
            .collect::<Result<Vec<_>>>()
            .map_err(|err| self.fail(err))?;
        Ok(AvroSchema::record(name, fields))
    }

    fn list(&mut self, list: &ListType, element: AvroSchema) -> iceberg::Result<AvroSchema> {
        let element_field = &list.element_field;
        let element = if element_field.required {
            element
        } else {
            make_optional(element, false)
        };
        Ok(AvroSchema::array(element).with_prop(ELEMENT_ID_PROP, element_field.id))
    }

    fn map(
        &mut self,
        map: &MapType,
        key: AvroSchema,
        value: AvroSchema,
    ) -> iceberg::Result<AvroSchema> {
        let key_id = map.key_field.id;
        let value_id = map.value_field.id;
        let value = if map.value_field.required {
            value
        } else {
            make_optional(value, false)
        };
        if is_plain_string(&key) {
            return Ok(AvroSchema::map(value)
                .with_prop(KEY_ID_PROP, key_id)
                .with_prop(VALUE_ID_PROP, value_id));
        }
        let entry = AvroSchema::record(
            format!("k{key_id}_v{value_id}"),
            vec![
                id_field(MAP_KEY_NAME, key, key_id),
                id_field(MAP_VALUE_NAME, value, value_id),
            ],
        );
        Ok(AvroSchema::array(entry).with_prop(LOGICAL_TYPE_PROP, LOGICAL_MAP))
    }

    fn primitive(&mut self, p: &PrimitiveType) -> iceberg::Result<AvroSchema> {
        Ok(iceberg_primitive_to_avro(p))
    }
}

/// Wraps `schema` in a nullable union. Avro requires a field default to
/// match the first branch, so `null` goes last when a non-null default is set.
fn make_optional(schema: AvroSchema, default_first: bool) -> AvroSchema {
    if default_first {
        AvroSchema::Union(vec![schema, AvroSchema::null()])
    } else {
        AvroSchema::Union(vec![AvroSchema::null(), schema])
    }
}

fn is_plain_string(schema: &AvroSchema) -> bool {
    matches!(
        schema,
        AvroSchema::Primitive(PrimitiveSchema {
            kind: PrimitiveKind::String,
            logical: None,
            ..
        })
    )
}

fn record_field(field: &NestedField, schema: AvroSchema) -> Result<RecordField> {
    let sanitized = sanitize_name(&field.name)
        .map_err(|err| Error::Internal(format!("field {}: {err}", field.id)))?;

    let mut props = Properties::new();
    props.insert(FIELD_ID_PROP.into(), Value::from(field.id));
    if sanitized != field.name {
        props.insert(
            ICEBERG_FIELD_NAME_PROP.into(),
            Value::from(field.name.as_str()),
        );
    }

    let default = match &field.write_default {
        Some(default) => Some(default.clone().try_into_json(&field.field_type).map_err(
            |err| Error::InvalidDefault {
                field: field.name.clone(),
                reason: err.to_string(),
            },
        )?),
        None if !field.required => Some(Value::Null),
        None => None,
    };

    Ok(RecordField {
        name: sanitized,
        schema,
        doc: field.doc.clone(),
        default,
        props,
    })
}

fn id_field(name: &str, schema: AvroSchema, id: i32) -> RecordField {
    let mut field = RecordField::new(name, schema);
    field.props.insert(FIELD_ID_PROP.into(), Value::from(id));
    field
}
