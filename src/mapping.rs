//! Primitive type tables shared by both conversion directions.
//!
//! | Iceberg          | Avro                                           |
//! |------------------|------------------------------------------------|
//! | boolean          | boolean                                        |
//! | int              | int                                            |
//! | long             | long                                           |
//! | float            | float                                          |
//! | double           | double                                         |
//! | string           | string (also enum on read)                     |
//! | binary           | bytes                                          |
//! | fixed[n]         | fixed(n)                                       |
//! | uuid             | fixed(16) + uuid (also string + uuid on read)  |
//! | decimal(p, s)    | bytes + decimal (also fixed + decimal on read) |
//! | date             | int + date                                     |
//! | time             | long + time-micros                             |
//! | timestamp        | long + timestamp-millis, adjust-to-utc false   |
//! | timestamptz      | long + timestamp-millis, adjust-to-utc true    |
//! | timestamp_ns     | long + timestamp-nanos, adjust-to-utc false    |
//! | timestamptz_ns   | long + timestamp-nanos, adjust-to-utc true     |
//!
//! On read, `timestamp-micros` is accepted like `timestamp-millis` and the
//! `local-timestamp-*` types always map to a timestamp without zone.

use iceberg::spec::PrimitiveType;
use serde_json::Value;

use crate::{
    avro::{
        ADJUST_TO_UTC_PROP, AvroSchema, FixedSchema, LogicalType, Name, PrimitiveKind,
        PrimitiveSchema, Properties,
    },
    error::{Error, Result},
};

pub const UUID_FIXED_NAME: &str = "uuid_fixed";
const UUID_SIZE: u64 = 16;

/// Avro name given to `fixed[length]`.
pub fn fixed_name(length: u64) -> String {
    format!("fixed_{length}")
}

pub fn avro_primitive_to_iceberg(schema: &PrimitiveSchema) -> Result<PrimitiveType> {
    use LogicalType as L;
    use PrimitiveKind as K;

    match (schema.kind, schema.logical) {
        (K::Boolean, None) => Ok(PrimitiveType::Boolean),
        (K::Int, None) => Ok(PrimitiveType::Int),
        (K::Long, None) => Ok(PrimitiveType::Long),
        (K::Float, None) => Ok(PrimitiveType::Float),
        (K::Double, None) => Ok(PrimitiveType::Double),
        (K::Bytes, None) => Ok(PrimitiveType::Binary),
        (K::String, None) => Ok(PrimitiveType::String),
        (K::Int, Some(L::Date)) => Ok(PrimitiveType::Date),
        (K::Long, Some(L::TimeMicros)) => Ok(PrimitiveType::Time),
        (K::Long, Some(L::TimestampMillis | L::TimestampMicros)) => {
            if adjusts_to_utc(schema) {
                Ok(PrimitiveType::Timestamptz)
            } else {
                Ok(PrimitiveType::Timestamp)
            }
        }
        (K::Long, Some(L::TimestampNanos)) => {
            if adjusts_to_utc(schema) {
                Ok(PrimitiveType::TimestamptzNs)
            } else {
                Ok(PrimitiveType::TimestampNs)
            }
        }
        (K::Long, Some(L::LocalTimestampMillis | L::LocalTimestampMicros)) => {
            Ok(PrimitiveType::Timestamp)
        }
        (K::Long, Some(L::LocalTimestampNanos)) => Ok(PrimitiveType::TimestampNs),
        (K::Bytes, Some(L::Decimal { precision, scale })) => {
            Ok(PrimitiveType::Decimal { precision, scale })
        }
        (K::String, Some(L::Uuid)) => Ok(PrimitiveType::Uuid),
        (K::Null, None) => Err(Error::UnsupportedType(K::Null.to_string())),
        (kind, Some(logical)) => Err(Error::UnsupportedLogicalType {
            physical: kind.to_string(),
            logical: logical.to_string(),
        }),
    }
}

pub fn avro_fixed_to_iceberg(schema: &FixedSchema) -> Result<PrimitiveType> {
    match schema.logical {
        None => Ok(PrimitiveType::Fixed(schema.size)),
        Some(LogicalType::Decimal { precision, scale }) => {
            Ok(PrimitiveType::Decimal { precision, scale })
        }
        Some(LogicalType::Uuid) if schema.size == UUID_SIZE => Ok(PrimitiveType::Uuid),
        Some(logical) => Err(Error::UnsupportedLogicalType {
            physical: format!("fixed({})", schema.size),
            logical: logical.to_string(),
        }),
    }
}

pub fn iceberg_primitive_to_avro(primitive: &PrimitiveType) -> AvroSchema {
    match primitive {
        PrimitiveType::Boolean => AvroSchema::primitive(PrimitiveKind::Boolean),
        PrimitiveType::Int => AvroSchema::primitive(PrimitiveKind::Int),
        PrimitiveType::Long => AvroSchema::primitive(PrimitiveKind::Long),
        PrimitiveType::Float => AvroSchema::primitive(PrimitiveKind::Float),
        PrimitiveType::Double => AvroSchema::primitive(PrimitiveKind::Double),
        PrimitiveType::String => AvroSchema::primitive(PrimitiveKind::String),
        PrimitiveType::Binary => AvroSchema::primitive(PrimitiveKind::Bytes),
        PrimitiveType::Fixed(length) => AvroSchema::fixed(fixed_name(*length), *length),
        PrimitiveType::Uuid => AvroSchema::Fixed(FixedSchema {
            name: Name::new(UUID_FIXED_NAME),
            size: UUID_SIZE,
            logical: Some(LogicalType::Uuid),
            doc: None,
            props: Properties::new(),
        }),
        PrimitiveType::Decimal { precision, scale } => logical(
            PrimitiveKind::Bytes,
            LogicalType::Decimal {
                precision: *precision,
                scale: *scale,
            },
        ),
        PrimitiveType::Date => logical(PrimitiveKind::Int, LogicalType::Date),
        PrimitiveType::Time => logical(PrimitiveKind::Long, LogicalType::TimeMicros),
        PrimitiveType::Timestamp => timestamp(LogicalType::TimestampMillis, false),
        PrimitiveType::Timestamptz => timestamp(LogicalType::TimestampMillis, true),
        PrimitiveType::TimestampNs => timestamp(LogicalType::TimestampNanos, false),
        PrimitiveType::TimestamptzNs => timestamp(LogicalType::TimestampNanos, true),
    }
}

fn logical(kind: PrimitiveKind, logical: LogicalType) -> AvroSchema {
    AvroSchema::Primitive(PrimitiveSchema::new(kind).with_logical(logical))
}

fn timestamp(unit: LogicalType, adjust_to_utc: bool) -> AvroSchema {
    logical(PrimitiveKind::Long, unit).with_prop(ADJUST_TO_UTC_PROP, adjust_to_utc)
}

fn adjusts_to_utc(schema: &PrimitiveSchema) -> bool {
    match schema.props.get(ADJUST_TO_UTC_PROP) {
        Some(Value::Bool(adjust)) => *adjust,
        Some(Value::String(adjust)) => adjust.eq_ignore_ascii_case("true"),
        _ => false,
    }
}
