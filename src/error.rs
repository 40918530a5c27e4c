//! Error type shared by both conversion directions and the schema models.

use thiserror::Error;

/// Everything that can go wrong while parsing or converting a schema.
///
/// Conversions stop at the first error; no partially converted schema is
/// ever returned alongside one of these.
#[derive(Error, Debug)]
pub enum Error {
    /// The top-level Avro schema is not a record.
    #[error("schema must be a record, found {found}")]
    NotARecord { found: String },

    /// A union without members.
    #[error("empty union")]
    EmptyUnion,

    /// A union that is not `[null, T]`, `[T, null]` or a single type.
    #[error("unsupported union shape {0}: only nullable unions of two types are supported")]
    UnsupportedUnion(String),

    /// A known logical type annotating a physical type it cannot refine.
    #[error("unsupported logical type {logical} on {physical}")]
    UnsupportedLogicalType { physical: String, logical: String },

    /// An Avro type with no Iceberg counterpart, such as a bare `null`.
    #[error("unsupported Avro type {0}")]
    UnsupportedType(String),

    /// An array tagged `logicalType: map` whose items are not a 2-field record.
    #[error("logical map must be an array of 2-field key/value records, found items {0}")]
    InvalidLogicalMap(String),

    /// An identifier property that is present but not a 32-bit integer.
    #[error("invalid {property} property: {value}")]
    InvalidFieldId { property: String, value: String },

    /// Two fields of one converted schema share an ID.
    #[error("duplicate field id {0}")]
    DuplicateFieldId(i32),

    /// Names handed to the sanitizer must not be empty.
    #[error("name cannot be empty")]
    EmptyName,

    /// Malformed Avro schema JSON.
    #[error("invalid Avro schema: {0}")]
    InvalidAvro(String),

    /// Two different Avro named types with the same full name.
    #[error("Avro type name '{0}' is defined twice with different definitions")]
    ConflictingTypeName(String),

    /// A field default that does not fit the field's type.
    #[error("invalid default for field '{field}': {reason}")]
    InvalidDefault { field: String, reason: String },

    #[error(transparent)]
    Iceberg(#[from] iceberg::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A broken invariant while writing Avro, such as an unnamed field or a
    /// nested record with no enclosing field ID.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
