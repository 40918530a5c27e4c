//! Optionality through nullable unions.

use crate::{
    avro::AvroSchema,
    error::{Error, Result},
};

/// Splits a schema into the type it carries and whether a value is required.
///
/// Non-union schemas and single-member unions are required. A two-member
/// union with exactly one `null` member is optional. Every other union shape
/// is rejected.
pub fn resolve_union(schema: &AvroSchema) -> Result<(&AvroSchema, bool)> {
    let AvroSchema::Union(members) = schema else {
        return Ok((schema, true));
    };
    match members.as_slice() {
        [] => Err(Error::EmptyUnion),
        [single] => Ok((single, true)),
        [first, second] if first.is_null() && !second.is_null() => Ok((second, false)),
        [first, second] if second.is_null() && !first.is_null() => Ok((first, false)),
        _ => Err(Error::UnsupportedUnion(schema.to_string())),
    }
}
