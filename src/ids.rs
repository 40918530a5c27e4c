//! Field ID resolution for Avro to Iceberg conversion.

use std::collections::HashSet;

use log::trace;
use serde_json::Value;

use crate::{
    avro::Properties,
    error::{Error, Result},
};

/// Reads explicit ID properties and hands out fresh IDs where they are
/// missing.
///
/// Fresh IDs start at 0 and follow the order of `resolve` calls, so callers
/// must resolve IDs in a fixed traversal order for allocation to be
/// repeatable. Every ID handed out, explicit or fresh, must be unique.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: i32,
    used: HashSet<i32>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// ID stored under `property`, or the next fresh ID when absent.
    pub fn resolve(&mut self, props: &Properties, property: &str) -> Result<i32> {
        let id = match props.get(property) {
            Some(value) => parse_id(property, value)?,
            None => self.allocate(property),
        };
        if !self.used.insert(id) {
            return Err(Error::DuplicateFieldId(id));
        }
        Ok(id)
    }

    fn allocate(&mut self, property: &str) -> i32 {
        let id = self.next;
        self.next += 1;
        trace!("Allocated {property} {id}");
        id
    }
}

/// Accepts integers and decimal strings that fit in an `i32`.
pub fn parse_id(property: &str, value: &Value) -> Result<i32> {
    let parsed = match value {
        Value::Number(number) => number.as_i64().and_then(|id| i32::try_from(id).ok()),
        Value::String(text) => text.trim().parse::<i32>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| Error::InvalidFieldId {
        property: property.to_string(),
        value: value.to_string(),
    })
}
