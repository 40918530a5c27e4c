//! Iceberg schema files.
//!
//! Schemas use the Iceberg table-metadata JSON form
//! (`{"type": "struct", "schema-id": 0, "fields": [...]}`).

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use iceberg::spec::Schema;

/// Schema ID given to every schema produced from Avro.
pub const DEFAULT_SCHEMA_ID: i32 = 0;

pub fn load_schema(path: &Path) -> Result<Schema> {
    let file = File::open(path).with_context(|| format!("Opening schema file {path:?}"))?;
    let schema = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Parsing Iceberg schema {path:?}"))?;
    Ok(schema)
}

pub fn save_schema(schema: &Schema, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Creating schema file {path:?}"))?;
    serde_json::to_writer_pretty(BufWriter::new(file), schema)
        .with_context(|| format!("Writing Iceberg schema {path:?}"))
}
