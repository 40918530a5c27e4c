#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use iceberg::spec::{
    ListType, MapType, NestedField, PrimitiveType, Schema, StructType, Type,
};
use iceberg_avro::{AvroSchema, load_schema};
use tempfile::{TempDir, tempdir};

static LOGGER: OnceLock<()> = OnceLock::new();

/// Routes crate logging to the test harness; `RUST_LOG` picks the level.
pub fn init_logging() {
    LOGGER.get_or_init(|| {
        let _ = env_logger::Builder::from_env(env_logger::Env::default())
            .is_test(true)
            .try_init();
    });
}

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

pub fn load_avro(name: &str) -> AvroSchema {
    AvroSchema::load(&fixture_path(name)).expect("load Avro fixture")
}

pub fn load_iceberg(name: &str) -> Schema {
    load_schema(&fixture_path(name)).expect("load Iceberg fixture")
}

pub fn parse_avro(json: &str) -> AvroSchema {
    AvroSchema::parse_str(json).expect("valid Avro schema")
}

pub fn schema(fields: Vec<NestedField>) -> Schema {
    Schema::builder()
        .with_fields(fields.into_iter().map(Arc::new))
        .build()
        .expect("valid Iceberg schema")
}

pub fn primitive(p: PrimitiveType) -> Type {
    Type::Primitive(p)
}

pub fn struct_of(fields: Vec<NestedField>) -> Type {
    Type::Struct(StructType::new(fields.into_iter().map(Arc::new).collect()))
}

pub fn list_of(element_id: i32, element: Type, required: bool) -> Type {
    Type::List(ListType::new(Arc::new(NestedField::list_element(
        element_id, element, required,
    ))))
}

pub fn map_of(key_id: i32, key: Type, value_id: i32, value: Type, required: bool) -> Type {
    Type::Map(MapType::new(
        Arc::new(NestedField::map_key_element(key_id, key)),
        Arc::new(NestedField::map_value_element(value_id, value, required)),
    ))
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
