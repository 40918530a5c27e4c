//! ID-preserving conversion between Apache Avro schemas and Apache Iceberg
//! schemas.
//!
//! [`avro_to_iceberg`] reads an Avro record schema, honoring the `field-id`,
//! `element-id`, `key-id` and `value-id` properties it carries and
//! allocating IDs where they are missing. [`iceberg_to_avro`] writes those
//! properties back, so a schema survives the round trip with its IDs intact.
//!
//! The Iceberg side is the `iceberg` crate's [`Schema`].

pub mod avro;
pub mod catalog;
pub mod error;
pub mod ids;
pub mod mapping;
pub mod sanitize;
pub mod to_avro;
pub mod to_iceberg;
pub mod union;

pub use avro::AvroSchema;
pub use error::{Error, Result};
pub use sanitize::sanitize_name;
pub use to_avro::iceberg_to_avro;
pub use to_iceberg::avro_to_iceberg;
pub use catalog::{load_schema, save_schema};
pub use iceberg::spec::Schema;
