mod common;

use iceberg::spec::{NestedField, PrimitiveType, Type};
use iceberg_avro::{
    AvroSchema, Error, avro_to_iceberg, iceberg_to_avro, load_schema, save_schema,
};
use serde_json::json;

use common::{
    TestWorkspace, init_logging, list_of, load_avro, load_iceberg, map_of, primitive, schema,
    struct_of,
};

fn int() -> Type {
    primitive(PrimitiveType::Int)
}

#[test]
fn manifest_file_converts_to_the_expected_record() {
    init_logging();
    let avro = iceberg_to_avro("manifest_file", &load_iceberg("manifest_file.json"))
        .expect("convert manifest");
    assert_eq!(avro.to_json(), load_avro("manifest_file.avsc").to_json());
}

#[test]
fn assigned_ids_are_written_back() {
    init_logging();
    let schema = avro_to_iceberg(&load_avro("assign_ids.avsc")).expect("convert to Iceberg");
    let avro = iceberg_to_avro("avro_schema", &schema).expect("convert to Avro");
    assert_eq!(avro.to_json(), load_avro("assign_ids_expected.avsc").to_json());
}

#[test]
fn temporal_types_carry_utc_adjustment() {
    let schema = schema(vec![
        NestedField::required(1, "local", primitive(PrimitiveType::Timestamp)),
        NestedField::required(2, "utc", primitive(PrimitiveType::Timestamptz)),
        NestedField::required(3, "day", primitive(PrimitiveType::Date)),
        NestedField::required(4, "at", primitive(PrimitiveType::Time)),
        NestedField::required(5, "precise", primitive(PrimitiveType::TimestampNs)),
    ]);
    let json = iceberg_to_avro("events", &schema).expect("convert").to_json();
    assert_eq!(
        json["fields"][0]["type"],
        json!({"type": "long", "logicalType": "timestamp-millis", "adjust-to-utc": false})
    );
    assert_eq!(
        json["fields"][1]["type"],
        json!({"type": "long", "logicalType": "timestamp-millis", "adjust-to-utc": true})
    );
    assert_eq!(
        json["fields"][2]["type"],
        json!({"type": "int", "logicalType": "date"})
    );
    assert_eq!(
        json["fields"][3]["type"],
        json!({"type": "long", "logicalType": "time-micros"})
    );
    assert_eq!(
        json["fields"][4]["type"],
        json!({"type": "long", "logicalType": "timestamp-nanos", "adjust-to-utc": false})
    );
}

#[test]
fn uuid_decimal_and_fixed_use_named_or_logical_types() {
    let schema = schema(vec![
        NestedField::required(1, "token", primitive(PrimitiveType::Uuid)),
        NestedField::required(
            2,
            "amount",
            primitive(PrimitiveType::Decimal {
                precision: 38,
                scale: 10,
            }),
        ),
        NestedField::required(3, "hash", primitive(PrimitiveType::Fixed(32))),
        NestedField::required(4, "other_token", primitive(PrimitiveType::Uuid)),
    ]);
    let json = iceberg_to_avro("blobs", &schema).expect("convert").to_json();
    assert_eq!(
        json["fields"][0]["type"],
        json!({"type": "fixed", "name": "uuid_fixed", "size": 16, "logicalType": "uuid"})
    );
    assert_eq!(
        json["fields"][1]["type"],
        json!({"type": "bytes", "logicalType": "decimal", "precision": 38, "scale": 10})
    );
    assert_eq!(
        json["fields"][2]["type"],
        json!({"type": "fixed", "name": "fixed_32", "size": 32})
    );
    // Named types are written once and referenced afterwards.
    assert_eq!(json["fields"][3]["type"], json!("uuid_fixed"));
}

#[test]
fn non_string_map_keys_round_trip_through_key_value_records() {
    let schema = schema(vec![NestedField::optional(
        10,
        "by_point",
        map_of(
            11,
            struct_of(vec![
                NestedField::required(13, "x", int()),
                NestedField::required(14, "y", int()),
            ]),
            12,
            list_of(15, primitive(PrimitiveType::String), false),
            true,
        ),
    )]);
    let avro = iceberg_to_avro("grid", &schema).expect("convert to Avro");
    let json = avro.to_json();
    let entries = &json["fields"][0]["type"][1];
    assert_eq!(entries["logicalType"], "map");
    assert_eq!(entries["items"]["name"], "k11_v12");
    assert_eq!(entries["items"]["fields"][0]["type"]["name"], "r11");
    assert_eq!(entries["items"]["fields"][1]["type"]["element-id"], 15);

    let back = avro_to_iceberg(&avro).expect("convert back");
    assert_eq!(back.as_struct(), schema.as_struct());
}

#[test]
fn sanitized_names_are_restored_on_read() {
    let schema = schema(vec![
        NestedField::required(1, "order-id", primitive(PrimitiveType::Long)),
        NestedField::optional(2, "9lives", primitive(PrimitiveType::String)),
        NestedField::optional(3, "price $", primitive(PrimitiveType::Double))
            .with_doc("in dollars"),
    ]);
    let avro = iceberg_to_avro("orders", &schema).expect("convert to Avro");
    let json = avro.to_json();
    assert_eq!(json["fields"][0]["name"], "order_x2Did");
    assert_eq!(json["fields"][1]["name"], "_9lives");
    assert_eq!(json["fields"][2]["name"], "price_x20_x24");
    assert_eq!(json["fields"][2]["iceberg-field-name"], "price $");

    let back = avro_to_iceberg(&AvroSchema::parse_str(&avro.to_string()).expect("reparse"))
        .expect("convert back");
    assert_eq!(back.as_struct(), schema.as_struct());
}

#[test]
fn empty_names_are_internal_errors() {
    let schema = schema(vec![NestedField::required(1, "", int())]);
    let err = iceberg_to_avro("broken", &schema).expect_err("empty name");
    assert!(matches!(err, Error::Internal(_)), "{err}");
}

#[test]
fn table_names_are_sanitized() {
    let schema = schema(vec![NestedField::required(1, "id", int())]);
    let avro = iceberg_to_avro("my-table", &schema).expect("convert to Avro");
    assert_eq!(avro.to_json()["name"], "my_x2Dtable");
    assert!(AvroSchema::parse_str(&avro.to_string()).is_ok());
}

#[test]
fn table_name_matching_a_nested_record_name_is_rejected() {
    let schema = schema(vec![NestedField::required(
        1,
        "inner",
        struct_of(vec![NestedField::required(2, "x", int())]),
    )]);
    let err = iceberg_to_avro("r1", &schema).expect_err("two records named r1");
    assert!(
        matches!(err, Error::ConflictingTypeName(ref name) if name == "r1"),
        "{err}"
    );

    // Any other table name leaves the nested record free to use r1.
    let json = iceberg_to_avro("outer", &schema).expect("convert").to_json();
    assert_eq!(json["fields"][0]["type"]["name"], "r1");
}

#[test]
fn saved_schemas_load_back_unchanged() {
    let workspace = TestWorkspace::new();
    let schema = load_iceberg("manifest_file.json");
    let path = workspace.path().join("manifest.json");
    save_schema(&schema, &path).expect("save schema");
    assert_eq!(load_schema(&path).expect("load schema"), schema);
}

#[test]
fn loading_a_malformed_file_reports_the_path() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("broken.avsc", r#"{"type": "record""#);
    let err = AvroSchema::load(&path).expect_err("truncated JSON");
    assert!(format!("{err:#}").contains("broken.avsc"), "{err:#}");
}

#[test]
fn loading_a_missing_iceberg_schema_reports_the_path() {
    let workspace = TestWorkspace::new();
    let err = load_schema(&workspace.path().join("absent.json")).expect_err("missing file");
    assert!(format!("{err:#}").contains("absent.json"), "{err:#}");
}
