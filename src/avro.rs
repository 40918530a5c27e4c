//! Avro schema model and its JSON form.
//!
//! This is the subset of the Avro specification needed to carry Iceberg
//! schemas: primitive, fixed, enum, array, map, record and union nodes, the
//! logical types Iceberg uses, and an open property bag on every node except
//! unions.
//!
//! ## Responsibilities
//!
//! - Parsing the standard JSON representation, including references to named
//!   types defined earlier in the same document
//! - Printing a deterministic JSON form (sorted object keys, named types
//!   printed once and referenced by full name afterwards)
//! - The property keys Iceberg attaches to Avro nodes

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
    fs,
    path::Path,
    str::FromStr,
};

use anyhow::Context;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub const ADJUST_TO_UTC_PROP: &str = "adjust-to-utc";
pub const ELEMENT_ID_PROP: &str = "element-id";
pub const FIELD_ID_PROP: &str = "field-id";
pub const ICEBERG_FIELD_NAME_PROP: &str = "iceberg-field-name";
pub const KEY_ID_PROP: &str = "key-id";
pub const LOGICAL_TYPE_PROP: &str = "logicalType";
pub const VALUE_ID_PROP: &str = "value-id";

/// `logicalType` value marking an array of key/value records as a map.
pub const LOGICAL_MAP: &str = "map";

/// Custom attributes of a schema node or field, keyed by attribute name.
pub type Properties = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
}

impl PrimitiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::Null => "null",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Bytes => "bytes",
            PrimitiveKind::String => "string",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "null" => Some(PrimitiveKind::Null),
            "boolean" => Some(PrimitiveKind::Boolean),
            "int" => Some(PrimitiveKind::Int),
            "long" => Some(PrimitiveKind::Long),
            "float" => Some(PrimitiveKind::Float),
            "double" => Some(PrimitiveKind::Double),
            "bytes" => Some(PrimitiveKind::Bytes),
            "string" => Some(PrimitiveKind::String),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical types understood by the converters.
///
/// Other `logicalType` values are not errors: they stay in the node's
/// property bag untouched, as Avro readers are expected to ignore them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalType {
    Date,
    TimeMillis,
    TimeMicros,
    TimestampMillis,
    TimestampMicros,
    TimestampNanos,
    LocalTimestampMillis,
    LocalTimestampMicros,
    LocalTimestampNanos,
    Decimal { precision: u32, scale: u32 },
    Uuid,
}

impl LogicalType {
    pub fn name(&self) -> &'static str {
        match self {
            LogicalType::Date => "date",
            LogicalType::TimeMillis => "time-millis",
            LogicalType::TimeMicros => "time-micros",
            LogicalType::TimestampMillis => "timestamp-millis",
            LogicalType::TimestampMicros => "timestamp-micros",
            LogicalType::TimestampNanos => "timestamp-nanos",
            LogicalType::LocalTimestampMillis => "local-timestamp-millis",
            LogicalType::LocalTimestampMicros => "local-timestamp-micros",
            LogicalType::LocalTimestampNanos => "local-timestamp-nanos",
            LogicalType::Decimal { .. } => "decimal",
            LogicalType::Uuid => "uuid",
        }
    }

    fn parse(object: &Map<String, Value>) -> Result<Option<Self>> {
        let Some(name) = object.get(LOGICAL_TYPE_PROP).and_then(Value::as_str) else {
            return Ok(None);
        };
        let logical = match name {
            "date" => LogicalType::Date,
            "time-millis" => LogicalType::TimeMillis,
            "time-micros" => LogicalType::TimeMicros,
            "timestamp-millis" => LogicalType::TimestampMillis,
            "timestamp-micros" => LogicalType::TimestampMicros,
            "timestamp-nanos" => LogicalType::TimestampNanos,
            "local-timestamp-millis" => LogicalType::LocalTimestampMillis,
            "local-timestamp-micros" => LogicalType::LocalTimestampMicros,
            "local-timestamp-nanos" => LogicalType::LocalTimestampNanos,
            "uuid" => LogicalType::Uuid,
            "decimal" => {
                let precision = object
                    .get("precision")
                    .map(|value| json_u32(value, "decimal precision"))
                    .transpose()?
                    .ok_or_else(|| Error::InvalidAvro("decimal requires a precision".into()))?;
                let scale = object
                    .get("scale")
                    .map(|value| json_u32(value, "decimal scale"))
                    .transpose()?
                    .unwrap_or(0);
                LogicalType::Decimal { precision, scale }
            }
            _ => return Ok(None),
        };
        Ok(Some(logical))
    }

    fn write(&self, object: &mut Map<String, Value>) {
        object.insert(LOGICAL_TYPE_PROP.into(), Value::from(self.name()));
        if let LogicalType::Decimal { precision, scale } = self {
            object.insert("precision".into(), Value::from(*precision));
            object.insert("scale".into(), Value::from(*scale));
        }
    }

    /// Attribute keys consumed by this logical type when parsing.
    fn reserved_keys(&self) -> &'static [&'static str] {
        match self {
            LogicalType::Decimal { .. } => &[LOGICAL_TYPE_PROP, "precision", "scale"],
            _ => &[LOGICAL_TYPE_PROP],
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalType::Decimal { precision, scale } => {
                write!(f, "decimal({precision},{scale})")
            }
            other => f.write_str(other.name()),
        }
    }
}

/// Name of a record, enum or fixed type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub name: String,
    /// Namespace written explicitly on the type; inherited namespaces are
    /// resolved while parsing and printing.
    pub namespace: Option<String>,
}

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }

    fn effective_namespace(&self, enclosing: Option<&str>) -> Option<String> {
        if let Some((namespace, _)) = self.name.rsplit_once('.') {
            return Some(namespace.to_string());
        }
        self.namespace
            .as_deref()
            .or(enclosing)
            .filter(|namespace| !namespace.is_empty())
            .map(str::to_string)
    }

    /// Full name of the type when declared inside `enclosing`.
    pub fn fullname(&self, enclosing: Option<&str>) -> String {
        if self.name.contains('.') {
            return self.name.clone();
        }
        match self.effective_namespace(enclosing) {
            Some(namespace) => format!("{namespace}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveSchema {
    pub kind: PrimitiveKind,
    pub logical: Option<LogicalType>,
    pub props: Properties,
}

impl PrimitiveSchema {
    pub fn new(kind: PrimitiveKind) -> Self {
        Self {
            kind,
            logical: None,
            props: Properties::new(),
        }
    }

    pub fn with_logical(mut self, logical: LogicalType) -> Self {
        self.logical = Some(logical);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixedSchema {
    pub name: Name,
    pub size: u64,
    pub logical: Option<LogicalType>,
    pub doc: Option<String>,
    pub props: Properties,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    pub name: Name,
    pub symbols: Vec<String>,
    pub doc: Option<String>,
    pub default: Option<String>,
    pub props: Properties,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub items: Box<AvroSchema>,
    pub props: Properties,
}

impl ArraySchema {
    /// True for arrays standing in for a map with non-string keys.
    pub fn is_logical_map(&self) -> bool {
        self.props.get(LOGICAL_TYPE_PROP).and_then(Value::as_str) == Some(LOGICAL_MAP)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapSchema {
    pub values: Box<AvroSchema>,
    pub props: Properties,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub name: Name,
    pub doc: Option<String>,
    pub fields: Vec<RecordField>,
    pub props: Properties,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub name: String,
    pub schema: AvroSchema,
    pub doc: Option<String>,
    /// `Some(Value::Null)` is an explicit `"default": null`.
    pub default: Option<Value>,
    pub props: Properties,
}

impl RecordField {
    pub fn new(name: impl Into<String>, schema: AvroSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            doc: None,
            default: None,
            props: Properties::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AvroSchema {
    Primitive(PrimitiveSchema),
    Fixed(FixedSchema),
    Enum(EnumSchema),
    Array(ArraySchema),
    Map(MapSchema),
    Record(RecordSchema),
    Union(Vec<AvroSchema>),
}

impl AvroSchema {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        AvroSchema::Primitive(PrimitiveSchema::new(kind))
    }

    pub fn null() -> Self {
        Self::primitive(PrimitiveKind::Null)
    }

    pub fn array(items: AvroSchema) -> Self {
        AvroSchema::Array(ArraySchema {
            items: Box::new(items),
            props: Properties::new(),
        })
    }

    pub fn map(values: AvroSchema) -> Self {
        AvroSchema::Map(MapSchema {
            values: Box::new(values),
            props: Properties::new(),
        })
    }

    pub fn record(name: impl Into<String>, fields: Vec<RecordField>) -> Self {
        AvroSchema::Record(RecordSchema {
            name: Name::new(name),
            doc: None,
            fields,
            props: Properties::new(),
        })
    }

    pub fn fixed(name: impl Into<String>, size: u64) -> Self {
        AvroSchema::Fixed(FixedSchema {
            name: Name::new(name),
            size,
            logical: None,
            doc: None,
            props: Properties::new(),
        })
    }

    /// Sets a custom attribute. Unions carry no attributes and are returned
    /// unchanged.
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Some(props) = self.props_mut() {
            props.insert(key.into(), value.into());
        }
        self
    }

    fn props_mut(&mut self) -> Option<&mut Properties> {
        match self {
            AvroSchema::Primitive(p) => Some(&mut p.props),
            AvroSchema::Fixed(f) => Some(&mut f.props),
            AvroSchema::Enum(e) => Some(&mut e.props),
            AvroSchema::Array(a) => Some(&mut a.props),
            AvroSchema::Map(m) => Some(&mut m.props),
            AvroSchema::Record(r) => Some(&mut r.props),
            AvroSchema::Union(_) => None,
        }
    }

    /// Avro type name of this node, e.g. `record` or `long`.
    pub fn type_name(&self) -> &'static str {
        match self {
            AvroSchema::Primitive(p) => p.kind.as_str(),
            AvroSchema::Fixed(_) => "fixed",
            AvroSchema::Enum(_) => "enum",
            AvroSchema::Array(_) => "array",
            AvroSchema::Map(_) => "map",
            AvroSchema::Record(_) => "record",
            AvroSchema::Union(_) => "union",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(
            self,
            AvroSchema::Primitive(PrimitiveSchema {
                kind: PrimitiveKind::Null,
                ..
            })
        )
    }

    pub fn parse_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::parse(&value)
    }

    pub fn parse(value: &Value) -> Result<Self> {
        Parser::default().parse(value, None)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Reading Avro schema {path:?}"))?;
        let schema = Self::parse_str(&contents)
            .with_context(|| format!("Parsing Avro schema {path:?}"))?;
        Ok(schema)
    }

    /// Fails when two different definitions share a full name. The JSON
    /// printer writes later uses of a name as a reference, so a clash would
    /// otherwise drop the second definition from the output.
    pub fn check_names(&self) -> Result<()> {
        let mut defined = HashMap::new();
        self.collect_names(None, &mut defined)
    }

    fn collect_names<'a>(
        &'a self,
        namespace: Option<&str>,
        defined: &mut HashMap<String, &'a AvroSchema>,
    ) -> Result<()> {
        let name = match self {
            AvroSchema::Fixed(f) => &f.name,
            AvroSchema::Enum(e) => &e.name,
            AvroSchema::Record(r) => &r.name,
            AvroSchema::Array(a) => return a.items.collect_names(namespace, defined),
            AvroSchema::Map(m) => return m.values.collect_names(namespace, defined),
            AvroSchema::Union(members) => {
                return members
                    .iter()
                    .try_for_each(|member| member.collect_names(namespace, defined));
            }
            AvroSchema::Primitive(_) => return Ok(()),
        };

        let fullname = name.fullname(namespace);
        if let Some(existing) = defined.get(&fullname) {
            if *existing != self {
                return Err(Error::ConflictingTypeName(fullname));
            }
            return Ok(());
        }
        defined.insert(fullname, self);

        if let AvroSchema::Record(record) = self {
            let inner = record.name.effective_namespace(namespace);
            for field in &record.fields {
                field.schema.collect_names(inner.as_deref(), defined)?;
            }
        }
        Ok(())
    }

    /// JSON form of the schema. Named types appear in full the first time
    /// and as their full name afterwards.
    pub fn to_json(&self) -> Value {
        let mut seen = HashSet::new();
        self.write(None, &mut seen)
    }

    fn write(&self, namespace: Option<&str>, seen: &mut HashSet<String>) -> Value {
        match self {
            AvroSchema::Primitive(p) => {
                if p.logical.is_none() && p.props.is_empty() {
                    return Value::from(p.kind.as_str());
                }
                let mut object = Map::new();
                object.insert("type".into(), Value::from(p.kind.as_str()));
                if let Some(logical) = &p.logical {
                    logical.write(&mut object);
                }
                Value::Object(with_props(object, &p.props))
            }
            AvroSchema::Fixed(f) => {
                let fullname = f.name.fullname(namespace);
                if !seen.insert(fullname.clone()) {
                    return Value::from(fullname);
                }
                let mut object = named_object("fixed", &f.name, f.doc.as_deref());
                object.insert("size".into(), Value::from(f.size));
                if let Some(logical) = &f.logical {
                    logical.write(&mut object);
                }
                Value::Object(with_props(object, &f.props))
            }
            AvroSchema::Enum(e) => {
                let fullname = e.name.fullname(namespace);
                if !seen.insert(fullname.clone()) {
                    return Value::from(fullname);
                }
                let mut object = named_object("enum", &e.name, e.doc.as_deref());
                object.insert("symbols".into(), Value::from(e.symbols.clone()));
                if let Some(default) = &e.default {
                    object.insert("default".into(), Value::from(default.as_str()));
                }
                Value::Object(with_props(object, &e.props))
            }
            AvroSchema::Array(a) => {
                let mut object = Map::new();
                object.insert("type".into(), Value::from("array"));
                object.insert("items".into(), a.items.write(namespace, seen));
                Value::Object(with_props(object, &a.props))
            }
            AvroSchema::Map(m) => {
                let mut object = Map::new();
                object.insert("type".into(), Value::from("map"));
                object.insert("values".into(), m.values.write(namespace, seen));
                Value::Object(with_props(object, &m.props))
            }
            AvroSchema::Record(r) => {
                let fullname = r.name.fullname(namespace);
                if !seen.insert(fullname.clone()) {
                    return Value::from(fullname);
                }
                let inner = r.name.effective_namespace(namespace);
                let fields = r
                    .fields
                    .iter()
                    .map(|field| {
                        let mut object = Map::new();
                        object.insert("name".into(), Value::from(field.name.as_str()));
                        object.insert("type".into(), field.schema.write(inner.as_deref(), seen));
                        if let Some(doc) = &field.doc {
                            object.insert("doc".into(), Value::from(doc.as_str()));
                        }
                        if let Some(default) = &field.default {
                            object.insert("default".into(), default.clone());
                        }
                        Value::Object(with_props(object, &field.props))
                    })
                    .collect::<Vec<_>>();
                let mut object = named_object("record", &r.name, r.doc.as_deref());
                object.insert("fields".into(), Value::Array(fields));
                Value::Object(with_props(object, &r.props))
            }
            AvroSchema::Union(members) => Value::Array(
                members
                    .iter()
                    .map(|member| member.write(namespace, seen))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for AvroSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl FromStr for AvroSchema {
    type Err = Error;

    fn from_str(json: &str) -> Result<Self> {
        Self::parse_str(json)
    }
}

fn named_object(type_name: &str, name: &Name, doc: Option<&str>) -> Map<String, Value> {
    let mut object = Map::new();
    object.insert("type".into(), Value::from(type_name));
    object.insert("name".into(), Value::from(name.name.as_str()));
    if let Some(namespace) = &name.namespace {
        object.insert("namespace".into(), Value::from(namespace.as_str()));
    }
    if let Some(doc) = doc {
        object.insert("doc".into(), Value::from(doc));
    }
    object
}

fn with_props(mut object: Map<String, Value>, props: &Properties) -> Map<String, Value> {
    for (key, value) in props {
        object.entry(key.clone()).or_insert_with(|| value.clone());
    }
    object
}

fn json_u32(value: &Value, what: &str) -> Result<u32> {
    value
        .as_u64()
        .and_then(|number| u32::try_from(number).ok())
        .ok_or_else(|| Error::InvalidAvro(format!("{what} must be an unsigned integer, got {value}")))
}

fn collect_props(object: &Map<String, Value>, reserved: &[&str]) -> Properties {
    object
        .iter()
        .filter(|(key, _)| !reserved.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn optional_str(object: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match object.get(key) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(other) => Err(Error::InvalidAvro(format!("'{key}' must be a string, got {other}"))),
    }
}

fn required_str<'a>(object: &'a Map<String, Value>, key: &str, context: &str) -> Result<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::InvalidAvro(format!("{context} requires a string '{key}'")))
}

/// Recursive-descent parser over the JSON value tree. Holds the named types
/// defined so far so later references can be resolved.
#[derive(Default)]
struct Parser {
    named: HashMap<String, AvroSchema>,
}

impl Parser {
    fn parse(&mut self, value: &Value, namespace: Option<&str>) -> Result<AvroSchema> {
        match value {
            Value::String(name) => self.resolve_name(name, namespace),
            Value::Array(members) => self.parse_union(members, namespace),
            Value::Object(object) => self.parse_object(object, namespace),
            other => Err(Error::InvalidAvro(format!("unexpected schema JSON {other}"))),
        }
    }

    fn resolve_name(&self, name: &str, namespace: Option<&str>) -> Result<AvroSchema> {
        if let Some(kind) = PrimitiveKind::from_name(name) {
            return Ok(AvroSchema::primitive(kind));
        }
        if !name.contains('.')
            && let Some(namespace) = namespace
            && let Some(found) = self.named.get(&format!("{namespace}.{name}"))
        {
            return Ok(found.clone());
        }
        self.named
            .get(name)
            .cloned()
            .ok_or_else(|| Error::InvalidAvro(format!("unknown type '{name}'")))
    }

    fn register(&mut self, fullname: String, schema: &AvroSchema) -> Result<()> {
        if self.named.contains_key(&fullname) {
            return Err(Error::InvalidAvro(format!("type '{fullname}' is defined twice")));
        }
        self.named.insert(fullname, schema.clone());
        Ok(())
    }

    fn parse_union(&mut self, members: &[Value], namespace: Option<&str>) -> Result<AvroSchema> {
        let mut parsed = Vec::with_capacity(members.len());
        for member in members {
            let member = self.parse(member, namespace)?;
            if matches!(member, AvroSchema::Union(_)) {
                return Err(Error::InvalidAvro(
                    "unions may not immediately contain other unions".into(),
                ));
            }
            parsed.push(member);
        }
        Ok(AvroSchema::Union(parsed))
    }

    fn parse_object(
        &mut self,
        object: &Map<String, Value>,
        namespace: Option<&str>,
    ) -> Result<AvroSchema> {
        let type_name = match object.get("type") {
            Some(Value::String(type_name)) => type_name.as_str(),
            // `{"type": {...}}` and `{"type": [...]}` wrap another schema.
            Some(nested) => return self.parse(nested, namespace),
            None => {
                return Err(Error::InvalidAvro(format!(
                    "schema object without 'type': {}",
                    Value::Object(object.clone())
                )));
            }
        };
        match type_name {
            "record" | "error" => self.parse_record(object, namespace),
            "enum" => self.parse_enum(object, namespace),
            "fixed" => self.parse_fixed(object, namespace),
            "array" => {
                let items = object
                    .get("items")
                    .ok_or_else(|| Error::InvalidAvro("array requires 'items'".into()))?;
                Ok(AvroSchema::Array(ArraySchema {
                    items: Box::new(self.parse(items, namespace)?),
                    props: collect_props(object, &["type", "items"]),
                }))
            }
            "map" => {
                let values = object
                    .get("values")
                    .ok_or_else(|| Error::InvalidAvro("map requires 'values'".into()))?;
                Ok(AvroSchema::Map(MapSchema {
                    values: Box::new(self.parse(values, namespace)?),
                    props: collect_props(object, &["type", "values"]),
                }))
            }
            other => match PrimitiveKind::from_name(other) {
                Some(kind) => {
                    let logical = LogicalType::parse(object)?;
                    let mut reserved = vec!["type"];
                    if let Some(logical) = &logical {
                        reserved.extend_from_slice(logical.reserved_keys());
                    }
                    Ok(AvroSchema::Primitive(PrimitiveSchema {
                        kind,
                        logical,
                        props: collect_props(object, &reserved),
                    }))
                }
                None => self.resolve_name(other, namespace),
            },
        }
    }

    fn parse_name(object: &Map<String, Value>, context: &str) -> Result<Name> {
        Ok(Name {
            name: required_str(object, "name", context)?.to_string(),
            namespace: optional_str(object, "namespace")?,
        })
    }

    fn parse_record(
        &mut self,
        object: &Map<String, Value>,
        namespace: Option<&str>,
    ) -> Result<AvroSchema> {
        let name = Self::parse_name(object, "record")?;
        let fullname = name.fullname(namespace);
        let inner = name.effective_namespace(namespace);
        let fields_json = object
            .get("fields")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::InvalidAvro(format!("record '{fullname}' requires 'fields'")))?;

        let mut fields = Vec::with_capacity(fields_json.len());
        for field in fields_json {
            let field = field.as_object().ok_or_else(|| {
                Error::InvalidAvro(format!("fields of record '{fullname}' must be objects"))
            })?;
            let field_name = required_str(field, "name", "record field")?;
            let field_type = field.get("type").ok_or_else(|| {
                Error::InvalidAvro(format!("field '{field_name}' requires 'type'"))
            })?;
            fields.push(RecordField {
                name: field_name.to_string(),
                schema: self.parse(field_type, inner.as_deref())?,
                doc: optional_str(field, "doc")?,
                default: field.get("default").cloned(),
                props: collect_props(field, &["name", "type", "doc", "default"]),
            });
        }

        let record = AvroSchema::Record(RecordSchema {
            name,
            doc: optional_str(object, "doc")?,
            fields,
            props: collect_props(object, &["type", "name", "namespace", "doc", "fields"]),
        });
        self.register(fullname, &record)?;
        Ok(record)
    }

    fn parse_enum(
        &mut self,
        object: &Map<String, Value>,
        namespace: Option<&str>,
    ) -> Result<AvroSchema> {
        let name = Self::parse_name(object, "enum")?;
        let fullname = name.fullname(namespace);
        let symbols = object
            .get("symbols")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::InvalidAvro(format!("enum '{fullname}' requires 'symbols'")))?
            .iter()
            .map(|symbol| {
                symbol.as_str().map(str::to_string).ok_or_else(|| {
                    Error::InvalidAvro(format!("enum '{fullname}' symbols must be strings"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let schema = AvroSchema::Enum(EnumSchema {
            name,
            symbols,
            doc: optional_str(object, "doc")?,
            default: optional_str(object, "default")?,
            props: collect_props(
                object,
                &["type", "name", "namespace", "doc", "symbols", "default"],
            ),
        });
        self.register(fullname, &schema)?;
        Ok(schema)
    }

    fn parse_fixed(
        &mut self,
        object: &Map<String, Value>,
        namespace: Option<&str>,
    ) -> Result<AvroSchema> {
        let name = Self::parse_name(object, "fixed")?;
        let fullname = name.fullname(namespace);
        let size = object
            .get("size")
            .and_then(Value::as_u64)
            .ok_or_else(|| Error::InvalidAvro(format!("fixed '{fullname}' requires a 'size'")))?;
        let logical = LogicalType::parse(object)?;
        let mut reserved = vec!["type", "name", "namespace", "doc", "size"];
        if let Some(logical) = &logical {
            reserved.extend_from_slice(logical.reserved_keys());
        }
        let schema = AvroSchema::Fixed(FixedSchema {
            name,
            size,
            logical,
            doc: optional_str(object, "doc")?,
            props: collect_props(object, &reserved),
        });
        self.register(fullname, &schema)?;
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_primitives_print_as_names() {
        let schema = AvroSchema::parse_str(r#"{"type": "string"}"#).expect("parse string");
        assert_eq!(schema, AvroSchema::primitive(PrimitiveKind::String));
        assert_eq!(schema.to_string(), r#""string""#);
    }

    #[test]
    fn decimal_logical_type_consumes_precision_and_scale() {
        let schema = AvroSchema::parse_str(
            r#"{"type": "fixed", "name": "dec", "size": 16,
                "logicalType": "decimal", "precision": 20, "scale": 15}"#,
        )
        .expect("parse decimal fixed");
        let AvroSchema::Fixed(fixed) = &schema else {
            panic!("expected fixed, got {schema:?}");
        };
        assert_eq!(
            fixed.logical,
            Some(LogicalType::Decimal {
                precision: 20,
                scale: 15
            })
        );
        assert!(fixed.props.is_empty());
        assert_eq!(
            schema.to_string(),
            r#"{"logicalType":"decimal","name":"dec","precision":20,"scale":15,"size":16,"type":"fixed"}"#
        );
    }

    #[test]
    fn unknown_logical_types_stay_in_properties() {
        let schema = AvroSchema::parse_str(
            r#"{"type": "array", "items": "int", "logicalType": "map", "element-id": 3}"#,
        )
        .expect("parse logical map array");
        let AvroSchema::Array(array) = &schema else {
            panic!("expected array, got {schema:?}");
        };
        assert!(array.is_logical_map());
        assert_eq!(array.props.get(ELEMENT_ID_PROP), Some(&Value::from(3)));

        let primitive = AvroSchema::parse_str(r#"{"type": "string", "logicalType": "json"}"#)
            .expect("parse unknown logical type");
        let AvroSchema::Primitive(primitive) = primitive else {
            panic!("expected primitive");
        };
        assert_eq!(primitive.logical, None);
        assert_eq!(
            primitive.props.get(LOGICAL_TYPE_PROP),
            Some(&Value::from("json"))
        );
    }

    #[test]
    fn named_types_are_referenced_after_first_use() {
        let json = r#"{
            "type": "record", "name": "outer", "namespace": "com.example",
            "fields": [
                {"name": "a", "type": {"type": "fixed", "name": "md5", "size": 16}},
                {"name": "b", "type": "md5"},
                {"name": "c", "type": ["null", "com.example.md5"]}
            ]
        }"#;
        let schema = AvroSchema::parse_str(json).expect("parse references");
        let AvroSchema::Record(record) = &schema else {
            panic!("expected record");
        };
        assert_eq!(record.fields[0].schema, record.fields[1].schema);
        let AvroSchema::Union(members) = &record.fields[2].schema else {
            panic!("expected union");
        };
        assert_eq!(members[1], record.fields[0].schema);

        let printed = schema.to_json();
        let fields = printed["fields"].as_array().expect("fields array");
        assert_eq!(fields[0]["type"]["name"], "md5");
        assert_eq!(fields[1]["type"], "com.example.md5");
        assert_eq!(fields[2]["type"][1], "com.example.md5");
        schema.check_names().expect("repeated identical definition");
    }

    #[test]
    fn differing_definitions_of_one_name_are_rejected() {
        let schema = AvroSchema::record(
            "outer",
            vec![
                RecordField::new("a", AvroSchema::fixed("hash", 16)),
                RecordField::new("b", AvroSchema::fixed("hash", 32)),
            ],
        );
        let err = schema.check_names().expect_err("hash is defined twice");
        assert!(matches!(err, Error::ConflictingTypeName(ref name) if name == "hash"));

        let schema = AvroSchema::record(
            "r1",
            vec![RecordField::new(
                "inner",
                AvroSchema::record(
                    "r1",
                    vec![RecordField::new("x", AvroSchema::primitive(PrimitiveKind::Int))],
                ),
            )],
        );
        assert!(matches!(schema.check_names(), Err(Error::ConflictingTypeName(_))));
    }

    #[test]
    fn nested_unions_are_rejected() {
        let err = AvroSchema::parse_str(r#"["null", ["int", "long"]]"#)
            .expect_err("nested union must fail");
        assert!(err.to_string().contains("unions may not immediately contain"));
    }

    #[test]
    fn unknown_references_are_rejected() {
        let err = AvroSchema::parse_str(
            r#"{"type": "record", "name": "r", "fields": [{"name": "x", "type": "missing"}]}"#,
        )
        .expect_err("unknown reference must fail");
        assert!(err.to_string().contains("unknown type 'missing'"));
    }

    #[test]
    fn field_defaults_and_properties_survive_printing() {
        let json = r#"{"type":"record","name":"r","fields":[{"default":null,"doc":"d","field-id":4,"name":"x","type":["null","long"]}]}"#;
        let schema = AvroSchema::parse_str(json).expect("parse record");
        let AvroSchema::Record(record) = &schema else {
            panic!("expected record");
        };
        assert_eq!(record.fields[0].default, Some(Value::Null));
        assert_eq!(record.fields[0].doc.as_deref(), Some("d"));
        assert_eq!(schema.to_string(), json);
    }
}
