//! Bound values: what documents decode into and what records are made of.
//!
//! [`Value`] is both the decoded-document model (tables, arrays, scalars) and the
//! host representation of bound fields (durations, references, records). Typed
//! structs move in and out of it through [`convert::FromValue`] and
//! [`convert::ToValue`].
pub mod convert;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::decl::{Record, RecordHandle};
use crate::error::BindError;

pub use convert::{FromValue, ToValue};

/// Ordered string-keyed table, as decoded or bound.
pub type Table = IndexMap<String, Value>;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Path(PathBuf),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    OffsetDateTime(DateTime<FixedOffset>),
    Duration(TimeDelta),
    Module(ModuleRef),
    Class(ClassRef),
    Enum(EnumValue),
    Array(Vec<Value>),
    Table(Table),
    Record(RecordValue),
}

impl Value {
    /// Short kind name used in error messages; records report their type name.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Path(_) => "path",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) | Value::OffsetDateTime(_) => "datetime",
            Value::Duration(_) => "duration",
            Value::Module(_) => "module",
            Value::Class(_) => "class",
            Value::Enum(_) => "enum",
            Value::Array(_) => "array",
            Value::Table(_) => "table",
            Value::Record(record) => record.handle().name(),
        }
    }

    /// Tables and records both render as TOML tables.
    pub fn is_table_like(&self) -> bool {
        matches!(self, Value::Table(_) | Value::Record(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// REFERENCES
// ————————————————————————————————————————————————————————————————————————————

/// A namespace registered in a [`crate::resolve::Registry`], by dotted name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModuleRef {
    name: Arc<str>,
}

impl ModuleRef {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A host class: module, qualified name inside the module, and the full names
/// of itself and every ancestor (for subclass checks).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassRef {
    module: Arc<str>,
    qualname: Arc<str>,
    ancestry: Arc<[String]>,
}

impl ClassRef {
    pub fn new(module: impl Into<Arc<str>>, qualname: impl Into<Arc<str>>) -> Self {
        let module = module.into();
        let qualname = qualname.into();
        let ancestry = Arc::from(vec![format!("{module}.{qualname}")]);
        Self { module, qualname, ancestry }
    }

    /// Declare `base` (and transitively its ancestors) as a superclass.
    pub fn extends(self, base: &ClassRef) -> Self {
        let mut ancestry = self.ancestry.to_vec();
        for name in base.ancestry.iter() {
            if !ancestry.contains(name) {
                ancestry.push(name.clone());
            }
        }
        Self { ancestry: Arc::from(ancestry), ..self }
    }

    pub fn module(&self) -> &str {
        &self.module
    }
    pub fn qualname(&self) -> &str {
        &self.qualname
    }
    /// Last segment of the qualified name.
    pub fn name(&self) -> &str {
        self.qualname.rsplit('.').next().unwrap_or(&self.qualname)
    }
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.module, self.qualname)
    }

    pub fn is_subclass_of(&self, base: &ClassRef) -> bool {
        let target = base.full_name();
        self.ancestry.iter().any(|name| *name == target)
    }
}

/// One member of an [`crate::decl::EnumDef`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumValue {
    enumeration: Arc<str>,
    name: Arc<str>,
    value: Option<i64>,
}

impl EnumValue {
    pub(crate) fn new(enumeration: Arc<str>, name: Arc<str>, value: Option<i64>) -> Self {
        Self { enumeration, name, value }
    }
    pub fn enumeration(&self) -> &str {
        &self.enumeration
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Integer value for integer-valued enumerations.
    pub fn value(&self) -> Option<i64> {
        self.value
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RECORDS
// ————————————————————————————————————————————————————————————————————————————

/// Field values of one record instance. Absent (optional, unset) fields have no entry.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordValue {
    handle: RecordHandle,
    fields: IndexMap<String, Value>,
}

impl RecordValue {
    pub fn new<T: Record>() -> Self {
        Self::of(RecordHandle::of::<T>())
    }

    pub fn of(handle: RecordHandle) -> Self {
        Self { handle, fields: IndexMap::new() }
    }

    pub fn handle(&self) -> RecordHandle {
        self.handle
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builder-style insert for `Record::to_record`; absent values are skipped.
    pub fn with<T: ToValue + ?Sized>(mut self, name: &str, value: &T) -> Self {
        if let Some(value) = value.to_value() {
            self.fields.insert(name.to_owned(), value);
        }
        self
    }

    /// Move a field out, converted, for `Record::from_record`.
    pub fn take<T: FromValue>(&mut self, name: &str) -> Result<T, BindError> {
        let context = format!("{}.{}", self.handle.name(), name);
        match self.fields.shift_remove(name) {
            Some(value) => T::from_value(value, &context),
            None => T::from_absent().ok_or(BindError::Missing { context }),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SERDE
// ————————————————————————————————————————————————————————————————————————————

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Boolean(flag) => serializer.serialize_bool(*flag),
            Value::Integer(number) => serializer.serialize_i64(*number),
            Value::Float(number) => serializer.serialize_f64(*number),
            Value::String(text) => serializer.serialize_str(text),
            Value::Path(path) => serializer.collect_str(&path.display()),
            Value::Date(date) => serializer.collect_str(date),
            Value::Time(time) => serializer.collect_str(time),
            Value::DateTime(stamp) => serializer.collect_str(&stamp.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::OffsetDateTime(stamp) => serializer.serialize_str(&stamp.to_rfc3339()),
            Value::Duration(duration) => serializer.collect_str(duration),
            Value::Module(module) => serializer.serialize_str(module.name()),
            Value::Class(class) => serializer.serialize_str(&class.full_name()),
            Value::Enum(member) => serializer.serialize_str(member.name()),
            Value::Array(items) => serializer.collect_seq(items),
            Value::Table(table) => serializer.collect_map(table),
            Value::Record(record) => serializer.collect_map(
                record
                    .fields()
                    .map(|(name, value)| (name.replace('_', "-"), value)),
            ),
        }
    }
}
