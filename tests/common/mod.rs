//! Shared records and helpers for the integration tests.
//!
//! Include with `#[macro_use] mod common;` so [`untyped_record!`] is in scope.
//! Most scenarios only need a declaration, so they use untyped records that
//! keep the bound [`RecordValue`] as is.

#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;
use toml_binder::{BindError, FieldDef, Record, RecordDef, RecordValue, TypeDecl, Value};

/// Declare a record type wrapping its bound [`RecordValue`].
macro_rules! untyped_record {
    ($name:ident, $definition:expr) => {
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name(pub toml_binder::RecordValue);

        impl toml_binder::Record for $name {
            fn definition() -> toml_binder::RecordDef {
                $definition
            }

            fn from_record(
                record: toml_binder::RecordValue,
            ) -> Result<Self, toml_binder::BindError> {
                Ok(Self(record))
            }

            fn to_record(&self) -> toml_binder::RecordValue {
                self.0.clone()
            }
        }
    };
}

// ----- typed records -----

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub rest_api_port: i64,
    pub feed_job_prefixes: Vec<String>,
    pub import_max_nr_hours: i64,
}

impl Record for Config {
    fn definition() -> RecordDef {
        RecordDef::new()
            .field(FieldDef::new("rest_api_port", TypeDecl::Integer))
            .field(
                FieldDef::new("feed_job_prefixes", TypeDecl::sequence(TypeDecl::String))
                    .default(Vec::<String>::new()),
            )
            .field(FieldDef::new("import_max_nr_hours", TypeDecl::Integer).default(24_i64))
    }

    fn from_record(mut record: RecordValue) -> Result<Self, BindError> {
        Ok(Self {
            rest_api_port: record.take("rest_api_port")?,
            feed_job_prefixes: record.take("feed_job_prefixes")?,
            import_max_nr_hours: record.take("import_max_nr_hours")?,
        })
    }

    fn to_record(&self) -> RecordValue {
        RecordValue::new::<Self>()
            .with("rest_api_port", &self.rest_api_port)
            .with("feed_job_prefixes", &self.feed_job_prefixes)
            .with("import_max_nr_hours", &self.import_max_nr_hours)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OptionalConfig {
    pub trend_identifier: Option<String>,
}

impl Record for OptionalConfig {
    fn definition() -> RecordDef {
        RecordDef::new().field(
            FieldDef::new("trend_identifier", TypeDecl::optional(TypeDecl::String)).optional(),
        )
    }

    fn from_record(mut record: RecordValue) -> Result<Self, BindError> {
        Ok(Self {
            trend_identifier: record.take("trend_identifier")?,
        })
    }

    fn to_record(&self) -> RecordValue {
        RecordValue::new::<Self>().with("trend_identifier", &self.trend_identifier)
    }
}

// ----- untyped records -----

untyped_record!(
    NestedConfig,
    RecordDef::new()
        .doc("This table is bound to a nested record.")
        .field(FieldDef::new("inner_int", TypeDecl::Integer))
        .field(FieldDef::new("inner_str", TypeDecl::String))
        .field(FieldDef::new("optional", TypeDecl::optional(TypeDecl::String)).optional())
        .field(FieldDef::new("with_default", TypeDecl::String).default("n/a"))
);

untyped_record!(
    BinaryTree,
    RecordDef::new()
        .field(FieldDef::new("value", TypeDecl::Integer))
        .field(
            FieldDef::new("left", TypeDecl::optional(TypeDecl::record::<BinaryTree>())).optional()
        )
        .field(
            FieldDef::new("right", TypeDecl::optional(TypeDecl::record::<BinaryTree>())).optional()
        )
);

// ----- helpers -----

pub fn nested(inner_int: i64, inner_str: &str) -> Value {
    Value::Record(
        RecordValue::new::<NestedConfig>()
            .with("inner_int", &inner_int)
            .with("inner_str", inner_str)
            .with("with_default", "n/a"),
    )
}

pub fn tree(value: i64, left: Option<Value>, right: Option<Value>) -> Value {
    let mut record = RecordValue::new::<BinaryTree>().with("value", &value);
    if let Some(left) = left {
        record.set("left", left);
    }
    if let Some(right) = right {
        record.set("right", right);
    }
    Value::Record(record)
}

/// Write `text` to `name` inside a fresh temporary directory.
///
/// The `TempDir` must outlive every use of the returned path.
pub fn write_toml(name: &str, text: &str) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join(name);
    std::fs::write(&path, text).expect("Failed to write TOML file");
    (path, temp_dir)
}

/// Dedent a multi-line TOML snippet written inline in a test.
pub fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    text.lines()
        .map(|line| line.get(indent..).unwrap_or("").to_owned())
        .collect::<Vec<_>>()
        .join("\n")
}
