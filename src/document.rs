//! Decoding TOML text into [`Table`]s of [`Value`]s.
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Error, Result};
use crate::value::{Table, Value};

pub fn parse_str(text: &str) -> Result<Table> {
    let table: toml::Table = toml::from_str(text)?;
    convert_table(table)
}

pub fn parse_reader(mut reader: impl Read) -> Result<Table> {
    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(Error::Read)?;
    parse_str(&text)
}

pub fn parse_file(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "read TOML document");
    parse_str(&text)
}

fn convert_table(table: toml::Table) -> Result<Table> {
    table
        .into_iter()
        .map(|(key, value)| Ok((key, convert(value)?)))
        .collect()
}

fn convert(value: toml::Value) -> Result<Value> {
    Ok(match value {
        toml::Value::String(text) => Value::String(text),
        toml::Value::Integer(number) => Value::Integer(number),
        toml::Value::Float(number) => Value::Float(number),
        toml::Value::Boolean(flag) => Value::Boolean(flag),
        toml::Value::Datetime(stamp) => convert_datetime(&stamp)?,
        toml::Value::Array(items) => {
            Value::Array(items.into_iter().map(convert).collect::<Result<_>>()?)
        }
        toml::Value::Table(table) => Value::Table(convert_table(table)?),
    })
}

/// TOML's four date-time flavors map onto chrono's types by which parts are present.
fn convert_datetime(stamp: &toml::value::Datetime) -> Result<Value> {
    let text = stamp.to_string();
    let parsed = match (stamp.date.is_some(), stamp.time.is_some(), stamp.offset.is_some()) {
        (true, false, _) => NaiveDate::parse_from_str(&text, "%Y-%m-%d").ok().map(Value::Date),
        (false, true, _) => parse_time(&text).map(Value::Time),
        (true, true, false) => NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(Value::DateTime),
        (true, true, true) => DateTime::parse_from_rfc3339(&text).ok().map(Value::OffsetDateTime),
        (false, false, _) => None,
    };
    parsed.ok_or(Error::Datetime(text))
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
}
