//! Values → TOML text.
//!
//! [`to_pair`] lowers a host value to a TOML [`Literal`] plus an optional key
//! suffix (durations that are not a time of day need one); the `format_*`
//! functions render literals, keys and strings.
use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::bind::duration::{DurationUnit, MICROS_PER_DAY, MICROS_PER_SECOND};
use crate::error::{FormatError, Result};
use crate::value::Value;

/// A TOML value, as it will be written.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    OffsetDateTime(DateTime<FixedOffset>),
    Array(Vec<Literal>),
    /// Inline table; keys already carry their suffix.
    Table(Vec<(String, Literal)>),
}

// ————————————————————————————————————————————————————————————————————————————
// VALUE → LITERAL
// ————————————————————————————————————————————————————————————————————————————

pub fn to_pair(value: &Value) -> Result<(Option<DurationUnit>, Literal)> {
    let literal = match value {
        Value::Boolean(flag) => Literal::Boolean(*flag),
        Value::Integer(number) => Literal::Integer(*number),
        Value::Float(number) => Literal::Float(*number),
        Value::String(text) => Literal::String(text.clone()),
        Value::Date(date) => Literal::Date(*date),
        Value::Time(time) => Literal::Time(*time),
        Value::DateTime(stamp) => Literal::DateTime(*stamp),
        Value::OffsetDateTime(stamp) => Literal::OffsetDateTime(*stamp),
        Value::Duration(duration) => return duration_pair(*duration),
        Value::Path(path) => match path.to_str() {
            Some(text) => Literal::String(text.to_owned()),
            None => {
                return Err(FormatError::Unrepresentable {
                    kind: "path".into(),
                    reason: "not valid UTF-8",
                }
                .into());
            }
        },
        Value::Module(module) => Literal::String(module.name().to_owned()),
        Value::Class(class) => Literal::String(class.full_name()),
        Value::Enum(member) => match member.value() {
            Some(number) => Literal::Integer(number),
            None => Literal::String(member.name().to_lowercase()),
        },
        Value::Array(items) => Literal::Array(
            items
                .iter()
                .map(|item| match to_pair(item)? {
                    (None, literal) => Ok(literal),
                    (Some(unit), literal) => Err(FormatError::SuffixInArray {
                        value: format!("{} {}", format_value(&literal), unit.suffix()),
                    }
                    .into()),
                })
                .collect::<Result<_>>()?,
        ),
        Value::Table(table) => Literal::Table(
            table
                .iter()
                .map(|(key, item)| suffixed_entry(key, item))
                .collect::<Result<_>>()?,
        ),
        Value::Record(record) => {
            let schema = record.handle().schema()?;
            let mut entries = Vec::new();
            for field in schema.included_fields() {
                if let Some(item) = record.get(&field.name) {
                    entries.push(suffixed_entry(&field.name.replace('_', "-"), item)?);
                }
            }
            Literal::Table(entries)
        }
    };
    Ok((None, literal))
}

fn suffixed_entry(key: &str, value: &Value) -> Result<(String, Literal)> {
    let (unit, literal) = to_pair(value)?;
    let key = match unit {
        Some(unit) => format!("{key}-{}", unit.suffix()),
        None => key.to_owned(),
    };
    Ok((key, literal))
}

/// Shortest faithful rendering: a time of day under one day, otherwise the
/// coarsest unit that represents the duration exactly.
fn duration_pair(duration: TimeDelta) -> Result<(Option<DurationUnit>, Literal)> {
    let unrepresentable = |reason| FormatError::Unrepresentable { kind: "duration".into(), reason };
    let total = duration
        .num_microseconds()
        .ok_or_else(|| unrepresentable("exceeds the microsecond range"))?;
    let days = total.div_euclid(MICROS_PER_DAY);
    let within_day = total.rem_euclid(MICROS_PER_DAY);
    let seconds = within_day / MICROS_PER_SECOND;
    let micros = within_day % MICROS_PER_SECOND;

    if days == 0 {
        let time = u32::try_from(seconds)
            .ok()
            .zip(u32::try_from(micros * 1_000).ok())
            .and_then(|(seconds, nanos)| {
                NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos)
            })
            .ok_or_else(|| unrepresentable("not a time of day"))?;
        return Ok((None, Literal::Time(time)));
    }

    let unit = if micros != 0 {
        if total % 1_000 == 0 {
            DurationUnit::Milliseconds
        } else {
            DurationUnit::Microseconds
        }
    } else if seconds != 0 {
        [DurationUnit::Hours, DurationUnit::Minutes]
            .into_iter()
            .find(|unit| total % unit.micros() == 0)
            .unwrap_or(DurationUnit::Seconds)
    } else if days % 7 == 0 {
        DurationUnit::Weeks
    } else {
        DurationUnit::Days
    };
    Ok((Some(unit), Literal::Integer(total / unit.micros())))
}

// ————————————————————————————————————————————————————————————————————————————
// TEXT
// ————————————————————————————————————————————————————————————————————————————

static BARE_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\-]+$").expect("valid regex"));

pub fn format_key(key: &str) -> String {
    if BARE_KEY.is_match(key) {
        key.to_owned()
    } else {
        format_text(key)
    }
}

/// Literal string when possible, basic string with escapes otherwise.
pub fn format_text(text: &str) -> String {
    let printable = |ch: char| ch.is_ascii() && !ch.is_ascii_control();
    if text.chars().all(printable) && !text.contains('\'') {
        return format!("'{text}'");
    }
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\u{08}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{0C}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            ch if printable(ch) => out.push(ch),
            ch if (ch as u32) < 0x10000 => {
                let _ = write!(out, "\\u{:04X}", ch as u32);
            }
            ch => {
                let _ = write!(out, "\\U{:08X}", ch as u32);
            }
        }
    }
    out.push('"');
    out
}

pub fn format_value(literal: &Literal) -> String {
    let mut out = String::new();
    write_literal(&mut out, literal);
    out
}

fn write_literal(out: &mut String, literal: &Literal) {
    match literal {
        Literal::Boolean(flag) => out.push_str(if *flag { "true" } else { "false" }),
        Literal::Integer(number) => {
            let _ = write!(out, "{number}");
        }
        Literal::Float(number) => out.push_str(&format_float(*number)),
        Literal::String(text) => out.push_str(&format_text(text)),
        Literal::Date(date) => {
            let _ = write!(out, "{}", date.format("%Y-%m-%d"));
        }
        Literal::Time(time) => {
            let _ = write!(out, "{}", time.format("%H:%M:%S%.f"));
        }
        Literal::DateTime(stamp) => {
            let _ = write!(out, "{}", stamp.format("%Y-%m-%dT%H:%M:%S%.f"));
        }
        Literal::OffsetDateTime(stamp) => {
            let _ = write!(out, "{}", stamp.format("%Y-%m-%dT%H:%M:%S%.f%:z"));
        }
        Literal::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_literal(out, item);
            }
            out.push(']');
        }
        Literal::Table(entries) => {
            out.push('{');
            for (index, (key, item)) in entries.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                out.push_str(&format_key(key));
                out.push_str(" = ");
                write_literal(out, item);
            }
            out.push('}');
        }
    }
}

fn format_float(number: f64) -> String {
    if number.is_nan() {
        "nan".to_owned()
    } else if number.is_infinite() {
        if number > 0.0 { "inf" } else { "-inf" }.to_owned()
    } else {
        format!("{number:?}")
    }
}

/// `key = value` line for a pre-lowered literal.
pub fn format_literal_pair(key: &str, literal: &Literal) -> String {
    format!("{} = {}", format_key(key), format_value(literal))
}

/// `key = value` line for `value`, with the duration suffix appended to the key if needed.
pub fn format_toml_pair(key: &str, value: &Value) -> Result<String> {
    let (unit, literal) = to_pair(value)?;
    Ok(match unit {
        Some(unit) => format_literal_pair(&format!("{key}-{}", unit.suffix()), &literal),
        None => format_literal_pair(key, &literal),
    })
}
