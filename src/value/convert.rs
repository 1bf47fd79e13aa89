//! Conversions between host types and [`Value`].
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use indexmap::IndexMap;

use super::{ClassRef, EnumValue, ModuleRef, Value};
use crate::decl::Record;
use crate::error::BindError;

/// Extract a host value from a bound [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: Value, context: &str) -> Result<Self, BindError>;

    /// Value to use when the field is absent; `None` makes absence an error.
    fn from_absent() -> Option<Self> {
        None
    }
}

/// Project a host value into a [`Value`]; `None` means absent.
pub trait ToValue {
    fn to_value(&self) -> Option<Value>;
}

// ————————————————————————————————————————————————————————————————————————————
// SCALARS
// ————————————————————————————————————————————————————————————————————————————

macro_rules! scalar_conversions {
    ($($ty:ty => $variant:ident, $kind:literal;)*) => {$(
        impl FromValue for $ty {
            fn from_value(value: Value, context: &str) -> Result<Self, BindError> {
                match value {
                    Value::$variant(inner) => Ok(inner),
                    other => Err(BindError::mismatch(context, other.kind(), $kind)),
                }
            }
        }

        impl ToValue for $ty {
            fn to_value(&self) -> Option<Value> {
                Some(Value::$variant(self.clone()))
            }
        }
    )*};
}

scalar_conversions! {
    bool => Boolean, "boolean";
    i64 => Integer, "integer";
    f64 => Float, "float";
    String => String, "string";
    PathBuf => Path, "path";
    NaiveDate => Date, "date";
    NaiveTime => Time, "time";
    NaiveDateTime => DateTime, "datetime";
    DateTime<FixedOffset> => OffsetDateTime, "datetime";
    TimeDelta => Duration, "duration";
    ModuleRef => Module, "module";
    ClassRef => Class, "class";
    EnumValue => Enum, "enum";
}

macro_rules! integer_conversions {
    ($($ty:ty),*) => {$(
        impl FromValue for $ty {
            fn from_value(value: Value, context: &str) -> Result<Self, BindError> {
                let wide = i64::from_value(value, context)?;
                <$ty>::try_from(wide).map_err(|_| BindError::OutOfRange {
                    context: context.to_owned(),
                    target: stringify!($ty),
                })
            }
        }
    )*};
}

integer_conversions!(i8, i16, i32, u8, u16, u32, u64, usize);

macro_rules! lossless_integers {
    ($($ty:ty),*) => {$(
        impl ToValue for $ty {
            fn to_value(&self) -> Option<Value> {
                Some(Value::Integer(i64::from(*self)))
            }
        }
    )*};
}

lossless_integers!(i8, i16, i32, u8, u16, u32);

macro_rules! saturating_integers {
    ($($ty:ty),*) => {$(
        // TOML integers are 64-bit signed; larger values saturate at `i64::MAX`.
        impl ToValue for $ty {
            fn to_value(&self) -> Option<Value> {
                let wide = i64::try_from(*self).unwrap_or_else(|_| {
                    tracing::warn!(
                        value = *self,
                        ty = stringify!($ty),
                        "integer saturated at i64::MAX"
                    );
                    i64::MAX
                });
                Some(Value::Integer(wide))
            }
        }
    )*};
}

saturating_integers!(u64, usize);

impl ToValue for str {
    fn to_value(&self) -> Option<Value> {
        Some(Value::String(self.to_owned()))
    }
}

impl ToValue for &str {
    fn to_value(&self) -> Option<Value> {
        Some(Value::String((*self).to_owned()))
    }
}

impl FromValue for Value {
    fn from_value(value: Value, _: &str) -> Result<Self, BindError> {
        Ok(value)
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Option<Value> {
        Some(self.clone())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// CONTAINERS
// ————————————————————————————————————————————————————————————————————————————

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value, context: &str) -> Result<Self, BindError> {
        T::from_value(value, context).map(Some)
    }
    fn from_absent() -> Option<Self> {
        Some(None)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Option<Value> {
        self.as_ref().and_then(ToValue::to_value)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value, context: &str) -> Result<Self, BindError> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| T::from_value(item, &format!("{context}[{index}]")))
                .collect(),
            other => Err(BindError::expected_shape(context, other.kind(), "array")),
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Option<Value> {
        Some(Value::Array(self.iter().filter_map(ToValue::to_value).collect()))
    }
}

fn table_entries<T: FromValue>(value: Value, context: &str) -> Result<Vec<(String, T)>, BindError> {
    match value {
        Value::Table(table) => table
            .into_iter()
            .map(|(key, item)| {
                let item = T::from_value(item, &format!("{context}[\"{key}\"]"))?;
                Ok((key, item))
            })
            .collect(),
        other => Err(BindError::expected_shape(context, other.kind(), "table")),
    }
}

macro_rules! map_conversions {
    ($($map:ident),*) => {$(
        impl<T: FromValue> FromValue for $map<String, T> {
            fn from_value(value: Value, context: &str) -> Result<Self, BindError> {
                Ok(table_entries(value, context)?.into_iter().collect())
            }
        }

        impl<T: ToValue> ToValue for $map<String, T> {
            fn to_value(&self) -> Option<Value> {
                let table = self
                    .iter()
                    .filter_map(|(key, item)| Some((key.clone(), item.to_value()?)))
                    .collect();
                Some(Value::Table(table))
            }
        }
    )*};
}

map_conversions!(IndexMap, BTreeMap, HashMap);

macro_rules! tuple_conversions {
    ($len:literal => $($name:ident $index:tt),+) => {
        impl<$($name: FromValue),+> FromValue for ($($name,)+) {
            fn from_value(value: Value, context: &str) -> Result<Self, BindError> {
                let items = match value {
                    Value::Array(items) => items,
                    other => return Err(BindError::expected_shape(context, other.kind(), "array")),
                };
                if items.len() != $len {
                    return Err(BindError::Arity {
                        context: context.to_owned(),
                        expected: $len,
                        found: items.len(),
                    });
                }
                let mut items = items.into_iter();
                Ok(($({
                    let item = items.next().ok_or_else(|| BindError::Missing {
                        context: format!("{context}[{}]", $index),
                    })?;
                    $name::from_value(item, &format!("{context}[{}]", $index))?
                },)+))
            }
        }

        impl<$($name: ToValue),+> ToValue for ($($name,)+) {
            fn to_value(&self) -> Option<Value> {
                Some(Value::Array(vec![$(self.$index.to_value()?),+]))
            }
        }
    };
}

tuple_conversions!(2 => A 0, B 1);
tuple_conversions!(3 => A 0, B 1, C 2);
tuple_conversions!(4 => A 0, B 1, C 2, D 3);

// ————————————————————————————————————————————————————————————————————————————
// RECORDS
// ————————————————————————————————————————————————————————————————————————————

impl<T: Record> FromValue for T {
    fn from_value(value: Value, context: &str) -> Result<Self, BindError> {
        match value {
            Value::Record(record) if record.handle().is::<T>() => T::from_record(record),
            other => Err(BindError::mismatch(context, other.kind(), T::name())),
        }
    }
}

impl<T: Record> ToValue for T {
    fn to_value(&self) -> Option<Value> {
        Some(Value::Record(self.to_record()))
    }
}
