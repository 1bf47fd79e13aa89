//! Decoded TOML tables → record values, driven by the normalized [`Schema`].
//!
//! Dispatch mirrors the schema tree:
//! - records resolve each TOML key onto a field (with optional duration suffix)
//!   and bind the value against that field's schema
//! - unions try alternatives in order and only swallow shape mismatches
//! - containers bind element-wise with indexed contexts (`ctx[0]`, `ctx["key"]`)
//! - references are looked up in the [`Registry`]
//!
//! Binding into an existing record keeps every field the document does not set.
pub mod duration;
pub mod key;

use std::borrow::Cow;
use std::path::PathBuf;

use indexmap::IndexMap;

use crate::decl::FieldDefault;
use crate::error::{BindError, KeyError, Result};
use crate::resolve::{Object, Registry};
use crate::schema::{ClassBound, RecordSchema, Scalar, Schema};
use crate::value::{RecordValue, Table, Value};

use self::duration::DurationUnit;
pub use self::key::resolve_key;

/// Bind a decoded document against a record schema.
///
/// With `existing`, the result starts from that record and only the keys present
/// in `document` change (nested records merge the same way).
pub fn bind(
    document: &Table,
    schema: &RecordSchema,
    existing: Option<&RecordValue>,
    registry: &Registry,
) -> Result<RecordValue> {
    Binding { registry }.record(document, schema, existing, schema.name())
}

struct Binding<'r> {
    registry: &'r Registry,
}

impl Binding<'_> {
    fn record(
        &self,
        table: &Table,
        schema: &RecordSchema,
        existing: Option<&RecordValue>,
        context: &str,
    ) -> Result<RecordValue> {
        let existing = existing.filter(|record| record.handle() == schema.handle);

        let mut parsed: IndexMap<String, Value> = IndexMap::with_capacity(table.len());
        for (key, value) in table {
            if key.contains('_') {
                return Err(KeyError::Underscore { key: key.clone() }.into());
            }
            let Some((name, suffix)) = resolve_key(key, |name| schema.field(name).is_some()) else {
                return Err(KeyError::UnknownField {
                    context: format!("{context}.{}", key.replace('-', "_")),
                }
                .into());
            };
            let Some(field) = schema.field(&name) else {
                continue;
            };
            let field_context = format!("{context}.{name}");

            let value = match suffix {
                None => Cow::Borrowed(value),
                Some(suffix) => {
                    let unit = match (&field.schema, DurationUnit::from_suffix(&suffix)) {
                        (Schema::Scalar(Scalar::Duration), Some(unit)) => unit,
                        _ => {
                            return Err(KeyError::UnsupportedSuffix {
                                context: field_context,
                                schema: field.schema.to_string(),
                                suffix,
                            }
                            .into());
                        }
                    };
                    Cow::Owned(Value::Duration(unit.apply(value, &field_context)?))
                }
            };

            let seed = existing.and_then(|record| record.get(&name));
            let bound = self.field(&value, &field.schema, seed, &field_context)?;
            parsed.insert(name, bound);
        }

        self.construct(schema, parsed, existing, context)
    }

    fn construct(
        &self,
        schema: &RecordSchema,
        mut parsed: IndexMap<String, Value>,
        existing: Option<&RecordValue>,
        context: &str,
    ) -> Result<RecordValue> {
        if let Some(existing) = existing {
            let mut merged = existing.clone();
            for (name, value) in parsed {
                merged.set(name, value);
            }
            return Ok(merged);
        }

        let mut record = RecordValue::of(schema.handle);
        for field in schema.included_fields() {
            match (parsed.shift_remove(&field.name), &field.default) {
                (Some(value), _) => record.set(field.name.as_str(), value),
                (None, FieldDefault::Value(default)) => {
                    record.set(field.name.as_str(), default.clone())
                }
                (None, FieldDefault::Absent) => {}
                (None, FieldDefault::Required) => {
                    return Err(BindError::Missing {
                        context: format!("{context}.{}", field.name),
                    }
                    .into());
                }
            }
        }
        Ok(record)
    }

    /// Bind against a possibly-union schema.
    fn field(
        &self,
        value: &Value,
        schema: &Schema,
        existing: Option<&Value>,
        context: &str,
    ) -> Result<Value> {
        let Schema::Union(alternatives) = schema else {
            return self.single(value, schema, existing, context);
        };
        for alternative in alternatives {
            match self.single(value, alternative, existing, context) {
                Ok(bound) => return Ok(bound),
                Err(err) if err.is_type_mismatch() => {
                    tracing::trace!(
                        context,
                        alternative = %alternative,
                        error = %err,
                        "union alternative rejected"
                    );
                }
                Err(err) => return Err(err),
            }
        }
        Err(BindError::mismatch(context, value.kind(), schema).into())
    }

    fn single(
        &self,
        value: &Value,
        schema: &Schema,
        existing: Option<&Value>,
        context: &str,
    ) -> Result<Value> {
        match schema {
            Schema::Any => Ok(value.clone()),
            Schema::Union(_) => self.field(value, schema, existing, context),
            Schema::Scalar(scalar) => self.scalar(value, scalar, context),
            Schema::Record(handle) => {
                let Value::Table(table) = value else {
                    return Err(BindError::expected_shape(context, value.kind(), "table").into());
                };
                let schema = handle.schema()?;
                let existing = existing.and_then(Value::as_record);
                Ok(Value::Record(self.record(table, &schema, existing, context)?))
            }
            Schema::Mapping(element) => {
                let Value::Table(table) = value else {
                    return Err(BindError::expected_shape(context, value.kind(), "table").into());
                };
                let mut bound = Table::with_capacity(table.len());
                for (key, item) in table {
                    let item = self.field(item, element, None, &format!("{context}[\"{key}\"]"))?;
                    bound.insert(key.clone(), item);
                }
                Ok(Value::Table(bound))
            }
            Schema::Sequence(element) => {
                let Value::Array(items) = value else {
                    return Err(BindError::expected_shape(context, value.kind(), "array").into());
                };
                let items = items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        self.field(item, element, None, &format!("{context}[{index}]"))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Array(items))
            }
            Schema::Tuple(elements) => {
                let Value::Array(items) = value else {
                    return Err(BindError::expected_shape(context, value.kind(), "array").into());
                };
                if items.len() != elements.len() {
                    return Err(BindError::Arity {
                        context: context.to_owned(),
                        expected: elements.len(),
                        found: items.len(),
                    }
                    .into());
                }
                let items = items
                    .iter()
                    .zip(elements)
                    .enumerate()
                    .map(|(index, (item, element))| {
                        self.field(item, element, None, &format!("{context}[{index}]"))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Array(items))
            }
        }
    }

    fn scalar(&self, value: &Value, scalar: &Scalar, context: &str) -> Result<Value> {
        let mismatch = || BindError::mismatch(context, value.kind(), scalar).into();
        match (scalar, value) {
            (Scalar::String, Value::String(_))
            | (Scalar::Integer, Value::Integer(_))
            | (Scalar::Float, Value::Float(_))
            | (Scalar::Boolean, Value::Boolean(_))
            | (Scalar::Date, Value::Date(_))
            | (Scalar::Time, Value::Time(_))
            | (Scalar::DateTime, Value::DateTime(_) | Value::OffsetDateTime(_))
            | (Scalar::Duration, Value::Duration(_)) => Ok(value.clone()),

            (Scalar::Duration, Value::Time(time)) => {
                Ok(Value::Duration(duration::from_time_of_day(*time)))
            }
            (Scalar::Duration, _) => {
                Err(BindError::expected_shape(context, value.kind(), "time").into())
            }

            (Scalar::Path, Value::String(text)) => Ok(Value::Path(PathBuf::from(text))),
            (Scalar::Path, _) => Err(BindError::NotAString {
                context: context.to_owned(),
                what: "path",
                found: value.kind().to_owned(),
            }
            .into()),

            (Scalar::Module, _) => match self.reference(value, context)? {
                Object::Module(module) => Ok(Value::Module(module)),
                other => Err(BindError::expected_shape(context, other.kind(), "module").into()),
            },
            (Scalar::Class(bound), _) => match self.reference(value, context)? {
                Object::Class(class) => match bound {
                    ClassBound::Class(base) if !class.is_subclass_of(base) => {
                        Err(BindError::NotSubclass {
                            context: context.to_owned(),
                            class: class.name().to_owned(),
                            bound: base.name().to_owned(),
                        }
                        .into())
                    }
                    _ => Ok(Value::Class(class)),
                },
                other => Err(BindError::expected_shape(context, other.kind(), "class").into()),
            },

            (Scalar::Enum(def), Value::String(name)) if !def.is_integer() => {
                def.by_name(name).map(Value::Enum).ok_or_else(|| {
                    BindError::InvalidMember {
                        context: context.to_owned(),
                        enumeration: def.name().to_owned(),
                        members: def
                            .members()
                            .map(|member| member.name().to_lowercase())
                            .collect::<Vec<_>>()
                            .join(", "),
                    }
                    .into()
                })
            }
            (Scalar::Enum(def), Value::Integer(number)) => {
                def.by_value(*number).map(Value::Enum).ok_or_else(mismatch)
            }

            _ => Err(mismatch()),
        }
    }

    fn reference(&self, value: &Value, context: &str) -> Result<Object> {
        let Value::String(dotted) = value else {
            return Err(BindError::NotAString {
                context: context.to_owned(),
                what: "reference",
                found: value.kind().to_owned(),
            }
            .into());
        };
        Ok(self.registry.resolve(dotted, context)?)
    }
}
