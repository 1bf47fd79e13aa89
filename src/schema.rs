//! Normalized schema: the canonical, validated form of record declarations.
//!
//! Binding, formatting and template generation all dispatch on [`Schema`]; raw
//! [`crate::decl::TypeDecl`]s never leave [`normalize`].
pub mod cache;
pub mod normalize;

use std::fmt;
use std::sync::Arc;

use crate::decl::{EnumDef, FieldDefault, RecordHandle};
use crate::value::ClassRef;

pub use normalize::normalize;

#[derive(Clone, Debug, PartialEq)]
pub enum Schema {
    Scalar(Scalar),
    /// Flattened, deduplicated, at least two alternatives, tried in order.
    Union(Vec<Schema>),
    /// Homogeneous variable-length array.
    Sequence(Box<Schema>),
    /// Fixed-length heterogeneous array.
    Tuple(Vec<Schema>),
    /// String-keyed table.
    Mapping(Box<Schema>),
    Record(RecordHandle),
    /// Accepts any decoded value unmodified.
    Any,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Time,
    DateTime,
    Duration,
    Path,
    Module,
    Class(ClassBound),
    Enum(Arc<EnumDef>),
}

/// Upper bound for class references.
#[derive(Clone, Debug, PartialEq)]
pub enum ClassBound {
    Any,
    Class(ClassRef),
}

impl Schema {
    /// Union of `alternatives`, flattening nested unions and collapsing a single member.
    pub(crate) fn union_of(alternatives: Vec<Schema>) -> Schema {
        let mut members: Vec<Schema> = Vec::with_capacity(alternatives.len());
        for alternative in alternatives {
            let nested = match alternative {
                Schema::Union(nested) => nested,
                other => vec![other],
            };
            for member in nested {
                if !members.contains(&member) {
                    members.push(member);
                }
            }
        }
        if members.len() == 1 {
            members.pop().unwrap_or(Schema::Any)
        } else {
            Schema::Union(members)
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String => f.write_str("string"),
            Scalar::Integer => f.write_str("integer"),
            Scalar::Float => f.write_str("float"),
            Scalar::Boolean => f.write_str("boolean"),
            Scalar::Date => f.write_str("date"),
            Scalar::Time => f.write_str("time"),
            Scalar::DateTime => f.write_str("datetime"),
            Scalar::Duration => f.write_str("duration"),
            Scalar::Path => f.write_str("path"),
            Scalar::Module => f.write_str("module"),
            Scalar::Class(ClassBound::Any) => f.write_str("class"),
            Scalar::Class(ClassBound::Class(base)) => write!(f, "class[{}]", base.full_name()),
            Scalar::Enum(def) => f.write_str(def.name()),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Scalar(scalar) => write!(f, "{scalar}"),
            Schema::Union(members) => {
                for (index, member) in members.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            Schema::Sequence(element) => write!(f, "array[{element}]"),
            Schema::Tuple(elements) => {
                f.write_str("tuple[")?;
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str("]")
            }
            Schema::Mapping(value) => write!(f, "table[string, {value}]"),
            Schema::Record(handle) => f.write_str(handle.name()),
            Schema::Any => f.write_str("any"),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RECORD SCHEMAS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Clone, Debug)]
pub struct FieldSchema {
    pub name: String,
    pub schema: Schema,
    pub default: FieldDefault,
    pub doc: Option<String>,
    /// False for derived fields, which are neither bound nor rendered.
    pub included: bool,
    /// Declared as admitting the absent value.
    pub optional: bool,
}

impl FieldSchema {
    pub fn has_default(&self) -> bool {
        !matches!(self.default, FieldDefault::Required)
    }
}

#[derive(Clone, Debug)]
pub struct RecordSchema {
    pub handle: RecordHandle,
    pub doc: Option<String>,
    /// Base fields first, in declaration order.
    pub fields: Vec<FieldSchema>,
}

impl RecordSchema {
    pub fn name(&self) -> &'static str {
        self.handle.name()
    }

    /// Included field by exact name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.included_fields().find(|field| field.name == name)
    }

    pub fn included_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|field| field.included)
    }
}
