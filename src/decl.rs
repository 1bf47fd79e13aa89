//! Record declarations: the reflection layer records describe themselves with.
//!
//! A record type implements [`Record`] and returns a [`RecordDef`] listing its
//! fields, their [`TypeDecl`]s, defaults and documentation. Declarations are raw
//! and may be malformed; [`crate::schema`] validates and normalizes them.
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{BindError, SchemaError};
use crate::schema::RecordSchema;
use crate::value::{ClassRef, EnumValue, RecordValue, ToValue, Value};

/// A host record type that can be bound from and rendered to TOML.
pub trait Record: Sized + 'static {
    fn definition() -> RecordDef;

    fn from_record(record: RecordValue) -> Result<Self, BindError>;

    fn to_record(&self) -> RecordValue;

    /// Name used as the root of error contexts.
    fn name() -> &'static str {
        short_type_name::<Self>()
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Identity of a record type. Cheap to copy; fetching the definition is deferred
/// so self-referential records can be declared.
#[derive(Clone, Copy)]
pub struct RecordHandle {
    id: TypeId,
    name: &'static str,
    define: fn() -> RecordDef,
}

impl RecordHandle {
    pub fn of<T: Record>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::name(),
            define: T::definition,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: Record>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    pub(crate) fn definition(&self) -> RecordDef {
        (self.define)()
    }

    /// Normalized schema, built on first use and cached process-wide.
    pub fn schema(&self) -> Result<Arc<RecordSchema>, SchemaError> {
        crate::schema::cache::schema_for(*self)
    }
}

impl PartialEq for RecordHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RecordHandle {}

impl Hash for RecordHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for RecordHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordHandle").field(&self.name).finish()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RECORD DEFINITIONS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Clone, Debug, Default)]
pub struct RecordDef {
    pub(crate) doc: Option<String>,
    pub(crate) base: Option<RecordHandle>,
    pub(crate) fields: Vec<FieldDef>,
}

impl RecordDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn doc(mut self, text: &str) -> Self {
        self.doc = clean_doc(text);
        self
    }

    /// Inherit the fields of `B`; they come first, redeclared fields keep their position.
    pub fn extends<B: Record>(mut self) -> Self {
        self.base = Some(RecordHandle::of::<B>());
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldDefault {
    /// Mandatory: no default.
    Required,
    /// Defaults to the absent value.
    Absent,
    Value(Value),
}

#[derive(Clone, Debug)]
pub struct FieldDef {
    pub(crate) name: String,
    pub(crate) decl: TypeDecl,
    pub(crate) default: FieldDefault,
    pub(crate) doc: Option<String>,
    pub(crate) init: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, decl: TypeDecl) -> Self {
        Self {
            name: name.into(),
            decl,
            default: FieldDefault::Required,
            doc: None,
            init: true,
        }
    }

    pub fn default(mut self, value: impl ToValue) -> Self {
        self.default = match value.to_value() {
            Some(value) => FieldDefault::Value(value),
            None => FieldDefault::Absent,
        };
        self
    }

    /// Default to absent.
    pub fn optional(mut self) -> Self {
        self.default = FieldDefault::Absent;
        self
    }

    pub fn doc(mut self, text: &str) -> Self {
        self.doc = clean_doc(text);
        self
    }

    /// Computed by the record itself: never bound and never rendered.
    pub fn derived(mut self) -> Self {
        self.init = false;
        self
    }
}

/// Dedent and trim documentation text; blank text means no doc.
fn clean_doc(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    let mut cleaned: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(index, line)| match index {
            0 => line.trim(),
            _ => line.get(indent..).map_or(line.trim(), str::trim_end),
        })
        .collect();
    while cleaned.first().is_some_and(|line| line.is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|line| line.is_empty()) {
        cleaned.pop();
    }
    (!cleaned.is_empty()).then(|| cleaned.join("\n"))
}

// ————————————————————————————————————————————————————————————————————————————
// TYPE DECLARATIONS
// ————————————————————————————————————————————————————————————————————————————

/// Generic container families a declaration can be parameterized over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    List,
    Sequence,
    Tuple,
    Dict,
    Mapping,
    Class,
    Other(String),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Origin::List => "list",
            Origin::Sequence => "sequence",
            Origin::Tuple => "tuple",
            Origin::Dict => "dict",
            Origin::Mapping => "mapping",
            Origin::Class => "class",
            Origin::Other(name) => name,
        };
        f.write_str(name)
    }
}

/// A raw field type declaration, as written by the record author.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeDecl {
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
    Any,
    /// The unit "no value" type; only meaningful inside a union.
    Absent,
    /// Marks a homogeneous variable-length tuple, `tuple[T, ...]`.
    Ellipsis,
    Union(Vec<TypeDecl>),
    Generic {
        origin: Origin,
        /// `None` for a bare generic without parameters.
        args: Option<Vec<TypeDecl>>,
    },
    /// A class object used as a type.
    Class(ClassRef),
    Record(RecordHandle),
    Enum(Arc<EnumDef>),
    /// A name that never resolved to a type.
    Unresolved(String),
}

impl TypeDecl {
    fn generic(origin: Origin, args: Vec<TypeDecl>) -> Self {
        TypeDecl::Generic { origin, args: Some(args) }
    }

    pub fn list(element: TypeDecl) -> Self {
        Self::generic(Origin::List, vec![element])
    }

    pub fn sequence(element: TypeDecl) -> Self {
        Self::generic(Origin::Sequence, vec![element])
    }

    pub fn tuple(elements: impl IntoIterator<Item = TypeDecl>) -> Self {
        Self::generic(Origin::Tuple, elements.into_iter().collect())
    }

    /// `tuple[T, ...]`
    pub fn tuple_of(element: TypeDecl) -> Self {
        Self::generic(Origin::Tuple, vec![element, TypeDecl::Ellipsis])
    }

    pub fn dict(key: TypeDecl, value: TypeDecl) -> Self {
        Self::generic(Origin::Dict, vec![key, value])
    }

    pub fn mapping(key: TypeDecl, value: TypeDecl) -> Self {
        Self::generic(Origin::Mapping, vec![key, value])
    }

    /// `T | absent`
    pub fn optional(inner: TypeDecl) -> Self {
        TypeDecl::Union(vec![inner, TypeDecl::Absent])
    }

    pub fn union(alternatives: impl IntoIterator<Item = TypeDecl>) -> Self {
        TypeDecl::Union(alternatives.into_iter().collect())
    }

    /// `class[bound]`
    pub fn class_of(bound: TypeDecl) -> Self {
        Self::generic(Origin::Class, vec![bound])
    }

    /// Unparameterized `class`, accepting any class.
    pub fn class() -> Self {
        TypeDecl::Generic { origin: Origin::Class, args: None }
    }

    pub fn record<T: Record>() -> Self {
        TypeDecl::Record(RecordHandle::of::<T>())
    }

    pub fn enumeration(def: EnumDef) -> Self {
        TypeDecl::Enum(Arc::new(def))
    }

    /// Whether the declaration admits the absent value.
    pub fn admits_absent(&self) -> bool {
        match self {
            TypeDecl::Absent => true,
            TypeDecl::Union(alternatives) => alternatives.iter().any(TypeDecl::admits_absent),
            _ => false,
        }
    }
}

impl fmt::Display for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDecl::String => f.write_str("string"),
            TypeDecl::Integer => f.write_str("integer"),
            TypeDecl::Float => f.write_str("float"),
            TypeDecl::Boolean => f.write_str("boolean"),
            TypeDecl::Date => f.write_str("date"),
            TypeDecl::Time => f.write_str("time"),
            TypeDecl::DateTime => f.write_str("datetime"),
            TypeDecl::Duration => f.write_str("duration"),
            TypeDecl::Path => f.write_str("path"),
            TypeDecl::Module => f.write_str("module"),
            TypeDecl::Any => f.write_str("any"),
            TypeDecl::Absent => f.write_str("absent"),
            TypeDecl::Ellipsis => f.write_str("..."),
            TypeDecl::Union(alternatives) => {
                for (index, alternative) in alternatives.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{alternative}")?;
                }
                Ok(())
            }
            TypeDecl::Generic { origin, args: None } => write!(f, "{origin}"),
            TypeDecl::Generic { origin, args: Some(args) } => {
                write!(f, "{origin}[")?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str("]")
            }
            TypeDecl::Class(class) => f.write_str(&class.full_name()),
            TypeDecl::Record(handle) => f.write_str(handle.name()),
            TypeDecl::Enum(def) => f.write_str(def.name()),
            TypeDecl::Unresolved(name) => f.write_str(name),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// ENUMERATIONS
// ————————————————————————————————————————————————————————————————————————————

/// A closed set of named members, optionally integer-valued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumDef {
    name: Arc<str>,
    members: Vec<(Arc<str>, Option<i64>)>,
}

impl EnumDef {
    /// Members rendered and matched by name.
    pub fn named<'a>(name: &str, members: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            name: name.into(),
            members: members.into_iter().map(|member| (member.into(), None)).collect(),
        }
    }

    /// Members rendered and matched by integer value.
    pub fn integer<'a>(name: &str, members: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
        Self {
            name: name.into(),
            members: members
                .into_iter()
                .map(|(member, value)| (member.into(), Some(value)))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_integer(&self) -> bool {
        self.members.iter().any(|(_, value)| value.is_some())
    }

    pub fn members(&self) -> impl Iterator<Item = EnumValue> + '_ {
        self.members
            .iter()
            .map(|(member, value)| EnumValue::new(self.name.clone(), member.clone(), *value))
    }

    /// Case-insensitive lookup by member name.
    pub fn by_name(&self, name: &str) -> Option<EnumValue> {
        self.members().find(|member| member.name().eq_ignore_ascii_case(name))
    }

    pub fn by_value(&self, value: i64) -> Option<EnumValue> {
        self.members().find(|member| member.value() == Some(value))
    }
}
