//! Error taxonomy for schema building, name resolution, binding and formatting.
//!
//! Every error is local to a single normalize/bind/format call and carries the
//! dotted context path of the offending field (for example `Config.server.port`).
use std::path::PathBuf;

use thiserror::Error;

/// Raised while normalizing a record's declarations into a [`crate::schema::Schema`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Annotation for field '{context}' is not a type")]
    NotAType { context: String },

    #[error("Field '{context}' needs type argument(s)")]
    MissingTypeArguments { context: String },

    #[error("Mapping '{context}' must have two type arguments")]
    MappingArity { context: String },

    #[error("Mapping '{context}' has key type '{key}', expected 'string'")]
    MappingKey { context: String, key: String },

    #[error("Sequence '{context}' must have exactly one type argument")]
    SequenceArity { context: String },

    #[error("class[...] annotation for '{context}' must have exactly one type argument")]
    ClassArity { context: String },

    #[error("class[...] annotation for '{context}' must have a type as its argument")]
    ClassArgument { context: String },

    #[error("Field '{context}' has unsupported generic type '{origin}'")]
    UnsupportedGeneric { context: String, origin: String },

    #[error("Field '{context}' has unsupported type '{name}'")]
    UnsupportedType { context: String, name: String },

    #[error("Default for optional field '{context}' is not absent")]
    OptionalDefault { context: String },

    #[error("Union for field '{context}' has no alternatives besides absent")]
    EmptyUnion { context: String },
}

/// A dotted name did not resolve to an object in the [`crate::resolve::Registry`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReferenceError {
    #[error("Object for '{context}' not found: no top-level module named '{module}'")]
    NoModule { context: String, module: String },

    #[error("Object for '{context}' not found: name '{name}' does not exist in '{parent}'")]
    NoMember {
        context: String,
        name: String,
        parent: String,
    },
}

/// The shape of a decoded value does not match what the schema expects.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    /// `expected` is rendered verbatim; plain type names are quoted by the constructor.
    #[error("Value for '{context}' has type '{found}', expected {expected}")]
    TypeMismatch {
        context: String,
        found: String,
        expected: String,
    },

    #[error("Expected TOML string for {what} '{context}', got '{found}'")]
    NotAString {
        context: String,
        what: &'static str,
        found: String,
    },

    #[error("Resolved '{context}' to class '{class}', expected subclass of '{bound}'")]
    NotSubclass {
        context: String,
        class: String,
        bound: String,
    },

    #[error("Expected {expected} elements for '{context}', got {found}")]
    Arity {
        context: String,
        expected: usize,
        found: usize,
    },

    #[error("Value for '{context}' with suffix '{suffix}' has type '{found}', expected number")]
    SuffixedValue {
        context: String,
        suffix: String,
        found: String,
    },

    #[error("Value for '{context}' is not a member of '{enumeration}', expected one of: {members}")]
    InvalidMember {
        context: String,
        enumeration: String,
        members: String,
    },

    #[error("Missing value for mandatory field '{context}'")]
    Missing { context: String },

    #[error("Value for '{context}' is out of range for {target}")]
    OutOfRange { context: String, target: &'static str },

    #[error("Duration for '{context}' does not fit in the supported range")]
    Duration { context: String },
}

impl BindError {
    /// Mismatch against a named type; the expectation is quoted.
    pub fn mismatch(
        context: &str,
        found: impl Into<String>,
        expected: impl std::fmt::Display,
    ) -> Self {
        BindError::TypeMismatch {
            context: context.to_owned(),
            found: found.into(),
            expected: format!("'{expected}'"),
        }
    }

    /// Mismatch against a shape word such as `table`, `array` or `time`.
    pub fn expected_shape(context: &str, found: impl Into<String>, shape: &str) -> Self {
        BindError::TypeMismatch {
            context: context.to_owned(),
            found: found.into(),
            expected: shape.to_owned(),
        }
    }
}

/// A TOML key does not map onto a declared field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KeyError {
    #[error("Underscore found in TOML key '{key}'")]
    Underscore { key: String },

    #[error("Field '{context}' does not exist")]
    UnknownField { context: String },

    #[error("Field '{context}' has type '{schema}', which does not support suffix '{suffix}'")]
    UnsupportedSuffix {
        context: String,
        schema: String,
        suffix: String,
    },
}

/// A value has no TOML projection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("Value {value} in array cannot be expressed without key suffix")]
    SuffixInArray { value: String },

    #[error("Value of type '{kind}' cannot be expressed in TOML: {reason}")]
    Unrepresentable { kind: String, reason: &'static str },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("failed to read '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read TOML stream")]
    Read(#[source] std::io::Error),

    #[error("failed to decode TOML: {0}")]
    Decode(#[from] toml::de::Error),

    #[error("unsupported TOML date-time '{0}'")]
    Datetime(String),
}

impl Error {
    /// True for shape mismatches, the only failures a union alternative may swallow.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Error::Bind(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
