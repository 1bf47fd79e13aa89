//! Bind TOML documents to typed records, and render records back to TOML.
//!
//! Records describe themselves through [`Record`]; a [`Binder`] normalizes that
//! description into a cached [`Schema`](schema::Schema), binds decoded documents
//! against it and renders documented templates.
pub mod bind;
pub mod binder;
pub mod decl;
pub mod document;
pub mod error;
pub mod example;
pub mod format;
pub mod resolve;
pub mod schema;
pub mod template;
pub mod value;

pub use binder::Binder;
pub use decl::{EnumDef, FieldDef, FieldDefault, Origin, Record, RecordDef, RecordHandle, TypeDecl};
pub use error::{BindError, Error, FormatError, KeyError, ReferenceError, Result, SchemaError};
pub use format::{format_toml_pair, to_pair};
pub use resolve::{Object, Registry};
pub use template::{Style, TemplateLines};
pub use value::{ClassRef, EnumValue, FromValue, ModuleRef, RecordValue, Table, ToValue, Value};
