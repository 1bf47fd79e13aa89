//! [`Binder`]: the typed entry point tying schema, binding and rendering together.
use std::io::Read;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use crate::bind;
use crate::decl::{Record, RecordHandle};
use crate::document;
use crate::error::{Result, SchemaError};
use crate::resolve::Registry;
use crate::schema::RecordSchema;
use crate::template::{self, Style, TemplateLines};
use crate::value::{RecordValue, Table};

/// Binds TOML documents to `T` and renders `T` back to TOML.
///
/// A binder created with [`Binder::from_instance`] merges documents onto that
/// instance instead of building fresh values, and renders templates pre-filled
/// with its values.
pub struct Binder<T: Record> {
    schema: Arc<RecordSchema>,
    registry: Arc<Registry>,
    instance: Option<RecordValue>,
    marker: PhantomData<fn() -> T>,
}

impl<T: Record> Clone for Binder<T> {
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            registry: self.registry.clone(),
            instance: self.instance.clone(),
            marker: PhantomData,
        }
    }
}

impl<T: Record> Binder<T> {
    pub fn new() -> Result<Self, SchemaError> {
        Ok(Self {
            schema: RecordHandle::of::<T>().schema()?,
            registry: Arc::new(Registry::new()),
            instance: None,
            marker: PhantomData,
        })
    }

    pub fn from_instance(instance: &T) -> Result<Self, SchemaError> {
        let mut binder = Self::new()?;
        binder.instance = Some(instance.to_record());
        Ok(binder)
    }

    /// Registry used to resolve module and class references.
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    pub fn bind(&self, document: &Table) -> Result<T> {
        let record = self.bind_record(document)?;
        Ok(T::from_record(record)?)
    }

    /// Like [`Binder::bind`], stopping at the untyped record.
    pub fn bind_record(&self, document: &Table) -> Result<RecordValue> {
        tracing::debug!(
            record = self.schema.name(),
            keys = document.len(),
            merge = self.instance.is_some(),
            "binding document"
        );
        bind::bind(document, &self.schema, self.instance.as_ref(), &self.registry)
    }

    pub fn parse_str(&self, text: &str) -> Result<T> {
        self.bind(&document::parse_str(text)?)
    }

    pub fn parse_reader(&self, reader: impl Read) -> Result<T> {
        self.bind(&document::parse_reader(reader)?)
    }

    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<T> {
        self.bind(&document::parse_file(path)?)
    }

    /// Documented template; pre-filled when created from an instance.
    pub fn format_toml_template(&self) -> TemplateLines {
        template::generate(self.schema.clone(), self.instance.clone(), Style::Template)
    }

    /// Only the populated, non-default values of the instance.
    pub fn format_toml(&self) -> TemplateLines {
        template::generate(self.schema.clone(), self.instance.clone(), Style::Plain)
    }
}
