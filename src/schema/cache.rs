//! Process-wide record schema cache, keyed by record type.
//!
//! Entries are immutable once inserted. Concurrent first uses may both build a
//! schema; the first insert wins and both callers get the same `Arc`.
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

use super::RecordSchema;
use super::normalize::Normalizer;
use crate::decl::RecordHandle;
use crate::error::SchemaError;

static SCHEMAS: Lazy<RwLock<HashMap<TypeId, Arc<RecordSchema>>>> = Lazy::new(Default::default);

pub(crate) fn lookup(id: TypeId) -> Option<Arc<RecordSchema>> {
    SCHEMAS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
        .cloned()
}

pub(crate) fn insert(schema: Arc<RecordSchema>) -> Arc<RecordSchema> {
    let mut schemas = SCHEMAS.write().unwrap_or_else(PoisonError::into_inner);
    schemas.entry(schema.handle.id()).or_insert(schema).clone()
}

/// Cached schema for `handle`, normalizing its declarations on first use.
pub fn schema_for(handle: RecordHandle) -> Result<Arc<RecordSchema>, SchemaError> {
    if let Some(schema) = lookup(handle.id()) {
        tracing::trace!(record = handle.name(), "schema cache hit");
        return Ok(schema);
    }
    tracing::debug!(record = handle.name(), "building record schema");
    Normalizer::default().record(handle)
}
