//! Boundary contracts with the host persistence layer.
//!
//! The core needs exactly three things from its host: a text field on the
//! record for the serialized document, a way to query attribute
//! definitions for a scope, and a targeted single-field write for the
//! document at persist time. Everything else (transactions, migrations,
//! the admin UI) stays on the host's side of these traits.
//!
//! In-memory implementations are provided for tests and for hosts that
//! keep definitions in code rather than a database.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::core::{EavError, Result};
use crate::definition::{sort_definitions, AttributeDefinition};

/// The host record the entity store is attached to.
///
/// `document()` returning `None` is treated as an empty document on first
/// decode; a record that has never carried attribute values needs no
/// special casing by the host.
pub trait EavRecord {
    /// Record type tag, matching the tag used at `Registry::bind`.
    fn record_type(&self) -> &str;

    /// Opaque record identity, used only to address the targeted write.
    fn record_id(&self) -> &str;

    /// Partitioning key the applicable definitions are queried under.
    fn scope(&self) -> &str;

    /// Current content of the serialization field.
    fn document(&self) -> Option<&str>;

    /// Refresh the in-memory serialization field after a persist.
    fn set_document(&mut self, document: String);
}

/// Supplier of the attribute definitions applicable to a record.
///
/// The default behavior is "every definition in the record's scope"; a
/// host wanting more selective applicability binds a custom source.
pub trait AttributeSource: Send + Sync {
    /// Definitions for the scope, already in presentation order.
    fn definitions(&self, scope: &str) -> Vec<AttributeDefinition>;
}

/// Targeted single-field update of the stored document.
///
/// Deliberately not a full record save: persist must not re-trigger the
/// host's lifecycle hooks or clobber concurrent changes to unrelated
/// fields.
pub trait DocumentStore {
    fn write_document(&self, record_type: &str, record_id: &str, document: &str) -> Result<()>;
}

/// Definition source backed by a plain list.
#[derive(Debug, Default)]
pub struct MemoryDefinitions {
    definitions: Vec<AttributeDefinition>,
}

impl MemoryDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, definition: AttributeDefinition) {
        self.definitions.push(definition);
    }

    pub fn with(mut self, definition: AttributeDefinition) -> Self {
        self.insert(definition);
        self
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl AttributeSource for MemoryDefinitions {
    fn definitions(&self, scope: &str) -> Vec<AttributeDefinition> {
        let mut matching: Vec<AttributeDefinition> = self
            .definitions
            .iter()
            .filter(|d| d.scope == scope)
            .cloned()
            .collect();
        sort_definitions(&mut matching);
        matching
    }
}

/// Document store backed by a map, keyed by `(record_type, record_id)`.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<(String, String), String>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self, record_type: &str, record_id: &str) -> Option<String> {
        self.documents
            .lock()
            .ok()?
            .get(&(record_type.to_string(), record_id.to_string()))
            .cloned()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn write_document(&self, record_type: &str, record_id: &str, document: &str) -> Result<()> {
        let mut documents = self
            .documents
            .lock()
            .map_err(|e| EavError::Storage(e.to_string()))?;
        documents.insert(
            (record_type.to_string(), record_id.to_string()),
            document.to_string(),
        );
        Ok(())
    }
}

/// Minimal `EavRecord` implementation for tests and database-less hosts.
#[derive(Debug, Clone)]
pub struct MemoryRecord {
    record_type: String,
    record_id: String,
    scope: String,
    document: Option<String>,
}

impl MemoryRecord {
    pub fn new(record_type: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            record_id: record_id.into(),
            scope: String::new(),
            document: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }
}

impl EavRecord for MemoryRecord {
    fn record_type(&self) -> &str {
        &self.record_type
    }

    fn record_id(&self) -> &str {
        &self.record_id
    }

    fn scope(&self) -> &str {
        &self.scope
    }

    fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    fn set_document(&mut self, document: String) {
        self.document = Some(document);
    }
}
