//! Process-wide catalog of datatypes and record-type bindings.
//!
//! The registry owns two tables: datatype tag → codec constructor (seeded
//! with the seven built-ins), and record type → attribute source. It also
//! carries the three lifecycle hooks the host persistence layer calls:
//! initialize, before-save, after-save. Registration and binding are
//! startup-time mutations; once stabilized the registry serves any number
//! of concurrent readers.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::attributes::{variants, Attribute, AttributeCodec};
use crate::core::{EavError, Result};
use crate::entity::Entity;
use crate::storage::{AttributeSource, DocumentStore, EavRecord};

pub type CodecFactory = fn() -> Box<dyn AttributeCodec>;

/// Constructor for the entity store, overridable per binding.
pub type EntityFactory = fn(&dyn EavRecord, Vec<Attribute>) -> Entity;

struct CodecEntry {
    tag: &'static str,
    title: &'static str,
    factory: CodecFactory,
}

/// Association of one record type with its attribute source.
pub struct Binding {
    source: Arc<dyn AttributeSource>,
    entity_factory: EntityFactory,
}

impl Binding {
    pub fn source(&self) -> &Arc<dyn AttributeSource> {
        &self.source
    }
}

pub struct Registry {
    codecs: Vec<CodecEntry>,
    bindings: HashMap<String, Binding>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl Registry {
    /// An empty registry with no datatypes. Most callers want
    /// [`with_builtins`](Self::with_builtins).
    pub fn new() -> Self {
        Self {
            codecs: Vec::new(),
            bindings: HashMap::new(),
        }
    }

    /// Registry seeded with the seven built-in datatypes.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_datatype(|| Box::new(variants::StringCodec));
        registry.register_datatype(|| Box::new(variants::TextCodec));
        registry.register_datatype(|| Box::new(variants::IntegerCodec));
        registry.register_datatype(|| Box::new(variants::FloatCodec));
        registry.register_datatype(|| Box::new(variants::BooleanCodec));
        registry.register_datatype(|| Box::new(variants::DateCodec));
        registry.register_datatype(|| Box::new(variants::DateTimeCodec));
        registry
    }

    // ------------------------------------------------------------------
    // Datatype catalog
    // ------------------------------------------------------------------

    /// Add a datatype to the catalog. Registering a tag again replaces the
    /// previous constructor in place.
    pub fn register_datatype(&mut self, factory: CodecFactory) {
        let probe = factory();
        let tag = probe.datatype();
        let title = probe.datatype_title();
        debug!("registered datatype '{}'", tag);

        if let Some(entry) = self.codecs.iter_mut().find(|e| e.tag == tag) {
            entry.title = title;
            entry.factory = factory;
        } else {
            self.codecs.push(CodecEntry { tag, title, factory });
        }
    }

    /// Remove a datatype. Definitions still naming it will resolve through
    /// the string fallback from then on.
    pub fn unregister_datatype(&mut self, tag: &str) -> bool {
        let before = self.codecs.len();
        self.codecs.retain(|e| e.tag != tag);
        before != self.codecs.len()
    }

    pub fn codec_factory(&self, tag: &str) -> Option<CodecFactory> {
        self.codecs.iter().find(|e| e.tag == tag).map(|e| e.factory)
    }

    /// `(tag, title)` pairs in registration order: the allowed-datatype
    /// enumeration for definition editing and validation.
    pub fn datatype_choices(&self) -> Vec<(&'static str, &'static str)> {
        self.codecs.iter().map(|e| (e.tag, e.title)).collect()
    }

    // ------------------------------------------------------------------
    // Record-type bindings
    // ------------------------------------------------------------------

    /// Bind a record type to its attribute source. Idempotent: binding an
    /// already-bound type is a no-op and returns false.
    pub fn bind(&mut self, record_type: &str, source: Arc<dyn AttributeSource>) -> bool {
        self.bind_with(record_type, source, Entity::new)
    }

    /// Bind with a custom entity store constructor.
    pub fn bind_with(
        &mut self,
        record_type: &str,
        source: Arc<dyn AttributeSource>,
        entity_factory: EntityFactory,
    ) -> bool {
        if self.bindings.contains_key(record_type) {
            return false;
        }
        debug!("bound record type '{}'", record_type);
        self.bindings.insert(
            record_type.to_string(),
            Binding {
                source,
                entity_factory,
            },
        );
        true
    }

    /// Detach a record type. No-op (returns false) if it was not bound.
    pub fn unbind(&mut self, record_type: &str) -> bool {
        let removed = self.bindings.remove(record_type).is_some();
        if removed {
            debug!("unbound record type '{}'", record_type);
        }
        removed
    }

    /// Detach everything; the teardown counterpart of startup binding.
    pub fn unbind_all(&mut self) {
        self.bindings.clear();
    }

    pub fn is_bound(&self, record_type: &str) -> bool {
        self.bindings.contains_key(record_type)
    }

    pub fn binding(&self, record_type: &str) -> Option<&Binding> {
        self.bindings.get(record_type)
    }

    /// Resolve the ordered, slug-unique attribute set applicable to a
    /// record: the binding's definitions for the record's scope, each
    /// resolved through the datatype catalog. On a duplicate slug the
    /// first definition in sort order wins.
    pub fn resolve_attributes(&self, record: &dyn EavRecord) -> Result<Vec<Attribute>> {
        let binding = self.require_binding(record.record_type())?;

        let mut attributes: Vec<Attribute> = Vec::new();
        for definition in binding.source.definitions(record.scope()) {
            if attributes.iter().any(|a| a.slug() == definition.slug) {
                continue;
            }
            attributes.push(definition.resolve(self));
        }
        Ok(attributes)
    }

    // ------------------------------------------------------------------
    // Lifecycle hooks (the full contract with the host persistence layer)
    // ------------------------------------------------------------------

    /// On-initialize hook: build a fresh entity store for a record
    /// instance. The host attaches the result to the record and calls the
    /// other two hooks with it.
    pub fn initialize(&self, record: &dyn EavRecord) -> Result<Entity> {
        let binding = self.require_binding(record.record_type())?;
        let attributes = self.resolve_attributes(record)?;
        Ok((binding.entity_factory)(record, attributes))
    }

    /// Before-save hook: full validation. A failure here must abort the
    /// host's save.
    pub fn before_save(&self, entity: &Entity) -> Result<()> {
        entity.validate_all()
    }

    /// After-save hook: re-encode and persist the document.
    pub fn after_save(
        &self,
        entity: &mut Entity,
        record: &mut dyn EavRecord,
        store: &dyn DocumentStore,
    ) -> Result<()> {
        entity.persist(record, store)
    }

    fn require_binding(&self, record_type: &str) -> Result<&Binding> {
        self.bindings.get(record_type).ok_or_else(|| {
            EavError::Configuration(format!("Record type '{}' is not bound", record_type))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::AttributeDefinition;
    use crate::storage::{MemoryDefinitions, MemoryRecord};

    #[test]
    fn test_builtin_catalog() {
        let registry = Registry::with_builtins();
        let tags: Vec<&str> = registry
            .datatype_choices()
            .iter()
            .map(|(tag, _)| *tag)
            .collect();
        assert_eq!(
            tags,
            vec!["string", "text", "int", "float", "bool", "date", "datetime"]
        );
    }

    #[test]
    fn test_unregister_updates_choices() {
        let mut registry = Registry::with_builtins();
        assert!(registry.unregister_datatype("float"));
        assert!(!registry.unregister_datatype("float"));
        assert!(registry.codec_factory("float").is_none());
        assert_eq!(registry.datatype_choices().len(), 6);
    }

    #[test]
    fn test_bind_is_idempotent() {
        let mut registry = Registry::with_builtins();
        let source = Arc::new(MemoryDefinitions::new());
        assert!(registry.bind("product", source.clone()));
        assert!(!registry.bind("product", source));
        assert!(registry.is_bound("product"));

        assert!(registry.unbind("product"));
        assert!(!registry.unbind("product"));
        assert!(!registry.is_bound("product"));
    }

    #[test]
    fn test_resolve_attributes_dedups_slugs() {
        let mut registry = Registry::with_builtins();
        let mut first = AttributeDefinition::new("color", "string");
        first.id = 2;
        first.weight = 900;
        let mut shadowed = AttributeDefinition::new("color", "int");
        shadowed.id = 1;
        shadowed.weight = 100;
        let source = MemoryDefinitions::new().with(first).with(shadowed);
        registry.bind("product", Arc::new(source));

        let record = MemoryRecord::new("product", "1");
        let attributes = registry.resolve_attributes(&record).unwrap();
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes[0].datatype(), "string");
    }

    #[test]
    fn test_initialize_requires_binding() {
        let registry = Registry::with_builtins();
        let record = MemoryRecord::new("unbound", "1");
        assert!(matches!(
            registry.initialize(&record),
            Err(EavError::Configuration(_))
        ));
    }
}
