// ============================================================================
// eavstore Library
// ============================================================================
//
// Entity-Attribute-Value layer for fixed-schema records. Attributes are
// defined as data (datatype, constraints, choices, multiplicity), resolved
// into typed codecs through a process-wide registry, and their values are
// serialized into a single JSON document field on the host record. The
// host persistence layer drives everything through three lifecycle hooks:
// initialize, before-save (validate), after-save (persist).

pub mod attributes;
pub mod core;
pub mod definition;
pub mod entity;
pub mod forms;
pub mod registry;
pub mod storage;

// Re-export main types for convenience
pub use attributes::{Attribute, AttributeCodec, ChoiceOption, ValueError};
pub use core::{EavError, Result, ValidationReport, Value};
pub use definition::{AttributeDefinition, Choice};
pub use entity::Entity;
pub use forms::{FormField, WidgetKind};
pub use registry::Registry;
pub use storage::{
    AttributeSource, DocumentStore, EavRecord, MemoryDefinitions, MemoryDocumentStore,
    MemoryRecord,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_basic_lifecycle() {
        let mut registry = Registry::with_builtins();
        let source = MemoryDefinitions::new().with(AttributeDefinition::new("color", "string"));
        registry.bind("product", Arc::new(source));

        let mut record = MemoryRecord::new("product", "1");
        let mut entity = registry.initialize(&record).unwrap();

        entity.set("color", Value::Text("red".into())).unwrap();
        registry.before_save(&entity).unwrap();

        let store = MemoryDocumentStore::new();
        registry.after_save(&mut entity, &mut record, &store).unwrap();

        assert_eq!(
            store.document("product", "1").as_deref(),
            Some(r#"{"color":"red"}"#)
        );
    }
}
