//! Per-record entity store.
//!
//! An [`Entity`] wraps one host record and presents typed, validated
//! access to its dynamic attributes. The stored document is decoded once,
//! lazily, and cached for the life of the instance; writes touch only the
//! cache until `persist` runs at the after-save hook.

use std::cell::RefCell;
use std::collections::HashMap;

use log::{debug, warn};
use serde_json::{Map, Value as JsonValue};

use crate::attributes::Attribute;
use crate::core::{EavError, Result, ValidationReport, Value};
use crate::storage::{DocumentStore, EavRecord};

type Document = Map<String, JsonValue>;

pub struct Entity {
    record_type: String,
    record_id: String,
    /// Resolved attribute set, ordered and slug-unique.
    attributes: Vec<Attribute>,
    /// Raw stored document. Keys without a current definition are kept
    /// verbatim so a persist never discards data written under an older
    /// schema.
    stored: Document,
    cache: RefCell<Option<HashMap<String, Value>>>,
}

impl Entity {
    /// Build the store for a record at the initialize hook.
    ///
    /// A missing, empty, or unparseable stored document is treated as
    /// empty: reads must survive whatever is in the blob field.
    pub fn new(record: &dyn EavRecord, attributes: Vec<Attribute>) -> Self {
        let stored = match record.document() {
            None => Document::new(),
            Some(text) if text.trim().is_empty() => Document::new(),
            Some(text) => match serde_json::from_str::<JsonValue>(text) {
                Ok(JsonValue::Object(map)) => map,
                Ok(_) | Err(_) => {
                    warn!(
                        "unreadable document on {} '{}', treating as empty",
                        record.record_type(),
                        record.record_id()
                    );
                    Document::new()
                }
            },
        };

        Self {
            record_type: record.record_type().to_string(),
            record_id: record.record_id().to_string(),
            attributes,
            stored,
            cache: RefCell::new(None),
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, slug: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.slug() == slug)
    }

    /// Current decoded value for `slug`.
    ///
    /// A present attribute whose stored value is null (or absent) yields
    /// `Value::Null`; only a slug outside the resolved set is an error.
    pub fn get(&self, slug: &str) -> Result<Value> {
        if self.attribute(slug).is_none() {
            return Err(EavError::UnknownAttribute(slug.to_string()));
        }
        Ok(self.with_cache(|cache| cache.get(slug).cloned().unwrap_or(Value::Null)))
    }

    /// Assign a value.
    ///
    /// A non-null value is validated immediately against the attribute's
    /// composed codec. Null always assigns: blankness is only checked
    /// against `required` during `validate_all`, not per assignment.
    pub fn set(&mut self, slug: &str, value: Value) -> Result<()> {
        let Some(attribute) = self.attribute(slug) else {
            return Err(EavError::UnknownAttribute(slug.to_string()));
        };

        if !value.is_null() {
            attribute
                .validate(&value)
                .map_err(|e| EavError::validation(slug, e.to_string()))?;
        }

        let slug = slug.to_string();
        self.with_cache(|cache| {
            cache.insert(slug, value);
        });
        Ok(())
    }

    /// `(slug, decoded value)` pairs in attribute order. Restartable;
    /// reflects the current cached state.
    pub fn iter(&self) -> impl Iterator<Item = (String, Value)> + '_ {
        let pairs: Vec<(String, Value)> = self.with_cache(|cache| {
            self.attributes
                .iter()
                .map(|a| {
                    (
                        a.slug().to_string(),
                        cache.get(a.slug()).cloned().unwrap_or(Value::Null),
                    )
                })
                .collect()
        });
        pairs.into_iter()
    }

    /// Full validation pass, run by the before-save hook.
    ///
    /// Every applicable attribute is checked; all failures are collected
    /// into one report so the caller can surface each offending slug.
    pub fn validate_all(&self) -> Result<()> {
        let mut report = ValidationReport::new();

        self.with_cache(|cache| {
            for attribute in &self.attributes {
                let value = cache.get(attribute.slug()).cloned().unwrap_or(Value::Null);
                if value.is_null() {
                    if attribute.required() {
                        report.add(attribute.slug(), "cannot be blank");
                    }
                } else if let Err(e) = attribute.validate(&value) {
                    report.add(attribute.slug(), e.to_string());
                }
            }
        });

        report.into_result()
    }

    /// Re-encode and write the document, run by the after-save hook.
    ///
    /// Encoded values are merged over a copy of the stored document, so
    /// keys from definitions that no longer apply survive the write. The
    /// write itself is a targeted single-field update; the record's
    /// in-memory field is refreshed afterwards.
    pub fn persist(&mut self, record: &mut dyn EavRecord, store: &dyn DocumentStore) -> Result<()> {
        let mut document = self.stored.clone();

        self.with_cache(|cache| {
            for attribute in &self.attributes {
                let value = cache.get(attribute.slug()).cloned().unwrap_or(Value::Null);
                document.insert(attribute.slug().to_string(), attribute.encode(&value));
            }
        });

        let text = serde_json::to_string(&JsonValue::Object(document.clone()))?;
        store.write_document(&self.record_type, &self.record_id, &text)?;
        record.set_document(text);
        self.stored = document;

        debug!(
            "persisted {} attribute(s) for {} '{}'",
            self.attributes.len(),
            self.record_type,
            self.record_id
        );
        Ok(())
    }

    /// Run `f` against the decoded cache, building it on first use.
    fn with_cache<T>(&self, f: impl FnOnce(&mut HashMap<String, Value>) -> T) -> T {
        let mut slot = self.cache.borrow_mut();
        let cache = slot.get_or_insert_with(|| {
            self.attributes
                .iter()
                .map(|attribute| {
                    let value = match self.stored.get(attribute.slug()) {
                        None | Some(JsonValue::Null) => Value::Null,
                        Some(raw) => attribute.decode(raw),
                    };
                    (attribute.slug().to_string(), value)
                })
                .collect()
        });
        f(cache)
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("record_type", &self.record_type)
            .field("record_id", &self.record_id)
            .field("attributes", &self.attributes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::AttributeDefinition;
    use crate::registry::Registry;
    use crate::storage::{MemoryDocumentStore, MemoryRecord};

    fn attribute(slug: &str, datatype: &str) -> Attribute {
        AttributeDefinition::new(slug, datatype).resolve(&Registry::with_builtins())
    }

    #[test]
    fn test_get_unknown_slug_errors() {
        let record = MemoryRecord::new("product", "1");
        let entity = Entity::new(&record, vec![attribute("color", "string")]);
        assert!(matches!(
            entity.get("nope"),
            Err(EavError::UnknownAttribute(_))
        ));
    }

    #[test]
    fn test_get_absent_value_is_null() {
        let record = MemoryRecord::new("product", "1");
        let entity = Entity::new(&record, vec![attribute("color", "string")]);
        assert_eq!(entity.get("color").unwrap(), Value::Null);
    }

    #[test]
    fn test_set_validates_immediately() {
        let record = MemoryRecord::new("product", "1");
        let mut entity = Entity::new(&record, vec![attribute("count", "int")]);
        assert!(entity.set("count", Value::Integer(3)).is_ok());
        assert!(entity.set("count", Value::Boolean(true)).is_err());
        // Null always assigns, even on a fresh attribute.
        assert!(entity.set("count", Value::Null).is_ok());
    }

    #[test]
    fn test_corrupt_document_reads_as_empty() {
        let record = MemoryRecord::new("product", "1").with_document("{not json");
        let entity = Entity::new(&record, vec![attribute("color", "string")]);
        assert_eq!(entity.get("color").unwrap(), Value::Null);
    }

    #[test]
    fn test_persist_preserves_unknown_keys() {
        let record = MemoryRecord::new("product", "1")
            .with_document(r#"{"legacy_field":"kept","color":"red"}"#);
        let mut entity = Entity::new(&record, vec![attribute("color", "string")]);
        entity.set("color", Value::Text("blue".into())).unwrap();

        let store = MemoryDocumentStore::new();
        let mut record = record;
        entity.persist(&mut record, &store).unwrap();

        let written: JsonValue =
            serde_json::from_str(&store.document("product", "1").unwrap()).unwrap();
        assert_eq!(written["legacy_field"], "kept");
        assert_eq!(written["color"], "blue");
        assert_eq!(record.document().unwrap(), store.document("product", "1").unwrap());
    }

    #[test]
    fn test_iter_follows_attribute_order() {
        let record = MemoryRecord::new("product", "1").with_document(r#"{"b":"two","a":"one"}"#);
        let entity = Entity::new(
            &record,
            vec![attribute("b", "string"), attribute("a", "string")],
        );
        let slugs: Vec<String> = entity.iter().map(|(slug, _)| slug).collect();
        assert_eq!(slugs, vec!["b", "a"]);
    }
}
