//! Persisted attribute configuration.
//!
//! An `AttributeDefinition` is administrator-edited data describing one
//! attribute: datatype, constraints, choice list, multiplicity. The core
//! never writes definitions; it only resolves them into runtime
//! [`Attribute`]s through the registry's datatype catalog.

use lazy_static::lazy_static;
use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::attributes::decorators::{clean_choices, compose, decode_choices};
use crate::attributes::Attribute;
use crate::core::{EavError, Result};
use crate::registry::Registry;

lazy_static! {
    static ref SLUG_RE: Regex = Regex::new(r"^[a-z][a-z0-9_]*$").unwrap();
}

/// One raw choice entry as written in the definition's choices text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub title: String,
}

fn default_weight() -> i32 {
    500
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDefinition {
    #[serde(default)]
    pub id: u64,
    /// Partitioning key (tenant, site) within which slugs are unique.
    #[serde(default)]
    pub scope: String,
    /// User-friendly attribute name.
    pub name: String,
    /// Short unique attribute code within the scope.
    pub slug: String,
    #[serde(default)]
    pub description: String,
    /// Discriminator into the registry's datatype catalog.
    pub datatype: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub multiple: bool,
    /// Choice entries, one per line, `value=title`; `==` escapes a
    /// literal `=`; a line without `=` uses the value as its title.
    #[serde(default)]
    pub choices: String,
    /// Sort priority, descending.
    #[serde(default = "default_weight")]
    pub weight: i32,
}

impl Default for AttributeDefinition {
    fn default() -> Self {
        Self {
            id: 0,
            scope: String::new(),
            name: String::new(),
            slug: String::new(),
            description: String::new(),
            datatype: "string".to_string(),
            required: false,
            multiple: false,
            choices: String::new(),
            weight: default_weight(),
        }
    }
}

impl AttributeDefinition {
    pub fn new(slug: impl Into<String>, datatype: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            name: slug.clone(),
            slug,
            datatype: datatype.into(),
            ..Default::default()
        }
    }

    /// Parse the choices text into raw `(value, title)` entries.
    ///
    /// `==` is swapped out before splitting on the first `=` so an escaped
    /// equals sign can appear inside a value or title.
    pub fn parse_choices(&self) -> Vec<Choice> {
        self.choices
            .replace("==", "\u{0}")
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let (value, title) = match line.split_once('=') {
                    Some((v, t)) => (v, t),
                    None => (line, line),
                };
                Choice {
                    value: value.replace('\u{0}', "=").trim().to_string(),
                    title: title.replace('\u{0}', "=").trim().to_string(),
                }
            })
            .collect()
    }

    /// Configuration check, run when an administrator saves a definition.
    ///
    /// Fails loudly on a bad slug, an unknown datatype, or a choice list
    /// that is inconsistent with the declared datatype. Stored data is
    /// never subjected to this; see [`resolve`](Self::resolve).
    pub fn clean(&self, registry: &Registry) -> Result<()> {
        if !SLUG_RE.is_match(&self.slug) {
            return Err(EavError::Configuration(format!(
                "Slug '{}' must be all lower case, start with a letter, \
                 and contain only letters, numbers, or underscores",
                self.slug
            )));
        }

        let Some(factory) = registry.codec_factory(&self.datatype) else {
            return Err(EavError::Configuration(format!(
                "Unknown datatype '{}'",
                self.datatype
            )));
        };

        let base = factory();
        let raw = self.parse_choices();
        if !raw.is_empty() {
            clean_choices(base.as_ref(), &raw)?;
        }
        Ok(())
    }

    /// Resolve into a runtime attribute.
    ///
    /// Resolution never fails: an unknown datatype (a definition edited
    /// after its datatype was unregistered) falls back to the plain string
    /// codec so existing records stay readable.
    pub fn resolve(&self, registry: &Registry) -> Attribute {
        let base = match registry.codec_factory(&self.datatype) {
            Some(factory) => factory(),
            None => {
                warn!(
                    "unknown datatype '{}' for attribute '{}', falling back to string",
                    self.datatype, self.slug
                );
                Box::new(crate::attributes::variants::StringCodec)
            }
        };

        let raw = self.parse_choices();
        let options = decode_choices(base.as_ref(), &raw);
        let codec = compose(base, options.clone(), self.multiple);

        Attribute::new(
            self.name.clone(),
            self.slug.clone(),
            self.required,
            self.multiple,
            options,
            codec,
        )
        .with_description(self.description.clone())
    }
}

/// Order definitions the way the default source presents them: descending
/// weight, then scope, then name, then descending id (newest wins ties).
pub fn sort_definitions(definitions: &mut [AttributeDefinition]) {
    definitions.sort_by(|a, b| {
        b.weight
            .cmp(&a.weight)
            .then_with(|| a.scope.cmp(&b.scope))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choices_basic() {
        let mut def = AttributeDefinition::new("rating", "int");
        def.choices = "1=Low\n2=Medium\n3=High".to_string();
        let parsed = def.parse_choices();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].value, "1");
        assert_eq!(parsed[0].title, "Low");
        assert_eq!(parsed[2].title, "High");
    }

    #[test]
    fn test_parse_choices_escaped_equals() {
        let mut def = AttributeDefinition::new("op", "string");
        def.choices = "a==b=A equals B".to_string();
        let parsed = def.parse_choices();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].value, "a=b");
        assert_eq!(parsed[0].title, "A equals B");
    }

    #[test]
    fn test_parse_choices_title_defaults_to_value() {
        let mut def = AttributeDefinition::new("color", "string");
        def.choices = "red\nblue".to_string();
        let parsed = def.parse_choices();
        assert_eq!(parsed[0].value, "red");
        assert_eq!(parsed[0].title, "red");
        assert_eq!(parsed[1].value, "blue");
    }

    #[test]
    fn test_parse_choices_skips_blank_lines() {
        let mut def = AttributeDefinition::new("color", "string");
        def.choices = "red=Red\n\n  \nblue=Blue\n".to_string();
        assert_eq!(def.parse_choices().len(), 2);
    }

    #[test]
    fn test_slug_pattern() {
        let registry = Registry::with_builtins();
        for bad in ["Upper", "1starts_with_digit", "has-dash", "has space", ""] {
            let def = AttributeDefinition::new(bad, "string");
            assert!(def.clean(&registry).is_err(), "slug '{}' should fail", bad);
        }
        let def = AttributeDefinition::new("good_slug_2", "string");
        assert!(def.clean(&registry).is_ok());
    }

    #[test]
    fn test_clean_unknown_datatype_errors() {
        let registry = Registry::with_builtins();
        let def = AttributeDefinition::new("thing", "geopoint");
        assert!(matches!(
            def.clean(&registry),
            Err(EavError::Configuration(_))
        ));
    }

    #[test]
    fn test_resolve_unknown_datatype_falls_back_to_string() {
        let registry = Registry::with_builtins();
        let attribute = AttributeDefinition::new("thing", "geopoint").resolve(&registry);
        assert_eq!(attribute.datatype(), "string");
    }

    #[test]
    fn test_sort_order() {
        let mut defs = vec![
            AttributeDefinition {
                id: 1,
                slug: "a".into(),
                name: "a".into(),
                weight: 100,
                ..Default::default()
            },
            AttributeDefinition {
                id: 2,
                slug: "b".into(),
                name: "b".into(),
                weight: 900,
                ..Default::default()
            },
            AttributeDefinition {
                id: 3,
                slug: "c".into(),
                name: "b".into(),
                weight: 900,
                ..Default::default()
            },
        ];
        sort_definitions(&mut defs);
        // Highest weight first; equal weight and name resolved by newest id.
        assert_eq!(defs[0].slug, "c");
        assert_eq!(defs[1].slug, "b");
        assert_eq!(defs[2].slug, "a");
    }
}
