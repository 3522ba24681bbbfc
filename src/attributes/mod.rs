//! Attribute datatypes and their composition.
//!
//! Each datatype is a stateless codec implementing validate/decode/encode
//! for one native type. Choice restriction and multiplicity are layered
//! over a base codec as wrappers, never as datatypes of their own.

pub mod decorators;
pub mod variants;

use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::core::Value;
use crate::forms::WidgetKind;

/// A rejected value with the reason text. The owning attribute attaches
/// the slug when it surfaces the failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ValueError(pub String);

impl ValueError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

pub type CodecResult = std::result::Result<(), ValueError>;

/// Validation and serialization rules for one attribute datatype.
///
/// `validate` fails loudly: malformed values must never reach persistence.
/// `decode` never fails: stored documents may be stale relative to the
/// current definition (datatype changed, corrupted data), so anything
/// unconvertible degrades to `Value::Null` instead of erroring.
pub trait AttributeCodec: Send + Sync {
    /// Datatype tag, the discriminator stored in attribute definitions.
    fn datatype(&self) -> &'static str;

    /// Human-readable datatype title for admin enumerations.
    fn datatype_title(&self) -> &'static str;

    fn validate(&self, value: &Value) -> CodecResult;

    fn decode(&self, raw: &JsonValue) -> Value;

    fn encode(&self, value: &Value) -> JsonValue;

    /// Default form widget for this datatype.
    fn widget(&self) -> WidgetKind;
}

/// One decoded choice entry: the decoded native value and its display title.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceOption {
    pub value: Value,
    pub title: String,
}

/// A resolved, ready-to-use attribute: definition config plus the composed
/// codec (base datatype, optionally wrapped for choices and multiplicity).
///
/// Cheap to construct; owned by one entity store for its lifetime.
pub struct Attribute {
    name: String,
    slug: String,
    description: String,
    required: bool,
    multiple: bool,
    choices: Vec<ChoiceOption>,
    codec: Box<dyn AttributeCodec>,
}

impl Attribute {
    pub fn new(
        name: impl Into<String>,
        slug: impl Into<String>,
        required: bool,
        multiple: bool,
        choices: Vec<ChoiceOption>,
        codec: Box<dyn AttributeCodec>,
    ) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            description: String::new(),
            required,
            multiple,
            choices,
            codec,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn multiple(&self) -> bool {
        self.multiple
    }

    /// Decoded `(value, title)` choice entries, empty when unrestricted.
    pub fn choices(&self) -> &[ChoiceOption] {
        &self.choices
    }

    pub fn datatype(&self) -> &'static str {
        self.codec.datatype()
    }

    pub fn validate(&self, value: &Value) -> CodecResult {
        self.codec.validate(value)
    }

    pub fn decode(&self, raw: &JsonValue) -> Value {
        self.codec.decode(raw)
    }

    pub fn encode(&self, value: &Value) -> JsonValue {
        self.codec.encode(value)
    }

    pub(crate) fn codec(&self) -> &dyn AttributeCodec {
        self.codec.as_ref()
    }
}

impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("slug", &self.slug)
            .field("datatype", &self.datatype())
            .field("required", &self.required)
            .field("multiple", &self.multiple)
            .field("choices", &self.choices.len())
            .finish()
    }
}
