use serde_json::Value as JsonValue;

use crate::attributes::{AttributeCodec, CodecResult, ValueError};
use crate::core::Value;
use crate::forms::WidgetKind;

/// Single-line text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl AttributeCodec for StringCodec {
    fn datatype(&self) -> &'static str {
        "string"
    }

    fn datatype_title(&self) -> &'static str {
        "String"
    }

    fn validate(&self, value: &Value) -> CodecResult {
        match value {
            Value::Text(_) => Ok(()),
            other => Err(ValueError::new(format!(
                "Must be a string, got {}",
                other.type_name()
            ))),
        }
    }

    /// Any stored scalar coerces to text; nulls and nested shapes stay null.
    fn decode(&self, raw: &JsonValue) -> Value {
        match Value::from_json(raw) {
            Value::Text(s) => Value::Text(s),
            Value::Integer(i) => Value::Text(i.to_string()),
            Value::Float(f) => Value::Text(f.to_string()),
            Value::Boolean(b) => Value::Text(b.to_string()),
            _ => Value::Null,
        }
    }

    /// Empty text normalizes to null so blank form input does not persist
    /// as an empty string.
    fn encode(&self, value: &Value) -> JsonValue {
        match value {
            Value::Text(s) if s.is_empty() => JsonValue::Null,
            other => other.to_json(),
        }
    }

    fn widget(&self) -> WidgetKind {
        WidgetKind::TextInput
    }
}
