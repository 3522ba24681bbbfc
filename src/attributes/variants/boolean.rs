use serde_json::Value as JsonValue;

use crate::attributes::{AttributeCodec, CodecResult, ValueError};
use crate::core::Value;
use crate::forms::WidgetKind;

#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanCodec;

impl AttributeCodec for BooleanCodec {
    fn datatype(&self) -> &'static str {
        "bool"
    }

    fn datatype_title(&self) -> &'static str {
        "Boolean"
    }

    /// Null is a valid boolean state (tri-state checkbox).
    fn validate(&self, value: &Value) -> CodecResult {
        match value {
            Value::Boolean(_) | Value::Null => Ok(()),
            other => Err(ValueError::new(format!(
                "Must be a boolean, got {}",
                other.type_name()
            ))),
        }
    }

    /// Truthiness coercion: non-zero numbers and non-empty text are true.
    fn decode(&self, raw: &JsonValue) -> Value {
        match Value::from_json(raw) {
            Value::Boolean(b) => Value::Boolean(b),
            Value::Integer(i) => Value::Boolean(i != 0),
            Value::Float(f) => Value::Boolean(f != 0.0 && !f.is_nan()),
            Value::Text(s) => Value::Boolean(!s.is_empty()),
            _ => Value::Null,
        }
    }

    fn encode(&self, value: &Value) -> JsonValue {
        value.to_json()
    }

    fn widget(&self) -> WidgetKind {
        WidgetKind::Checkbox
    }
}
