use serde_json::Value as JsonValue;

use crate::attributes::{AttributeCodec, CodecResult, ValueError};
use crate::core::Value;
use crate::forms::WidgetKind;

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatCodec;

impl AttributeCodec for FloatCodec {
    fn datatype(&self) -> &'static str {
        "float"
    }

    fn datatype_title(&self) -> &'static str {
        "Float"
    }

    fn validate(&self, value: &Value) -> CodecResult {
        let ok = match value {
            Value::Integer(_) | Value::Float(_) => true,
            Value::Text(s) => s.trim().parse::<f64>().is_ok(),
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(ValueError::new("Must be a float"))
        }
    }

    fn decode(&self, raw: &JsonValue) -> Value {
        match Value::from_json(raw) {
            Value::Float(f) => Value::Float(f),
            Value::Integer(i) => Value::Float(i as f64),
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .unwrap_or(Value::Null),
            Value::Boolean(b) => Value::Float(if b { 1.0 } else { 0.0 }),
            _ => Value::Null,
        }
    }

    fn encode(&self, value: &Value) -> JsonValue {
        value.to_json()
    }

    fn widget(&self) -> WidgetKind {
        WidgetKind::NumberInput
    }
}
