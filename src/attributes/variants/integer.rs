use serde_json::Value as JsonValue;

use crate::attributes::{AttributeCodec, CodecResult, ValueError};
use crate::core::Value;
use crate::forms::WidgetKind;

#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerCodec;

impl AttributeCodec for IntegerCodec {
    fn datatype(&self) -> &'static str {
        "int"
    }

    fn datatype_title(&self) -> &'static str {
        "Integer"
    }

    /// Accepts anything that parses as an integer: native integers,
    /// integral floats, and numeric text.
    fn validate(&self, value: &Value) -> CodecResult {
        let ok = match value {
            Value::Integer(_) => true,
            Value::Float(f) => f.is_finite(),
            Value::Text(s) => s.trim().parse::<i64>().is_ok(),
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(ValueError::new("Must be an integer"))
        }
    }

    fn decode(&self, raw: &JsonValue) -> Value {
        match Value::from_json(raw) {
            Value::Integer(i) => Value::Integer(i),
            Value::Float(f) if f.is_finite() => Value::Integer(f as i64),
            Value::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .unwrap_or(Value::Null),
            Value::Boolean(b) => Value::Integer(b as i64),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_parse_rule() {
        let codec = IntegerCodec;
        assert!(codec.validate(&Value::Integer(5)).is_ok());
        assert!(codec.validate(&Value::Float(2.7)).is_ok());
        assert!(codec.validate(&Value::Text("42".into())).is_ok());
        assert!(codec.validate(&Value::Text("4.2".into())).is_err());
        assert!(codec.validate(&Value::Boolean(true)).is_err());
    }

    #[test]
    fn test_decode_best_effort() {
        let codec = IntegerCodec;
        assert_eq!(codec.decode(&JsonValue::from(7)), Value::Integer(7));
        assert_eq!(codec.decode(&JsonValue::from("12")), Value::Integer(12));
        assert_eq!(codec.decode(&JsonValue::from("not a number")), Value::Null);
        assert_eq!(codec.decode(&JsonValue::from(2.9)), Value::Integer(2));
    }

    #[test]
    fn test_decode_never_panics_on_garbage() {
        let codec = IntegerCodec;
        assert_eq!(codec.decode(&serde_json::json!({"a": 1})), Value::Null);
        assert_eq!(codec.decode(&serde_json::json!(["1"])), Value::Null);
    }
}
