use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::attributes::{AttributeCodec, CodecResult, ValueError};
use crate::core::Value;
use crate::forms::WidgetKind;

// Accepted stored representations: `T` or space separator, optional
// fractional seconds.
const FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeCodec;

impl AttributeCodec for DateTimeCodec {
    fn datatype(&self) -> &'static str {
        "datetime"
    }

    fn datatype_title(&self) -> &'static str {
        "Date and Time"
    }

    fn validate(&self, value: &Value) -> CodecResult {
        match value {
            Value::DateTime(_) => Ok(()),
            other => Err(ValueError::new(format!(
                "Must be a datetime, got {}",
                other.type_name()
            ))),
        }
    }

    fn decode(&self, raw: &JsonValue) -> Value {
        match raw {
            JsonValue::String(s) => FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(Value::DateTime)
                .unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    fn encode(&self, value: &Value) -> JsonValue {
        match value {
            Value::DateTime(dt) => JsonValue::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            other => other.to_json(),
        }
    }

    fn widget(&self) -> WidgetKind {
        WidgetKind::DateTimeInput
    }
}
