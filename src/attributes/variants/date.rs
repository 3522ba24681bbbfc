use chrono::NaiveDate;
use serde_json::Value as JsonValue;

use crate::attributes::{AttributeCodec, CodecResult, ValueError};
use crate::core::Value;
use crate::forms::WidgetKind;

#[derive(Debug, Clone, Copy, Default)]
pub struct DateCodec;

impl AttributeCodec for DateCodec {
    fn datatype(&self) -> &'static str {
        "date"
    }

    fn datatype_title(&self) -> &'static str {
        "Date"
    }

    fn validate(&self, value: &Value) -> CodecResult {
        match value {
            Value::Date(_) => Ok(()),
            other => Err(ValueError::new(format!(
                "Must be a date, got {}",
                other.type_name()
            ))),
        }
    }

    /// ISO `YYYY-MM-DD` text parses to a date; anything else is null.
    fn decode(&self, raw: &JsonValue) -> Value {
        match raw {
            JsonValue::String(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(Value::Date)
                .unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    /// Dates serialize as ISO text; anything else passes through untouched
    /// so stale values survive a round trip.
    fn encode(&self, value: &Value) -> JsonValue {
        match value {
            Value::Date(d) => JsonValue::String(d.format("%Y-%m-%d").to_string()),
            other => other.to_json(),
        }
    }

    fn widget(&self) -> WidgetKind {
        WidgetKind::DateInput
    }
}
