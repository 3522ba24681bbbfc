use serde_json::Value as JsonValue;

use crate::attributes::variants::StringCodec;
use crate::attributes::{AttributeCodec, CodecResult};
use crate::core::Value;
use crate::forms::WidgetKind;

/// Multi-line text. Same rules as `string`, rendered as a textarea.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl AttributeCodec for TextCodec {
    fn datatype(&self) -> &'static str {
        "text"
    }

    fn datatype_title(&self) -> &'static str {
        "Text"
    }

    fn validate(&self, value: &Value) -> CodecResult {
        StringCodec.validate(value)
    }

    fn decode(&self, raw: &JsonValue) -> Value {
        StringCodec.decode(raw)
    }

    fn encode(&self, value: &Value) -> JsonValue {
        StringCodec.encode(value)
    }

    fn widget(&self) -> WidgetKind {
        WidgetKind::Textarea
    }
}
