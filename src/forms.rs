//! Form-field descriptors for the admin/UI layer.
//!
//! The UI itself is out of scope; this module is the coupling surface it
//! consumes. Each resolved attribute can describe the form field that
//! should edit it (label, widget, choice list, delimiter), and
//! multi-valued attributes get a delimiter-based text codec for plain
//! text widgets that cannot render a multi-select.

use crate::attributes::{Attribute, AttributeCodec, ValueError};
use crate::core::Value;

/// Default delimiter for multi-valued input in a plain text widget, one
/// value per line.
pub const MULTI_VALUE_DELIMITER: char = '\n';

/// Alternative delimiter for hosts rendering a single-line text box.
pub const TEXT_INPUT_DELIMITER: char = ',';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    TextInput,
    Textarea,
    NumberInput,
    Checkbox,
    DateInput,
    DateTimeInput,
    Select,
    SelectMultiple,
}

/// Everything a form layer needs to render and pre-fill one attribute.
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: String,
    pub required: bool,
    pub help_text: String,
    pub widget: WidgetKind,
    pub initial: Value,
    /// Decoded `(value, title)` options; `None` when unrestricted. For a
    /// single-select the list starts with a blank `(Null, "")` entry.
    pub choices: Option<Vec<(Value, String)>>,
    /// Set when a multi-valued attribute is edited through a plain text
    /// widget; see [`split_values`] / [`join_values`].
    pub delimiter: Option<char>,
}

impl Attribute {
    /// Build the form-field descriptor for this attribute, optionally
    /// pre-filled with the current value.
    pub fn form_field(&self, initial: Option<Value>) -> FormField {
        let mut field = FormField {
            label: capitalize(self.name()),
            required: self.required(),
            help_text: self.description().to_string(),
            widget: self.codec().widget(),
            initial: initial.unwrap_or(Value::Null),
            choices: None,
            delimiter: None,
        };

        if !self.choices().is_empty() {
            let options: Vec<(Value, String)> = self
                .choices()
                .iter()
                .map(|c| (c.value.clone(), c.title.clone()))
                .collect();
            if self.multiple() {
                field.widget = WidgetKind::SelectMultiple;
                field.choices = Some(options);
            } else {
                field.widget = WidgetKind::Select;
                let mut with_blank = vec![(Value::Null, String::new())];
                with_blank.extend(options);
                field.choices = Some(with_blank);
            }
        } else if self.multiple() {
            // Free-form list edited as delimited text, one value per line.
            field.delimiter = Some(MULTI_VALUE_DELIMITER);
        }

        field
    }
}

/// Parse delimited text from a plain-text widget into decoded values.
///
/// Items are trimmed; blank items are skipped. An item the codec cannot
/// decode, or that fails validation after decoding, rejects the whole
/// input.
pub fn split_values(
    text: &str,
    delimiter: char,
    codec: &dyn AttributeCodec,
) -> Result<Vec<Value>, ValueError> {
    let mut values = Vec::new();
    for item in text.split(delimiter) {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let decoded = codec.decode(&serde_json::Value::String(item.to_string()));
        if decoded.is_null() {
            return Err(ValueError::new(format!("Value \"{}\" is incorrect", item)));
        }
        codec
            .validate(&decoded)
            .map_err(|e| ValueError::new(format!("Value \"{}\" is incorrect: {}", item, e)))?;
        values.push(decoded);
    }
    Ok(values)
}

/// Render a list of values back into delimited text for a plain-text
/// widget.
pub fn join_values(values: &[Value], delimiter: char) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(&delimiter.to_string())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
