//! Capability wrappers layered over a base datatype codec.
//!
//! Composition order is fixed: `MultiValued` wraps `ChoiceRestricted`
//! wraps the base codec, so multiplicity is always the outermost concern.
//! When a definition has no choices or is not multiple, the corresponding
//! wrapper is simply not applied.

use serde_json::Value as JsonValue;

use crate::attributes::{AttributeCodec, ChoiceOption, CodecResult};
use crate::core::{EavError, Result, Value};
use crate::definition::Choice;
use crate::forms::WidgetKind;

/// Restricts an attribute to an enumerated choice list.
///
/// The choice list itself is checked at definition-clean time via
/// [`clean_choices`]. At value level this wrapper delegates straight to
/// the base codec: choice membership is enforced by the form layer, not
/// re-validated here. A value outside the declared list therefore passes
/// `validate` by design.
pub struct ChoiceRestricted {
    inner: Box<dyn AttributeCodec>,
    options: Vec<ChoiceOption>,
}

impl ChoiceRestricted {
    pub fn new(inner: Box<dyn AttributeCodec>, options: Vec<ChoiceOption>) -> Self {
        Self { inner, options }
    }

    pub fn options(&self) -> &[ChoiceOption] {
        &self.options
    }
}

impl AttributeCodec for ChoiceRestricted {
    fn datatype(&self) -> &'static str {
        self.inner.datatype()
    }

    fn datatype_title(&self) -> &'static str {
        self.inner.datatype_title()
    }

    fn validate(&self, value: &Value) -> CodecResult {
        self.inner.validate(value)
    }

    fn decode(&self, raw: &JsonValue) -> Value {
        self.inner.decode(raw)
    }

    fn encode(&self, value: &Value) -> JsonValue {
        self.inner.encode(value)
    }

    fn widget(&self) -> WidgetKind {
        WidgetKind::Select
    }
}

/// Lifts a scalar codec to sequences.
///
/// Non-list input is treated as a singleton, so hosts may hand a scalar
/// to a multi-valued attribute without wrapping it themselves. Decode
/// drops elements that decode to null, which is how stale or corrupt
/// list entries silently disappear on read.
pub struct MultiValued {
    inner: Box<dyn AttributeCodec>,
}

impl MultiValued {
    pub fn new(inner: Box<dyn AttributeCodec>) -> Self {
        Self { inner }
    }
}

impl AttributeCodec for MultiValued {
    fn datatype(&self) -> &'static str {
        self.inner.datatype()
    }

    fn datatype_title(&self) -> &'static str {
        self.inner.datatype_title()
    }

    fn validate(&self, value: &Value) -> CodecResult {
        match value {
            Value::List(items) => {
                for item in items {
                    self.inner.validate(item)?;
                }
                Ok(())
            }
            scalar => self.inner.validate(scalar),
        }
    }

    fn decode(&self, raw: &JsonValue) -> Value {
        let items: Vec<Value> = match raw {
            JsonValue::Array(elements) => elements.iter().map(|e| self.inner.decode(e)).collect(),
            scalar => vec![self.inner.decode(scalar)],
        };
        Value::List(items.into_iter().filter(|v| !v.is_null()).collect())
    }

    fn encode(&self, value: &Value) -> JsonValue {
        if value.is_null() {
            return JsonValue::Null;
        }
        let items = value.clone().into_list();
        JsonValue::Array(items.iter().map(|v| self.inner.encode(v)).collect())
    }

    fn widget(&self) -> WidgetKind {
        self.inner.widget()
    }
}

/// Decode raw choice entries leniently for resolution. Undecodable values
/// come through as null options; `clean_choices` is where they fail.
pub fn decode_choices(codec: &dyn AttributeCodec, raw: &[Choice]) -> Vec<ChoiceOption> {
    raw.iter()
        .map(|choice| ChoiceOption {
            value: codec.decode(&JsonValue::String(choice.value.clone())),
            title: choice.title.clone(),
        })
        .collect()
}

/// Strict configuration check of a choice list against its base codec:
/// every raw value must decode to a non-null value that passes `validate`,
/// and raw values must be pairwise unique.
pub fn clean_choices(codec: &dyn AttributeCodec, raw: &[Choice]) -> Result<()> {
    for choice in raw {
        let decoded = codec.decode(&JsonValue::String(choice.value.clone()));
        if decoded.is_null() {
            return Err(EavError::Configuration(format!(
                "Choice value \"{}\" incorrect",
                choice.value
            )));
        }
        if let Err(e) = codec.validate(&decoded) {
            return Err(EavError::Configuration(format!(
                "Choice value \"{}\" incorrect: {}",
                choice.value, e
            )));
        }
    }

    for (i, choice) in raw.iter().enumerate() {
        if raw[..i].iter().any(|prior| prior.value == choice.value) {
            return Err(EavError::Configuration(
                "Choice values are not unique".to_string(),
            ));
        }
    }

    Ok(())
}

/// Apply the capability wrappers to a base codec in the fixed order.
pub fn compose(
    base: Box<dyn AttributeCodec>,
    options: Vec<ChoiceOption>,
    multiple: bool,
) -> Box<dyn AttributeCodec> {
    let mut codec = base;
    if !options.is_empty() {
        codec = Box::new(ChoiceRestricted::new(codec, options));
    }
    if multiple {
        codec = Box::new(MultiValued::new(codec));
    }
    codec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::variants::{IntegerCodec, StringCodec};

    fn choice(value: &str, title: &str) -> Choice {
        Choice {
            value: value.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn test_multi_validates_element_wise() {
        let codec = MultiValued::new(Box::new(IntegerCodec));
        let good = Value::List(vec![Value::Integer(1), Value::Integer(2)]);
        let bad = Value::List(vec![Value::Integer(1), Value::Boolean(true)]);
        assert!(codec.validate(&good).is_ok());
        assert!(codec.validate(&bad).is_err());
    }

    #[test]
    fn test_multi_accepts_scalar_as_singleton() {
        let codec = MultiValued::new(Box::new(IntegerCodec));
        assert!(codec.validate(&Value::Integer(7)).is_ok());
        assert_eq!(
            codec.decode(&JsonValue::from(7)),
            Value::List(vec![Value::Integer(7)])
        );
    }

    #[test]
    fn test_multi_decode_drops_nulls() {
        let codec = MultiValued::new(Box::new(IntegerCodec));
        let raw = serde_json::json!([1, "garbage", 3, null]);
        assert_eq!(
            codec.decode(&raw),
            Value::List(vec![Value::Integer(1), Value::Integer(3)])
        );
    }

    #[test]
    fn test_clean_rejects_duplicate_choice_values() {
        let raw = vec![choice("1", "Low"), choice("2", "High"), choice("1", "Again")];
        let err = clean_choices(&IntegerCodec, &raw).unwrap_err();
        assert!(err.to_string().contains("not unique"));
    }

    #[test]
    fn test_clean_rejects_undecodable_choice() {
        let raw = vec![choice("one", "One")];
        let err = clean_choices(&IntegerCodec, &raw).unwrap_err();
        assert!(err.to_string().contains("\"one\""));
    }

    #[test]
    fn test_clean_accepts_valid_list() {
        let raw = vec![choice("1", "Low"), choice("2", "Medium"), choice("3", "High")];
        assert!(clean_choices(&IntegerCodec, &raw).is_ok());
    }

    #[test]
    fn test_choice_wrapper_passes_out_of_set_values() {
        // Membership is a form-layer concern; scalar validate still passes.
        let options = decode_choices(&IntegerCodec, &[choice("1", "Low"), choice("2", "High")]);
        let codec = ChoiceRestricted::new(Box::new(IntegerCodec), options);
        assert!(codec.validate(&Value::Integer(5)).is_ok());
    }

    #[test]
    fn test_choice_wrapper_exposes_decoded_options() {
        let options = decode_choices(&IntegerCodec, &[choice("1", "Low"), choice("2", "High")]);
        let codec = ChoiceRestricted::new(Box::new(IntegerCodec), options);
        let exposed = codec.options();
        assert_eq!(exposed.len(), 2);
        assert_eq!(exposed[0].value, Value::Integer(1));
        assert_eq!(exposed[1].title, "High");
    }

    #[test]
    fn test_compose_order_multiplicity_outermost() {
        let options = decode_choices(&StringCodec, &[choice("a", "A")]);
        let codec = compose(Box::new(StringCodec), options, true);
        // A scalar through the composed codec decodes to a list, proving
        // the multi wrapper sits outside the choice wrapper.
        assert_eq!(
            codec.decode(&JsonValue::from("a")),
            Value::List(vec![Value::Text("a".into())])
        );
    }
}
