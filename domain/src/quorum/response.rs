//! Output contract for structured model responses
//!
//! A [`StructuredResponse`] is a payload type the validator can build from a
//! JSON object returned by a model. Each payload also names the summary
//! category it is counted under, so runs over different payload types share
//! one aggregator.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a raw model response was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationReason {
    #[error("response does not contain a parseable JSON object")]
    NotParseable,

    #[error("missing required field `{field}`")]
    MissingField { field: String },

    #[error("field `{field}` has unrecognized value {value:?}")]
    InvalidEnumValue { field: String, value: String },

    #[error("field `{field}` is empty")]
    EmptyStatement { field: String },

    #[error("field `{field}` has the wrong type")]
    WrongType { field: String },
}

impl ValidationReason {
    pub fn missing(field: &str) -> Self {
        Self::MissingField {
            field: field.to_string(),
        }
    }

    pub fn invalid(field: &str, value: impl Into<String>) -> Self {
        Self::InvalidEnumValue {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn empty(field: &str) -> Self {
        Self::EmptyStatement {
            field: field.to_string(),
        }
    }

    pub fn wrong_type(field: &str) -> Self {
        Self::WrongType {
            field: field.to_string(),
        }
    }
}

/// A payload type with an enforceable output contract
pub trait StructuredResponse:
    Serialize + DeserializeOwned + Clone + PartialEq + std::fmt::Debug + Send + Sync + 'static
{
    /// Summary categories of successful payloads, in display order
    fn categories() -> &'static [&'static str];

    /// The summary category this payload is counted under
    fn category(&self) -> &'static str;

    /// Build the payload from an already-extracted JSON object
    fn from_object(object: &Map<String, Value>) -> Result<Self, ValidationReason>;

    /// Placeholder payload used only by the legacy failure policy
    fn fallback(error: &str) -> Self;
}

/// Fetch a required string field
pub(crate) fn required_str<'a>(
    object: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a str, ValidationReason> {
    match object.get(field) {
        None | Some(Value::Null) => Err(ValidationReason::missing(field)),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(ValidationReason::wrong_type(field)),
    }
}

/// Fetch a required enum field, case-folded and trimmed before parsing
///
/// Non-string values are reported as unrecognized values, not type errors:
/// `{"vote": true}` is an invalid vote, not a malformed document.
pub(crate) fn required_enum<E: std::str::FromStr>(
    object: &Map<String, Value>,
    field: &str,
) -> Result<E, ValidationReason> {
    match object.get(field) {
        None | Some(Value::Null) => Err(ValidationReason::missing(field)),
        Some(Value::String(s)) => s
            .trim()
            .to_lowercase()
            .parse()
            .map_err(|_| ValidationReason::invalid(field, s.as_str())),
        Some(other) => Err(ValidationReason::invalid(field, other.to_string())),
    }
}

/// Fetch a required free-text field that must be non-empty after trimming
pub(crate) fn required_text(
    object: &Map<String, Value>,
    field: &str,
) -> Result<String, ValidationReason> {
    let text = required_str(object, field)?.trim();
    if text.is_empty() {
        return Err(ValidationReason::empty(field));
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_required_str_missing_and_null() {
        let obj = object(json!({"a": null}));
        assert_eq!(required_str(&obj, "a"), Err(ValidationReason::missing("a")));
        assert_eq!(required_str(&obj, "b"), Err(ValidationReason::missing("b")));
    }

    #[test]
    fn test_required_text_trims() {
        let obj = object(json!({"statement": "  We agree.  "}));
        assert_eq!(required_text(&obj, "statement").unwrap(), "We agree.");

        let obj = object(json!({"statement": "   "}));
        assert_eq!(
            required_text(&obj, "statement"),
            Err(ValidationReason::empty("statement"))
        );
    }

    #[test]
    fn test_reason_serializes_with_kind_tag() {
        let json = serde_json::to_value(ValidationReason::invalid("vote", "maybe")).unwrap();
        assert_eq!(
            json,
            json!({"kind": "invalid_enum_value", "field": "vote", "value": "maybe"})
        );
    }
}
