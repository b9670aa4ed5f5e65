//! Value codec: options to transport strings and back.
//!
//! [`encode`] turns an option into a JSON string carrying both its label and
//! its value, so the host can show a human-readable label without a second
//! lookup. [`decode`] is its permissive inverse: it accepts whatever arrives in
//! a submitted form field and never fails. Input it cannot parse is returned
//! unchanged, since hosts routinely feed it values `encode` never produced.
//!
//! [`form`] lays encoded selections out as form fields.
//!
//! # Example
//!
//! ```
//! use liveselect::codec::{decode, encode, FormValue};
//! use liveselect::SelectOption;
//! use serde_json::json;
//!
//! let encoded = encode(&SelectOption::new("Paris", json!("par")));
//! let decoded = decode(&FormValue::Scalar(encoded));
//! assert_eq!(decoded, json!({"label": "Paris", "value": "par"}));
//!
//! assert_eq!(decode(&FormValue::Absent), json!([]));
//! assert_eq!(decode(&FormValue::Scalar(String::new())), json!(null));
//! assert_eq!(decode(&FormValue::Scalar("not json".into())), json!("not json"));
//! ```

pub mod form;

pub use form::{decode_selection, encode_selection, FormField};

use crate::domain::SelectOption;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw form field value as submitted by the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    /// A single-valued field.
    Scalar(String),

    /// A repeated (`name[]`) field.
    List(Vec<String>),

    /// The field was not submitted at all.
    Absent,
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<String>> for FormValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl<T: Into<Self>> From<Option<T>> for FormValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

/// The `{label, value}` structure [`encode`] serializes for `option`.
///
/// Numbers and booleans in the value position are replaced by their textual
/// form; everything else is carried as-is.
#[must_use]
pub fn transport_pair(option: &SelectOption) -> Value {
    let value = match option.value() {
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        other => other.clone(),
    };
    serde_json::json!({
        "label": option.label(),
        "value": value,
    })
}

/// Encodes an option as a transport-safe JSON string.
#[must_use]
pub fn encode(option: &SelectOption) -> String {
    transport_pair(option).to_string()
}

/// Decodes a submitted form value.
///
/// - [`FormValue::Absent`] → `[]`
/// - `""` → `null` ("present but empty", distinct from absent)
/// - a list → element-wise decode
/// - valid JSON → the parsed value
/// - anything else → the original string
#[must_use]
pub fn decode(value: &FormValue) -> Value {
    match value {
        FormValue::Absent => Value::Array(Vec::new()),
        FormValue::Scalar(raw) => decode_str(raw),
        FormValue::List(items) => Value::Array(items.iter().map(|s| decode_str(s)).collect()),
    }
}

/// Decodes one string; see [`decode`].
#[must_use]
pub fn decode_str(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::trace!(error = %e, "form value is not JSON, passing through");
        Value::String(raw.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn round_trip_string_values() {
        let options = [
            SelectOption::new("Paris", json!("par")),
            SelectOption::new("Quote \"me\"", json!("with \"quotes\" and \\")),
            SelectOption::new("Nested", json!({"id": 1, "tags": ["a"]})),
            SelectOption::new("Ünïcødé", json!("ü")),
        ];
        for option in options {
            let decoded = decode(&FormValue::Scalar(encode(&option)));
            assert_eq!(decoded, json!({"label": option.label(), "value": option.value()}));
        }
    }

    #[test]
    fn numbers_and_booleans_travel_as_text() {
        let decoded = decode(&FormValue::Scalar(encode(&SelectOption::new("Seven", json!(7)))));
        assert_eq!(decoded, json!({"label": "Seven", "value": "7"}));

        let option = SelectOption::new("Yes", json!(true));
        assert_eq!(decode(&encode(&option).into()), transport_pair(&option));
    }

    #[test]
    fn decode_is_permissive() {
        assert_eq!(decode(&FormValue::Absent), json!([]));
        assert_eq!(decode(&"".into()), json!(null));
        assert_eq!(decode(&"{broken".into()), json!("{broken"));
        assert_eq!(decode(&"plain text".into()), json!("plain text"));
        assert_eq!(decode(&"12".into()), json!(12));
        assert_eq!(
            decode(&FormValue::List(vec!["\"a\"".into(), String::new(), "b".into()])),
            json!(["a", null, "b"])
        );
    }

    #[test]
    fn form_value_conversions() {
        assert_eq!(FormValue::from(None::<&str>), FormValue::Absent);
        assert_eq!(FormValue::from(Some("x")), FormValue::Scalar("x".into()));
        assert_eq!(
            serde_json::from_str::<FormValue>("[\"a\"]").unwrap(),
            FormValue::List(vec!["a".into()])
        );
        assert_eq!(serde_json::from_str::<FormValue>("null").unwrap(), FormValue::Absent);
    }
}
