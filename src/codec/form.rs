//! Form field layout for encoded selections.
//!
//! Single mode submits one scalar field under the component's field name.
//! The tags modes submit a repeated `name[]` field with one encoded entry per
//! tag. An empty tag list still submits a single empty entry so the field is
//! present at all; [`decode_selection`] drops it again on the way back.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode, encode, FormValue};
use crate::domain::{Mode, Selection};

/// One named form field carrying an encoded selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

/// Lays out `selection` as the form field the host receives.
#[must_use]
pub fn encode_selection(field_name: &str, mode: Mode, selection: &Selection) -> FormField {
    if !mode.is_multi() {
        return FormField {
            name: field_name.to_string(),
            value: FormValue::Scalar(selection.first().map(encode).unwrap_or_default()),
        };
    }

    let mut values: Vec<String> = selection.iter().map(encode).collect();
    if values.is_empty() {
        values.push(String::new());
    }
    FormField {
        name: format!("{field_name}[]"),
        value: FormValue::List(values),
    }
}

/// Decodes a submitted field into its entries, dropping empty placeholders.
///
/// Always returns a list: a scalar field yields at most one entry.
#[must_use]
pub fn decode_selection(value: &FormValue) -> Vec<Value> {
    match decode(value) {
        Value::Array(items) => items.into_iter().filter(|v| !v.is_null()).collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SelectOption;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn selection(values: &[&str]) -> Selection {
        Selection::from_trusted(
            values
                .iter()
                .map(|v| SelectOption::new(v.to_uppercase(), json!(v)))
                .collect(),
        )
    }

    #[test]
    fn single_mode_uses_scalar_field() {
        let field = encode_selection("city", Mode::Single, &selection(&["par"]));
        assert_eq!(field.name, "city");
        assert_eq!(
            decode_selection(&field.value),
            vec![json!({"label": "PAR", "value": "par"})]
        );

        let empty = encode_selection("city", Mode::Single, &Selection::new());
        assert_eq!(empty.value, FormValue::Scalar(String::new()));
        assert!(decode_selection(&empty.value).is_empty());
    }

    #[test]
    fn tags_mode_uses_repeated_field() {
        let field = encode_selection("cities", Mode::Tags, &selection(&["a", "b"]));
        assert_eq!(field.name, "cities[]");
        assert_eq!(
            decode_selection(&field.value),
            vec![
                json!({"label": "A", "value": "a"}),
                json!({"label": "B", "value": "b"}),
            ]
        );
    }

    #[test]
    fn empty_tags_submit_a_placeholder() {
        let field = encode_selection("cities", Mode::QuickTags, &Selection::new());
        assert_eq!(field.value, FormValue::List(vec![String::new()]));
        assert!(decode_selection(&field.value).is_empty());
    }

    #[test]
    fn absent_field_decodes_to_nothing() {
        assert!(decode_selection(&FormValue::Absent).is_empty());
        assert_eq!(decode_selection(&"raw".into()), vec![json!("raw")]);
    }
}
