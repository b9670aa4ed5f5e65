//! Option normalizer: coerces heterogeneous raw candidate data into
//! [`SelectOption`]s.
//!
//! Hosts hand over candidates in whatever shape is convenient: maps with a
//! label and a value, maps with only a value, `key`/`value` maps, two- and
//! three-element tuples, bare scalars, or ordered key/value sequences. Raw
//! data arrives as [`serde_json::Value`].
//!
//! Normalization is pure and total. An item no matcher recognizes is dropped
//! (logged at debug level), it is never reported to the caller.
//!
//! # Example
//!
//! ```
//! use liveselect::normalize::{normalize, normalize_list};
//! use serde_json::json;
//!
//! let option = normalize(&json!(["Paris", "par"])).unwrap();
//! assert_eq!(option.label(), "Paris");
//!
//! let options = normalize_list(&json!(["a", {"value": 2}, null]));
//! assert_eq!(options.len(), 2);
//! ```

mod shapes;

pub use shapes::ShapeMatcher;

use crate::domain::SelectOption;
use serde_json::Value;

/// Normalizes one raw candidate.
///
/// Matchers run in priority order and the first match wins:
///
/// 1. `{"label", "value", ...}` maps (label verbatim)
/// 2. `{"key", "value", ...}` maps (`key` aliases the label)
/// 3. `{"value", ...}` maps (value becomes the label)
/// 4. `[label, value]` tuples
/// 5. `[label, value, disabled]` tuples
/// 6. bare strings, numbers and booleans
/// 7. ordered `[[key, value], ...]` sequences, folded into a map
///
/// Returns `None` for anything else.
#[must_use]
pub fn normalize(raw: &Value) -> Option<SelectOption> {
    shapes::MATCHERS.iter().find_map(|(name, matcher)| {
        let option = matcher(raw)?;
        tracing::trace!(shape = *name, "candidate normalized");
        Some(option)
    })
}

/// Normalizes a whole candidate list.
///
/// - an array is normalized element-wise, rejected entries are dropped
/// - a map is read as `label → value` pairs, sorted by label so the result
///   does not depend on map iteration order
/// - `null` yields an empty list
/// - any other value is treated as a one-element list
#[must_use]
pub fn normalize_list(raw: &Value) -> Vec<SelectOption> {
    let options: Vec<SelectOption> = match raw {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().filter_map(normalize_logged).collect(),
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            entries
                .into_iter()
                .filter_map(|(label, value)| {
                    normalize_logged(&Value::Array(vec![
                        Value::String(label.clone()),
                        value.clone(),
                    ]))
                })
                .collect()
        }
        other => normalize_logged(other).into_iter().collect(),
    };

    tracing::debug!(option_count = options.len(), "candidate list normalized");
    options
}

fn normalize_logged(raw: &Value) -> Option<SelectOption> {
    let option = normalize(raw);
    if option.is_none() {
        tracing::debug!(raw = %raw, "dropping candidate with unrecognized shape");
    }
    option
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn accepted() -> Vec<(Value, SelectOption)> {
        vec![
            (
                json!({"label": "Paris", "value": "par"}),
                SelectOption::new("Paris", json!("par")),
            ),
            (
                json!({"label": 7, "value": 7}),
                SelectOption::new("7", json!(7)),
            ),
            (
                json!({
                    "label": "Rome",
                    "value": "rom",
                    "disabled": true,
                    "sticky": true,
                    "tag_label": "RM"
                }),
                SelectOption::new("Rome", json!("rom"))
                    .with_disabled(true)
                    .with_sticky(true)
                    .with_tag_label(Some("RM".to_string())),
            ),
            (
                json!({"key": "Oslo", "value": 3}),
                SelectOption::new("Oslo", json!(3)),
            ),
            (
                json!({"value": "lima", "sticky": true}),
                SelectOption::new("lima", json!("lima")).with_sticky(true),
            ),
            (
                json!({"value": 12.5}),
                SelectOption::new("12.5", json!(12.5)),
            ),
            (
                json!(["Madrid", "mad"]),
                SelectOption::new("Madrid", json!("mad")),
            ),
            (
                json!(["Nested", {"id": 1}]),
                SelectOption::new("Nested", json!({"id": 1})),
            ),
            (
                json!(["Kyiv", "kyi", true]),
                SelectOption::new("Kyiv", json!("kyi")).with_disabled(true),
            ),
            (json!("plain"), SelectOption::new("plain", json!("plain"))),
            (json!(42), SelectOption::new("42", json!(42))),
            (json!(true), SelectOption::new("true", json!(true))),
            (
                json!([["label", "Quito"], ["value", "uio"]]),
                SelectOption::new("Quito", json!("uio")),
            ),
            (
                json!([["value", "x"], ["disabled", true]]),
                SelectOption::new("x", json!("x")).with_disabled(true),
            ),
        ]
    }

    #[test]
    fn accepts_every_documented_shape() {
        for (raw, expected) in accepted() {
            assert_eq!(normalize(&raw), Some(expected), "input: {raw}");
        }
    }

    #[test]
    fn rejects_unrecognized_shapes() {
        let rejected = [
            json!(null),
            json!({}),
            json!({"label": "no value"}),
            json!({"label": "null value", "value": null}),
            json!({"label": ["not", "scalar"], "value": 1}),
            json!({"value": {"nested": true}}),
            json!([]),
            json!(["only one"]),
            json!([{"a": 1}, "value"]),
            json!(["a", "b", "not a bool"]),
            json!(["a", "b", false, "too long"]),
            json!([["label", "x"], "stray"]),
        ];
        for raw in rejected {
            assert_eq!(normalize(&raw), None, "input: {raw}");
        }
    }

    #[test]
    fn label_takes_priority_over_key() {
        let option = normalize(&json!({"label": "L", "key": "K", "value": 1})).unwrap();
        assert_eq!(option.label(), "L");
    }

    #[test]
    fn normalization_is_idempotent() {
        for (raw, _) in accepted() {
            let once = normalize(&raw).unwrap();
            let twice = normalize(&once.to_raw()).unwrap();
            assert_eq!(once, twice, "input: {raw}");
        }
    }

    #[test]
    fn list_drops_rejected_entries() {
        let options = normalize_list(&json!(["a", null, {"nope": 1}, ["B", "b"]]));
        let labels: Vec<&str> = options.iter().map(SelectOption::label).collect();
        assert_eq!(labels, vec!["a", "B"]);
    }

    #[test]
    fn bulk_map_is_sorted_by_label() {
        let options =
            normalize_list(&json!({"Zurich": "zrh", "Amsterdam": "ams", "Lisbon": "lis"}));
        let labels: Vec<&str> = options.iter().map(SelectOption::label).collect();
        assert_eq!(labels, vec!["Amsterdam", "Lisbon", "Zurich"]);
        assert_eq!(options[0].value(), &json!("ams"));
    }

    #[test]
    fn null_and_scalar_lists() {
        assert!(normalize_list(&json!(null)).is_empty());
        assert_eq!(normalize_list(&json!("solo")).len(), 1);
    }
}
