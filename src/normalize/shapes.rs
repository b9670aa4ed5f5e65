//! Shape matchers for raw candidate data.
//!
//! Each matcher recognizes exactly one input shape and returns `None` for
//! everything else. [`MATCHERS`] lists them in priority order; the first one
//! that returns `Some` decides the result.

use serde_json::{Map, Value};

use crate::domain::{scalar_text, SelectOption};

/// A single shape recognizer.
pub type ShapeMatcher = fn(&Value) -> Option<SelectOption>;

/// All matchers, highest priority first, paired with a name for tracing.
pub const MATCHERS: &[(&str, ShapeMatcher)] = &[
    ("label_value_map", label_value_map),
    ("key_value_map", key_value_map),
    ("value_map", value_map),
    ("pair", pair),
    ("triple", triple),
    ("scalar", scalar),
    ("keyword_list", keyword_list),
];

/// Matchers that apply to map-shaped input, used again after a keyword list
/// has been folded into a map.
const MAP_MATCHERS: &[ShapeMatcher] = &[label_value_map, key_value_map, value_map];

/// `{"label": ..., "value": ..., ...}`
fn label_value_map(raw: &Value) -> Option<SelectOption> {
    let map = raw.as_object()?;
    let label = scalar_text(map.get("label")?)?;
    let value = identity_value(map)?;
    Some(with_flags(SelectOption::new(label, value), map))
}

/// `{"key": ..., "value": ..., ...}` where `key` stands in for `label`.
fn key_value_map(raw: &Value) -> Option<SelectOption> {
    let map = raw.as_object()?;
    if map.contains_key("label") {
        return None;
    }
    let label = scalar_text(map.get("key")?)?;
    let value = identity_value(map)?;
    Some(with_flags(SelectOption::new(label, value), map))
}

/// `{"value": ..., ...}` where the value doubles as the label.
fn value_map(raw: &Value) -> Option<SelectOption> {
    let map = raw.as_object()?;
    if map.contains_key("label") || map.contains_key("key") {
        return None;
    }
    let value = identity_value(map)?;
    let label = scalar_text(&value)?;
    Some(with_flags(SelectOption::new(label, value), map))
}

/// `[label, value]`
fn pair(raw: &Value) -> Option<SelectOption> {
    match raw.as_array()?.as_slice() {
        [label, value] if !value.is_null() => {
            Some(SelectOption::new(scalar_text(label)?, value.clone()))
        }
        _ => None,
    }
}

/// `[label, value, disabled]`
fn triple(raw: &Value) -> Option<SelectOption> {
    match raw.as_array()?.as_slice() {
        [label, value, Value::Bool(disabled)] if !value.is_null() => Some(
            SelectOption::new(scalar_text(label)?, value.clone()).with_disabled(*disabled),
        ),
        _ => None,
    }
}

/// A bare string, number or boolean used as both label and value.
fn scalar(raw: &Value) -> Option<SelectOption> {
    SelectOption::from_scalar(raw.clone())
}

/// `[["label", ...], ["value", ...], ...]`, an ordered key/value sequence
/// equivalent to a map. Later keys override earlier ones.
fn keyword_list(raw: &Value) -> Option<SelectOption> {
    let entries = raw.as_array()?;
    if entries.is_empty() {
        return None;
    }

    let mut map = Map::new();
    for entry in entries {
        match entry.as_array()?.as_slice() {
            [Value::String(key), value] => {
                map.insert(key.clone(), value.clone());
            }
            _ => return None,
        }
    }

    let folded = Value::Object(map);
    MAP_MATCHERS.iter().find_map(|matcher| matcher(&folded))
}

fn identity_value(map: &Map<String, Value>) -> Option<Value> {
    map.get("value").filter(|v| !v.is_null()).cloned()
}

fn with_flags(option: SelectOption, map: &Map<String, Value>) -> SelectOption {
    let flag = |name: &str| map.get(name).and_then(Value::as_bool).unwrap_or(false);
    let tag_label = map
        .get("tag_label")
        .and_then(Value::as_str)
        .map(str::to_string);

    option
        .with_disabled(flag("disabled"))
        .with_sticky(flag("sticky"))
        .with_tag_label(tag_label)
}
