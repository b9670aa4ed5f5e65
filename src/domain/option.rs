//! Canonical option model and selection modes.
//!
//! A [`SelectOption`] is the single representation every raw candidate is
//! coerced into by [`crate::normalize`]. Its `value` is the identity key: two
//! options with equal values are the same option whatever their labels say.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::error::LiveSelectError;

/// A single selectable candidate.
///
/// Options are immutable once constructed; the builder-style `with_*` methods
/// consume and return a new value.
///
/// # Examples
///
/// ```
/// use liveselect::SelectOption;
/// use serde_json::json;
///
/// let nyc = SelectOption::new("New York", json!("nyc")).with_sticky(true);
/// assert_eq!(nyc.label(), "New York");
/// assert!(nyc.is_sticky());
/// assert!(nyc.same_as(&SelectOption::new("NYC", json!("nyc"))));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    label: String,
    value: Value,
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    sticky: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag_label: Option<String>,
}

impl SelectOption {
    /// Creates an enabled, non-sticky option.
    #[must_use]
    pub fn new(label: impl Into<String>, value: Value) -> Self {
        Self {
            label: label.into(),
            value,
            disabled: false,
            sticky: false,
            tag_label: None,
        }
    }

    /// Creates an option whose label is the textual form of its value.
    ///
    /// Returns `None` when the value has no scalar text form (null, arrays,
    /// objects).
    #[must_use]
    pub fn from_scalar(value: Value) -> Option<Self> {
        let label = scalar_text(&value)?;
        Some(Self::new(label, value))
    }

    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    #[must_use]
    pub fn with_sticky(mut self, sticky: bool) -> Self {
        self.sticky = sticky;
        self
    }

    #[must_use]
    pub fn with_tag_label(mut self, tag_label: Option<String>) -> Self {
        self.tag_label = tag_label;
        self
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    #[must_use]
    pub const fn is_sticky(&self) -> bool {
        self.sticky
    }

    #[must_use]
    pub fn tag_label(&self) -> Option<&str> {
        self.tag_label.as_deref()
    }

    /// Label shown for this option when it is rendered as a tag.
    #[must_use]
    pub fn display_tag(&self) -> &str {
        self.tag_label.as_deref().unwrap_or(&self.label)
    }

    /// Identity comparison: equal `value`, labels ignored.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.value == other.value
    }

    /// Converts the option back into the raw map shape the normalizer accepts.
    ///
    /// `normalize(option.to_raw())` yields an option equal to `option`.
    #[must_use]
    pub fn to_raw(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("label".to_string(), Value::String(self.label.clone()));
        map.insert("value".to_string(), self.value.clone());
        map.insert("disabled".to_string(), Value::Bool(self.disabled));
        map.insert("sticky".to_string(), Value::Bool(self.sticky));
        if let Some(tag_label) = &self.tag_label {
            map.insert("tag_label".to_string(), Value::String(tag_label.clone()));
        }
        Value::Object(map)
    }
}

/// Textual form of a scalar JSON value.
///
/// Strings are returned verbatim; numbers and booleans are rendered the way
/// `serde_json` prints them. Null, arrays and objects have no scalar text.
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Selection cardinality and interaction semantics.
///
/// Fixed for the lifetime of a component instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// At most one selected option; selecting replaces it.
    #[default]
    Single,

    /// Many options; re-selecting a selected option is a no-op.
    Tags,

    /// Many options; re-selecting a non-sticky selected option removes it.
    QuickTags,
}

impl Mode {
    /// Whether this mode holds a list of tags rather than a single value.
    #[must_use]
    pub const fn is_multi(self) -> bool {
        matches!(self, Self::Tags | Self::QuickTags)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Single => "single",
            Self::Tags => "tags",
            Self::QuickTags => "quick_tags",
        };
        f.write_str(name)
    }
}

impl FromStr for Mode {
    type Err = LiveSelectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "single" => Ok(Self::Single),
            "tags" => Ok(Self::Tags),
            "quick_tags" => Ok(Self::QuickTags),
            other => Err(LiveSelectError::Config(format!("unknown mode: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identity_ignores_label() {
        let a = SelectOption::new("A", json!(1));
        let b = SelectOption::new("completely different", json!(1));
        assert!(a.same_as(&b));
        assert!(!a.same_as(&SelectOption::new("A", json!("1"))));
    }

    #[test]
    fn display_tag_prefers_tag_label() {
        let plain = SelectOption::new("Berlin", json!("ber"));
        assert_eq!(plain.display_tag(), "Berlin");

        let tagged = plain.with_tag_label(Some("BER".to_string()));
        assert_eq!(tagged.display_tag(), "BER");
    }

    #[test]
    fn from_scalar_rejects_containers() {
        assert_eq!(
            SelectOption::from_scalar(json!(42)),
            Some(SelectOption::new("42", json!(42)))
        );
        assert!(SelectOption::from_scalar(json!(null)).is_none());
        assert!(SelectOption::from_scalar(json!([1, 2])).is_none());
    }

    #[test]
    fn mode_parses_and_prints() {
        for mode in [Mode::Single, Mode::Tags, Mode::QuickTags] {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
        assert!("multi".parse::<Mode>().is_err());
        assert!(Mode::QuickTags.is_multi());
        assert!(!Mode::Single.is_multi());
    }
}
