//! The authoritative selection and its mutation rules.
//!
//! [`Selection`] is an ordered list of options, unique by value. Every
//! mutation goes through a method that enforces the mode rules held in
//! [`SelectionPolicy`] and reports whether anything actually changed, so the
//! controller can decide whether a "selection changed" notification is due.
//! Rejections (limit reached, sticky entry, already selected) are plain
//! `false` returns, never errors.

use serde::{Deserialize, Serialize};

use super::option::{Mode, SelectOption};

/// Mode rules applied to every selection mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionPolicy {
    /// Selection cardinality and toggle semantics.
    pub mode: Mode,

    /// Maximum number of tags; `0` means unbounded. Ignored in single mode.
    pub max_selectable: usize,
}

impl SelectionPolicy {
    #[must_use]
    pub const fn new(mode: Mode, max_selectable: usize) -> Self {
        Self {
            mode,
            max_selectable,
        }
    }

    /// Whether a tag list of `len` entries has room for one more.
    #[must_use]
    pub const fn has_room(&self, len: usize) -> bool {
        self.max_selectable == 0 || len < self.max_selectable
    }
}

/// Ordered sequence of selected options, unique by value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(Vec<SelectOption>);

impl Selection {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds a selection from options that already satisfy the invariants.
    ///
    /// No checks are applied. Used by the recovery path, which replays a
    /// snapshot the user committed to before a disconnect.
    #[must_use]
    pub fn from_trusted(options: Vec<SelectOption>) -> Self {
        Self(options)
    }

    /// Builds a selection from arbitrary options, dropping later duplicates
    /// and keeping at most one entry in single mode.
    #[must_use]
    pub fn from_options(options: impl IntoIterator<Item = SelectOption>, mode: Mode) -> Self {
        let mut selection = Self::new();
        for option in options {
            if !selection.contains(&option) {
                selection.0.push(option);
            }
        }
        if !mode.is_multi() {
            selection.0.truncate(1);
        }
        selection
    }

    #[must_use]
    pub fn as_slice(&self) -> &[SelectOption] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SelectOption> {
        self.0.iter()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SelectOption> {
        self.0.get(index)
    }

    #[must_use]
    pub fn first(&self) -> Option<&SelectOption> {
        self.0.first()
    }

    /// Whether an option with the same value is selected.
    #[must_use]
    pub fn contains(&self, option: &SelectOption) -> bool {
        self.position(option).is_some()
    }

    #[must_use]
    pub fn position(&self, option: &SelectOption) -> Option<usize> {
        self.0.iter().position(|selected| selected.same_as(option))
    }

    /// Index of the most recently added entry that is not sticky.
    #[must_use]
    pub fn last_removable(&self) -> Option<usize> {
        self.0.iter().rposition(|selected| !selected.is_sticky())
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<SelectOption> {
        self.0
    }

    /// Applies the mode-specific "add" rule for `option`.
    ///
    /// - single: replaces the selection unconditionally
    /// - tags: appends unless already selected or the limit is reached
    /// - quick tags: a selected non-sticky option is toggled off, a selected
    ///   sticky option is left alone, otherwise appends like tags
    ///
    /// Returns `true` when the selection changed.
    pub fn add(&mut self, option: SelectOption, policy: &SelectionPolicy) -> bool {
        match policy.mode {
            Mode::Single => {
                self.0 = vec![option];
                true
            }
            Mode::Tags => {
                if self.contains(&option) {
                    return false;
                }
                self.append_with_limit(option, policy)
            }
            Mode::QuickTags => match self.position(&option) {
                Some(index) if self.0[index].is_sticky() => false,
                Some(index) => {
                    self.0.remove(index);
                    true
                }
                None => self.append_with_limit(option, policy),
            },
        }
    }

    fn append_with_limit(&mut self, option: SelectOption, policy: &SelectionPolicy) -> bool {
        if !policy.has_room(self.0.len()) {
            tracing::debug!(
                max_selectable = policy.max_selectable,
                "selection limit reached"
            );
            return false;
        }
        self.0.push(option);
        true
    }

    /// Removes the entry at `index` unless it is sticky or out of range.
    pub fn remove(&mut self, index: usize) -> bool {
        match self.0.get(index) {
            Some(option) if !option.is_sticky() => {
                self.0.remove(index);
                true
            }
            _ => false,
        }
    }

    /// Removes every non-sticky entry.
    ///
    /// Returns `true` when at least one entry was removed.
    pub fn clear(&mut self) -> bool {
        let before = self.0.len();
        self.0.retain(SelectOption::is_sticky);
        self.0.len() != before
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a SelectOption;
    type IntoIter = std::slice::Iter<'a, SelectOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn opt(value: &str) -> SelectOption {
        SelectOption::new(value.to_uppercase(), json!(value))
    }

    fn values(selection: &Selection) -> Vec<&str> {
        selection
            .iter()
            .filter_map(|o| o.value().as_str())
            .collect()
    }

    #[test]
    fn single_mode_replaces() {
        let policy = SelectionPolicy::new(Mode::Single, 0);
        let mut selection = Selection::new();
        assert!(selection.add(opt("a"), &policy));
        assert!(selection.add(opt("b"), &policy));
        assert_eq!(values(&selection), vec!["b"]);
    }

    #[test]
    fn tags_respects_limit_and_duplicates() {
        let policy = SelectionPolicy::new(Mode::Tags, 2);
        let mut selection = Selection::new();
        assert!(selection.add(opt("a"), &policy));
        assert!(!selection.add(opt("a"), &policy));
        assert!(selection.add(opt("b"), &policy));
        assert!(!selection.add(opt("c"), &policy));
        assert_eq!(values(&selection), vec!["a", "b"]);
    }

    #[test]
    fn tags_unbounded_when_limit_is_zero() {
        let policy = SelectionPolicy::new(Mode::Tags, 0);
        let mut selection = Selection::new();
        for v in ["a", "b", "c", "d", "e"] {
            assert!(selection.add(opt(v), &policy));
        }
        assert_eq!(selection.len(), 5);
    }

    #[test]
    fn quick_tags_toggles_non_sticky() {
        let policy = SelectionPolicy::new(Mode::QuickTags, 0);
        let mut selection = Selection::new();
        assert!(selection.add(opt("a"), &policy));
        assert!(selection.add(opt("a"), &policy));
        assert!(selection.is_empty());
    }

    #[test]
    fn quick_tags_keeps_sticky() {
        let policy = SelectionPolicy::new(Mode::QuickTags, 0);
        let mut selection = Selection::from_trusted(vec![opt("a").with_sticky(true)]);
        assert!(!selection.add(opt("a"), &policy));
        assert_eq!(values(&selection), vec!["a"]);
    }

    #[test]
    fn remove_and_clear_spare_sticky_entries() {
        let mut selection = Selection::from_trusted(vec![
            opt("a").with_sticky(true),
            opt("b"),
            opt("c"),
        ]);
        assert!(!selection.remove(0));
        assert!(!selection.remove(7));
        assert!(selection.remove(1));
        assert_eq!(values(&selection), vec!["a", "c"]);

        assert!(selection.clear());
        assert_eq!(values(&selection), vec!["a"]);
        assert!(!selection.clear());
    }

    #[test]
    fn last_removable_skips_sticky_tail() {
        let selection = Selection::from_trusted(vec![
            opt("a"),
            opt("b"),
            opt("c").with_sticky(true),
        ]);
        assert_eq!(selection.last_removable(), Some(1));
        assert_eq!(Selection::new().last_removable(), None);
    }

    #[test]
    fn from_options_dedups_and_truncates_single() {
        let tags = Selection::from_options(vec![opt("a"), opt("b"), opt("a")], Mode::Tags);
        assert_eq!(values(&tags), vec!["a", "b"]);

        let single = Selection::from_options(vec![opt("a"), opt("b")], Mode::Single);
        assert_eq!(values(&single), vec!["a"]);
    }
}
