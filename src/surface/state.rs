//! Surface state and view model computation.
//!
//! [`SurfaceState`] is the client-side half of a component instance. It keeps
//! read-only copies of what the controller pushed (the candidate list and the
//! last selection snapshot) next to purely local state: the input text, focus,
//! connection status and the [`InteractionState`].
//!
//! Nothing in here mutates the selection. The snapshot only changes when the
//! controller pushes a new one.

use std::collections::BTreeSet;

use fuzzy_matcher::skim::SkimMatcherV2;

use super::debounce::Debouncer;
use super::viewmodel::{DropdownEntry, SurfaceView, TagView};
use crate::domain::{Mode, SelectOption, Selection};
use crate::Config;

/// Transient interaction state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionState {
    /// Highlighted candidate, as an index into the candidate list.
    pub active_index: Option<usize>,

    pub dropdown_open: bool,

    /// Text of the most recent keystroke.
    pub pending_search_text: Option<String>,

    /// Search debounce timer.
    pub debounce: Debouncer,
}

/// Client-side state of one component instance.
#[derive(Debug, Clone)]
pub struct SurfaceState {
    pub config: Config,

    /// Current input text.
    pub text: String,

    pub focused: bool,

    /// Whether the link to the controller is up.
    pub connected: bool,

    /// Copy of the controller's candidate list.
    pub options: Vec<SelectOption>,

    /// Last selection pushed by the controller.
    ///
    /// Replaced wholesale on every push and sent back verbatim for recovery
    /// after a reconnect.
    pub snapshot: Selection,

    pub interaction: InteractionState,
}

impl SurfaceState {
    /// Creates the surface for a freshly mounted component.
    ///
    /// # Parameters
    ///
    /// * `config` - Component configuration
    /// * `selection` - The controller's selection at mount time
    #[must_use]
    pub fn new(config: Config, selection: Selection) -> Self {
        let interaction = InteractionState {
            debounce: Debouncer::new(config.debounce_ms),
            ..InteractionState::default()
        };
        let mut state = Self {
            config,
            text: String::new(),
            focused: false,
            connected: true,
            options: Vec::new(),
            snapshot: selection,
            interaction,
        };
        state.sync_text_with_snapshot();
        state
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.config.mode
    }

    /// In single mode the input shows the selected label.
    pub fn sync_text_with_snapshot(&mut self) {
        if self.mode() == Mode::Single {
            self.text = self
                .snapshot
                .first()
                .map(|option| option.label().to_string())
                .unwrap_or_default();
        }
    }

    /// Whether the candidate at `index` can be activated.
    ///
    /// Disabled candidates never can. In plain tags mode candidates that are
    /// already selected are skipped too, since selecting them again does
    /// nothing there.
    #[must_use]
    pub fn is_selectable(&self, index: usize) -> bool {
        self.options.get(index).is_some_and(|option| {
            !option.is_disabled() && !(self.mode() == Mode::Tags && self.snapshot.contains(option))
        })
    }

    fn selectable_indices(&self) -> Vec<usize> {
        (0..self.options.len())
            .filter(|&index| self.is_selectable(index))
            .collect()
    }

    /// The highlighted candidate, if any.
    #[must_use]
    pub fn active_option(&self) -> Option<&SelectOption> {
        self.options.get(self.interaction.active_index?)
    }

    /// Moves the active entry to the next selectable candidate, wrapping to
    /// the first one after the end.
    pub fn move_active_down(&mut self) {
        let selectable = self.selectable_indices();
        let next = match self.interaction.active_index {
            Some(current) => selectable.iter().copied().find(|&i| i > current),
            None => None,
        };
        self.interaction.active_index = next.or_else(|| selectable.first().copied());
    }

    /// Moves the active entry to the previous selectable candidate, wrapping
    /// to the last one before the start.
    pub fn move_active_up(&mut self) {
        let selectable = self.selectable_indices();
        let previous = match self.interaction.active_index {
            Some(current) => selectable.iter().rev().copied().find(|&i| i < current),
            None => None,
        };
        self.interaction.active_index = previous.or_else(|| selectable.last().copied());
    }

    pub fn move_active_first(&mut self) {
        self.interaction.active_index = self.selectable_indices().first().copied();
    }

    pub fn move_active_last(&mut self) {
        self.interaction.active_index = self.selectable_indices().last().copied();
    }

    /// Closes the dropdown and forgets the active entry.
    pub fn close_dropdown(&mut self) {
        self.interaction.dropdown_open = false;
        self.interaction.active_index = None;
    }

    /// Opens the dropdown when there is something to show.
    pub fn open_dropdown(&mut self) {
        if !self.options.is_empty() {
            self.interaction.dropdown_open = true;
        }
    }

    /// Replaces the candidate copy and resets the interaction state.
    ///
    /// The pending debounce timer is left running: it belongs to a keystroke
    /// newer than the reply being applied.
    pub fn replace_options(&mut self, options: Vec<SelectOption>) {
        self.options = options;
        self.close_dropdown();
        if self.focused {
            self.open_dropdown();
        }
        tracing::debug!(
            option_count = self.options.len(),
            dropdown_open = self.interaction.dropdown_open,
            "candidate list replaced"
        );
    }

    /// Stores a new selection snapshot pushed by the controller.
    pub fn replace_snapshot(&mut self, selection: Selection) {
        self.snapshot = selection;

        match self.mode() {
            Mode::Single => {
                self.sync_text_with_snapshot();
                self.close_dropdown();
            }
            Mode::Tags => {
                self.text.clear();
                self.close_dropdown();
            }
            Mode::QuickTags => {
                self.text.clear();
                if let Some(index) = self.interaction.active_index {
                    if !self.is_selectable(index) {
                        self.interaction.active_index = None;
                    }
                }
            }
        }
    }

    /// Computes the render-ready view of the current state.
    ///
    /// Dropdown entries get fuzzy-match highlight ranges against the input
    /// text, one set per whitespace-separated token, merged and coalesced into
    /// contiguous runs.
    #[must_use]
    pub fn compute_viewmodel(&self) -> SurfaceView {
        let query = self.text.trim();
        let matcher = if query.is_empty() || !self.interaction.dropdown_open {
            None
        } else {
            Some(SkimMatcherV2::default())
        };

        let entries = if self.interaction.dropdown_open {
            self.options
                .iter()
                .enumerate()
                .map(|(index, option)| DropdownEntry {
                    label: option.label().to_string(),
                    is_active: self.interaction.active_index == Some(index),
                    is_selected: self.snapshot.contains(option),
                    is_disabled: option.is_disabled(),
                    highlight_ranges: matcher
                        .as_ref()
                        .map_or_else(Vec::new, |m| highlight_ranges(option.label(), query, m)),
                })
                .collect()
        } else {
            Vec::new()
        };

        let tags = if self.mode().is_multi() {
            self.snapshot
                .iter()
                .map(|option| TagView {
                    label: option.display_tag().to_string(),
                    removable: !option.is_sticky(),
                })
                .collect()
        } else {
            Vec::new()
        };

        let has_removable = self.snapshot.iter().any(|option| !option.is_sticky());
        let show_clear = !self.config.disabled
            && has_removable
            && (self.mode().is_multi() || self.config.allow_clear);

        SurfaceView {
            input: self.text.clone(),
            placeholder: if self.text.is_empty() {
                self.config.placeholder.clone()
            } else {
                None
            },
            dropdown_open: self.interaction.dropdown_open,
            entries,
            tags,
            show_clear,
            disabled: self.config.disabled,
            connected: self.connected,
        }
    }
}

/// Character ranges of `label` matched by the tokens of `query`.
fn highlight_ranges(label: &str, query: &str, matcher: &SkimMatcherV2) -> Vec<(usize, usize)> {
    use fuzzy_matcher::FuzzyMatcher;

    let matched: BTreeSet<usize> = query
        .split_whitespace()
        .filter_map(|token| matcher.fuzzy_indices(label, token))
        .flat_map(|(_score, indices)| indices)
        .collect();

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for index in matched {
        match ranges.last_mut() {
            Some((_, end)) if *end == index => *end = index + 1,
            _ => ranges.push((index, index + 1)),
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn state(mode: Mode) -> SurfaceState {
        let mut state = SurfaceState::new(
            Config {
                mode,
                ..Config::default()
            },
            Selection::new(),
        );
        state.options = vec![
            SelectOption::new("Amsterdam", json!("ams")),
            SelectOption::new("Berlin", json!("ber")).with_disabled(true),
            SelectOption::new("Cairo", json!("cai")),
            SelectOption::new("Dakar", json!("dkr")),
        ];
        state
    }

    #[test]
    fn navigation_skips_disabled_and_wraps() {
        let mut s = state(Mode::Single);
        s.move_active_down();
        assert_eq!(s.interaction.active_index, Some(0));
        s.move_active_down();
        assert_eq!(s.interaction.active_index, Some(2));
        s.move_active_down();
        s.move_active_down();
        assert_eq!(s.interaction.active_index, Some(0));
        s.move_active_up();
        assert_eq!(s.interaction.active_index, Some(3));
    }

    #[test]
    fn tags_mode_skips_selected_but_quick_tags_does_not() {
        let selected = Selection::from_trusted(vec![SelectOption::new("Amsterdam", json!("ams"))]);

        let mut tags = state(Mode::Tags);
        tags.snapshot = selected.clone();
        tags.move_active_first();
        assert_eq!(tags.interaction.active_index, Some(2));

        let mut quick = state(Mode::QuickTags);
        quick.snapshot = selected;
        quick.move_active_first();
        assert_eq!(quick.interaction.active_index, Some(0));
        quick.move_active_last();
        assert_eq!(quick.interaction.active_index, Some(3));
    }

    #[test]
    fn navigation_with_nothing_selectable() {
        let mut s = state(Mode::Single);
        s.options = vec![SelectOption::new("Off", json!(0)).with_disabled(true)];
        s.move_active_down();
        assert_eq!(s.interaction.active_index, None);
        s.move_active_up();
        assert_eq!(s.interaction.active_index, None);
    }

    #[test]
    fn highlight_ranges_are_coalesced() {
        let matcher = SkimMatcherV2::default();
        assert_eq!(highlight_ranges("Amsterdam", "ams", &matcher), vec![(0, 3)]);
        assert_eq!(highlight_ranges("Amsterdam", "ams dam", &matcher), vec![(0, 3), (6, 9)]);
        assert!(highlight_ranges("Cairo", "xyz", &matcher).is_empty());
    }

    #[test]
    fn viewmodel_reflects_state() {
        let mut s = state(Mode::Tags);
        s.config.placeholder = Some("Pick a city".into());
        s.snapshot = Selection::from_trusted(vec![
            SelectOption::new("Amsterdam", json!("ams")).with_tag_label(Some("AMS".into())),
            SelectOption::new("Cairo", json!("cai")).with_sticky(true),
        ]);

        let closed = s.compute_viewmodel();
        assert_eq!(closed.placeholder.as_deref(), Some("Pick a city"));
        assert!(closed.entries.is_empty());
        assert_eq!(
            closed.tags,
            vec![
                TagView { label: "AMS".into(), removable: true },
                TagView { label: "Cairo".into(), removable: false },
            ]
        );
        assert!(closed.show_clear);

        s.text = "dak".into();
        s.interaction.dropdown_open = true;
        s.interaction.active_index = Some(3);
        let open = s.compute_viewmodel();
        assert_eq!(open.placeholder, None);
        assert_eq!(open.entries.len(), 4);
        assert!(open.entries[0].is_selected);
        assert!(open.entries[1].is_disabled);
        assert!(open.entries[3].is_active);
        assert_eq!(open.entries[3].highlight_ranges, vec![(0, 3)]);
    }

    #[test]
    fn single_mode_clear_needs_allow_clear() {
        let mut s = state(Mode::Single);
        s.snapshot = Selection::from_trusted(vec![SelectOption::new("Cairo", json!("cai"))]);
        assert!(!s.compute_viewmodel().show_clear);
        s.config.allow_clear = true;
        assert!(s.compute_viewmodel().show_clear);
        assert!(s.compute_viewmodel().tags.is_empty());
    }

    #[test]
    fn snapshot_push_updates_text_per_mode() {
        let mut single = state(Mode::Single);
        single.text = "cai".into();
        single.interaction.dropdown_open = true;
        let cairo = Selection::from_trusted(vec![SelectOption::new("Cairo", json!("cai"))]);
        single.replace_snapshot(cairo.clone());
        assert_eq!(single.text, "Cairo");
        assert!(!single.interaction.dropdown_open);

        let mut quick = state(Mode::QuickTags);
        quick.text = "cai".into();
        quick.interaction.dropdown_open = true;
        quick.replace_snapshot(cairo);
        assert_eq!(quick.text, "");
        assert!(quick.interaction.dropdown_open);
    }
}
