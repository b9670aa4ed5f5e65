//! Render-ready view of the surface.
//!
//! These structures are computed from [`SurfaceState`](super::SurfaceState)
//! and contain everything a renderer needs, already resolved: which entry is
//! active, which candidates are selected, which characters to highlight. No
//! markup is produced here.

use serde::Serialize;

/// Complete view of one component instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurfaceView {
    /// Current input text.
    pub input: String,

    /// Placeholder to show, only when the input is empty.
    pub placeholder: Option<String>,

    pub dropdown_open: bool,

    /// Dropdown entries; empty while the dropdown is closed.
    pub entries: Vec<DropdownEntry>,

    /// Selected tags; always empty in single mode.
    pub tags: Vec<TagView>,

    /// Whether a clear control should be offered.
    pub show_clear: bool,

    pub disabled: bool,

    /// `false` between a transport drop and the following reconnect.
    pub connected: bool,
}

/// One candidate in the dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownEntry {
    pub label: String,
    pub is_active: bool,
    pub is_selected: bool,
    pub is_disabled: bool,

    /// `(start, end)` character ranges (exclusive end) matching the input.
    pub highlight_ranges: Vec<(usize, usize)>,
}

/// One selected tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagView {
    /// Tag label, falling back to the option label.
    pub label: String,

    /// `false` for sticky entries.
    pub removable: bool,
}
