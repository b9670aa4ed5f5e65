//! Liveselect: the state core of a searchable select component.
//!
//! A text input with a dropdown of candidates that come from a host-side
//! search, with three selection modes:
//! - `single`: one selected option
//! - `tags`: many options, shown as removable tags
//! - `quick_tags`: many options, clicking a selected candidate toggles it off
//!
//! Two state holders cooperate over a message link. The controller owns the
//! authoritative selection and candidate list and performs every mutation.
//! The surface owns transient interaction state (input text, highlighted
//! entry, debounce timer) and keeps a read-only snapshot of the selection
//! that it uses to recover a restarted controller.

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Demo host (main.rs)                                │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Runtime (transport/)                               │  ← Session, links,
//! │  - Timer wheel                                      │    virtual clock
//! │  - Host search handler                              │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Surface       │   │ Controller    │   │ Search        │
//! │ (surface/)    │   │ (controller/) │   │ (search.rs)   │
//! │ - Keyboard    │   │ - Selection   │   │ - Host seam   │
//! │ - Debounce    │   │ - Policy      │   │ - Fuzzy list  │
//! │ - View model  │   │ - Form field  │   │               │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain, normalizer and codec                       │
//! │  - Option / Selection / Mode (domain/)              │
//! │  - Raw host shapes → Option (normalize/)            │
//! │  - Option ↔ form text (codec/)                      │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │
//! │  - OpenTelemetry tracing                            │
//! │  - Rotating JSON span log                           │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`domain`]: Option, Selection, Mode and the error type
//! - [`normalize`]: Converts raw host option shapes into options
//! - [`codec`]: Form-field encoding of selections
//! - [`controller`]: Authoritative selection state and its messages
//! - [`surface`]: Interaction state machine and view model
//! - [`search`]: Host search seam and a fuzzy reference catalog
//! - [`transport`]: Links and the session runtime
//! - `observability`: OpenTelemetry tracing (internal)
//!
//! # Configuration
//!
//! Hosts pass string attributes, or a TOML file:
//!
//! ```toml
//! field_name = "city"
//! mode = "tags"
//! max_selectable = 3
//! debounce_ms = 150
//! trace_level = "debug"
//! ```
//!
//! # Example
//!
//! ```rust
//! use liveselect::search::FuzzyCatalog;
//! use liveselect::surface::Event;
//! use liveselect::{Config, Session};
//! use serde_json::Value;
//!
//! let catalog = FuzzyCatalog::from_labels(["Berlin", "Bern", "Boston"]);
//! let mut session = Session::new(Config::default(), Value::Null, catalog);
//!
//! session.dispatch(Event::Focus)?;
//! session.dispatch(Event::Input { text: "ber".to_string() })?;
//! session.advance_by(100)?;
//! session.dispatch(Event::ClickOption(0))?;
//!
//! assert_eq!(session.controller().selection().len(), 1);
//! # Ok::<(), liveselect::LiveSelectError>(())
//! ```
//!
//! # Key Design Decisions
//!
//! ## Pure state machines
//!
//! Both halves are plain structs driven by `handle_*` functions that return
//! what should happen next instead of doing it. The [`Session`] executes the
//! returned actions, which keeps timing and transport failures reproducible.
//!
//! ## Snapshot recovery
//!
//! The surface never edits its snapshot. It is replaced wholesale by
//! `SelectionChanged` pushes, and sent back verbatim after a reconnect.

pub mod codec;
pub mod controller;
pub mod domain;
pub mod normalize;
pub mod search;
pub mod surface;
pub mod transport;

pub mod observability;

pub use controller::{ControllerMessage, HostEvent, SelectionController, SurfacePush};
pub use domain::{LiveSelectError, Mode, Result, SelectOption, Selection};
pub use surface::{handle_event, Action, Event, Key, SurfaceState};
pub use transport::Session;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Component configuration.
///
/// Built from the string attributes a host template passes
/// ([`from_attributes`](Self::from_attributes)) or from a TOML document
/// ([`from_toml_str`](Self::from_toml_str), [`from_file`](Self::from_file)).
///
/// # Example
///
/// ```toml
/// field_name = "city"
/// component_id = "city_select"
/// mode = "quick_tags"
/// max_selectable = 2
/// user_defined_options = true
/// placeholder = "Pick cities"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Form field name. Multi modes submit it as `<field_name>[]`.
    pub field_name: String,

    /// Id echoed back to the host with every search request.
    pub component_id: String,

    pub mode: Mode,

    /// Tags limit. `0` means unbounded. Ignored in `single` mode.
    pub max_selectable: usize,

    /// Whether Enter turns typed text into a new option.
    pub user_defined_options: bool,

    /// Trailing debounce before a search is requested. Default: 100
    pub debounce_ms: u64,

    /// Input length, in characters, below which no search is requested.
    /// Default: 1
    pub min_search_length: usize,

    /// Whether `single` mode shows a clear button.
    pub allow_clear: bool,

    /// A disabled component ignores user input but still accepts pushes.
    pub disabled: bool,

    pub placeholder: Option<String>,

    /// Tracing filter directive.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error` or any `EnvFilter`
    /// directive. Default: `RUST_LOG`, then `"info"`
    pub trace_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            field_name: "live_select".to_string(),
            component_id: "live_select_component".to_string(),
            mode: Mode::Single,
            max_selectable: 0,
            user_defined_options: false,
            debounce_ms: 100,
            min_search_length: 1,
            allow_clear: false,
            disabled: false,
            placeholder: None,
            trace_level: None,
        }
    }
}

impl Config {
    /// Parses configuration from string attributes.
    ///
    /// Missing keys and values that do not parse fall back to the defaults.
    /// Booleans accept `true`/`false`; an attribute present with an empty
    /// value counts as `true`, the way HTML boolean attributes do.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use liveselect::{Config, Mode};
    ///
    /// let mut attributes = BTreeMap::new();
    /// attributes.insert("mode".to_string(), "tags".to_string());
    /// attributes.insert("max_selectable".to_string(), "3".to_string());
    /// attributes.insert("debounce_ms".to_string(), "soon".to_string());
    ///
    /// let config = Config::from_attributes(&attributes);
    /// assert_eq!(config.mode, Mode::Tags);
    /// assert_eq!(config.max_selectable, 3);
    /// assert_eq!(config.debounce_ms, 100);
    /// ```
    #[must_use]
    pub fn from_attributes(attributes: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();

        let text = |key: &str, default: String| {
            attributes
                .get(key)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map_or(default, String::from)
        };
        let flag = |key: &str, default: bool| match attributes.get(key).map(|s| s.trim()) {
            Some("" | "true") => true,
            Some("false") => false,
            _ => default,
        };

        let mode = attributes
            .get("mode")
            .and_then(|s| s.trim().parse::<Mode>().ok())
            .unwrap_or(defaults.mode);
        let max_selectable = attributes
            .get("max_selectable")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(defaults.max_selectable);
        let debounce_ms = attributes
            .get("debounce_ms")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(defaults.debounce_ms);
        let min_search_length = attributes
            .get("min_search_length")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(defaults.min_search_length);

        Self {
            field_name: text("field_name", defaults.field_name),
            component_id: text("component_id", defaults.component_id),
            mode,
            max_selectable,
            user_defined_options: flag("user_defined_options", defaults.user_defined_options),
            debounce_ms,
            min_search_length,
            allow_clear: flag("allow_clear", defaults.allow_clear),
            disabled: flag("disabled", defaults.disabled),
            placeholder: attributes.get("placeholder").cloned(),
            trace_level: attributes.get("trace_level").cloned(),
        }
        .normalized()
    }

    /// Parses a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`LiveSelectError::Toml`] for malformed TOML or mistyped keys.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        Ok(config.normalized())
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`LiveSelectError::Io`] if the file cannot be read and
    /// [`LiveSelectError::Toml`] if it does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    fn normalized(mut self) -> Self {
        if !self.mode.is_multi() {
            self.max_selectable = 0;
        }
        self
    }
}

/// Installs tracing and mounts a controller seeded with `initial_value`.
///
/// # Side Effects
///
/// - Initializes the OpenTelemetry tracing subscriber (first call only)
/// - Creates the trace data directory if it doesn't exist
///
/// # Example
///
/// ```rust
/// use liveselect::{initialize, Config};
/// use serde_json::json;
///
/// let controller = initialize(&Config::default(), &json!("Berlin"));
/// assert_eq!(controller.selection().len(), 1);
/// ```
pub fn initialize(config: &Config, initial_value: &serde_json::Value) -> SelectionController {
    observability::init_tracing(config);
    tracing::debug!(
        field_name = %config.field_name,
        mode = %config.mode,
        "initializing liveselect component"
    );

    SelectionController::mount(config.clone(), initial_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn attributes(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn empty_attributes_give_defaults() {
        assert_eq!(Config::from_attributes(&BTreeMap::new()), Config::default());
    }

    #[test]
    fn attributes_parse_typed_values() {
        let config = Config::from_attributes(&attributes(&[
            ("field_name", "city"),
            ("mode", "quick_tags"),
            ("max_selectable", "2"),
            ("user_defined_options", "true"),
            ("allow_clear", ""),
            ("min_search_length", "3"),
            ("placeholder", "Pick"),
        ]));

        assert_eq!(config.field_name, "city");
        assert_eq!(config.mode, Mode::QuickTags);
        assert_eq!(config.max_selectable, 2);
        assert!(config.user_defined_options);
        assert!(config.allow_clear);
        assert!(!config.disabled);
        assert_eq!(config.min_search_length, 3);
        assert_eq!(config.placeholder.as_deref(), Some("Pick"));
    }

    #[test]
    fn unparsable_attributes_fall_back() {
        let config = Config::from_attributes(&attributes(&[
            ("mode", "checkboxes"),
            ("debounce_ms", "-5"),
            ("disabled", "maybe"),
            ("field_name", "  "),
        ]));

        assert_eq!(config.mode, Mode::Single);
        assert_eq!(config.debounce_ms, 100);
        assert!(!config.disabled);
        assert_eq!(config.field_name, "live_select");
    }

    #[test]
    fn single_mode_ignores_max_selectable() {
        let config = Config::from_attributes(&attributes(&[("max_selectable", "4")]));
        assert_eq!(config.max_selectable, 0);
    }

    #[test]
    fn toml_fills_missing_keys() {
        let config = Config::from_toml_str("mode = \"tags\"\nmax_selectable = 2\n").unwrap();
        assert_eq!(
            config,
            Config {
                mode: Mode::Tags,
                max_selectable: 2,
                ..Config::default()
            }
        );
    }

    #[test]
    fn toml_type_errors_are_reported() {
        let err = Config::from_toml_str("debounce_ms = \"fast\"").unwrap_err();
        assert!(matches!(err, LiveSelectError::Toml(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "field_name = \"city\"\ndebounce_ms = 20").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.field_name, "city");
        assert_eq!(config.debounce_ms, 20);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, LiveSelectError::Io(_)));
    }
}
