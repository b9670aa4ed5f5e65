//! Domain layer for the selection component.
//!
//! Core types shared by the controller, the interactive surface, the
//! normalizer and the codec, independent of any transport or runtime.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`option`]: The canonical option model and selection modes
//! - [`selection`]: The authoritative selection and its mutation rules
//!
//! # Examples
//!
//! ```
//! use liveselect::domain::{Mode, Selection, SelectionPolicy, SelectOption};
//! use serde_json::json;
//!
//! let policy = SelectionPolicy::new(Mode::Tags, 2);
//! let mut selection = Selection::new();
//! selection.add(SelectOption::new("A", json!("a")), &policy);
//! assert_eq!(selection.len(), 1);
//! ```

pub mod error;
pub mod option;
pub mod selection;

pub use error::{LiveSelectError, Result};
pub use option::{scalar_text, Mode, SelectOption};
pub use selection::{Selection, SelectionPolicy};
