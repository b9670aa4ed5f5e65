//! Interactive, client-side half of the component.
//!
//! The surface collects keystrokes, debounces searches, tracks the active
//! dropdown entry and renders from a local copy of the controller's state.
//! It follows a unidirectional flow:
//!
//! ```text
//! User input / pushes → Event → handle_event → state change → Actions
//!                                                                │
//!        controller ◄── PostToController ◄───────────────────────┤
//!        timer wheel ◄── ArmTimer / CancelTimer ◄────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effects emitted by the event handler
//! - [`debounce`]: Timer handle bookkeeping for trailing-edge debounce
//! - [`handler`]: Event processing
//! - [`state`]: Surface state and view model computation
//! - [`viewmodel`]: Render-ready view types

pub mod actions;
pub mod debounce;
pub mod handler;
pub mod state;
pub mod viewmodel;

pub use actions::Action;
pub use debounce::{Debouncer, TimerHandle};
pub use handler::{handle_event, Event, Key};
pub use state::{InteractionState, SurfaceState};
pub use viewmodel::{DropdownEntry, SurfaceView, TagView};
