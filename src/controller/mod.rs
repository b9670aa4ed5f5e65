//! Authoritative, server-side half of the component.
//!
//! The controller owns the selection and the candidate list. It is driven by
//! messages and never blocks; the interactive surface and the host only ever
//! see copies of its state.
//!
//! # Architecture
//!
//! - `messages`: Link protocol with trace context propagation
//! - `handler`: Controller state and message processing

pub mod handler;
pub mod messages;

pub use handler::SelectionController;
pub use messages::{
    ControllerMessage, HostEvent, Identifier, Outbound, SurfacePush, TraceContext, ValueFlavor,
};
