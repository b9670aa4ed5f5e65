//! Transport between the surface and the controller.
//!
//! - `link`: One ordered, JSON-serialized direction of the connection
//! - `session`: Runtime driving both halves, the timers and the host

pub mod link;
pub mod session;

pub use link::Link;
pub use session::{ReplyMode, SearchRequest, Session};
