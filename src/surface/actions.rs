//! Side effects requested by the surface's event handler.
//!
//! The handler itself is pure state manipulation; anything that leaves the
//! surface (messages to the controller, timers) comes back as an [`Action`]
//! for the runtime to execute in order.

use super::debounce::TimerHandle;
use crate::controller::ControllerMessage;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Sends a message over the link to the controller.
    PostToController(ControllerMessage),

    /// Arms a one-shot timer that reports back with `TimerFired { handle }`.
    ArmTimer {
        handle: TimerHandle,
        delay_ms: u64,
    },

    /// Cancels a previously armed timer. Cancelling an unknown or already
    /// fired handle is harmless.
    CancelTimer(TimerHandle),
}
