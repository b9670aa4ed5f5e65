//! Ordered, JSON-serialized message link.

use std::collections::VecDeque;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::error::{LiveSelectError, Result};

/// One direction of the connection between surface and controller.
///
/// Messages are serialized on [`post`](Self::post) and deserialized on
/// [`recv`](Self::recv), exactly as they would be on a real socket, and are
/// delivered in the order they were posted. A disconnect drops everything in
/// flight.
#[derive(Debug)]
pub struct Link<T> {
    name: &'static str,
    queue: VecDeque<String>,
    connected: bool,
    _message: PhantomData<fn() -> T>,
}

impl<T> Link<T>
where
    T: Serialize + DeserializeOwned,
{
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            queue: VecDeque::new(),
            connected: true,
            _message: PhantomData,
        }
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    /// Number of messages waiting to be received.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.queue.len()
    }

    /// Serializes and enqueues `message`.
    ///
    /// # Errors
    ///
    /// Returns [`LiveSelectError::Transport`] while disconnected and
    /// [`LiveSelectError::Protocol`] if the message cannot be serialized.
    pub fn post(&mut self, message: &T) -> Result<()> {
        if !self.connected {
            return Err(LiveSelectError::Transport(format!("{} link is disconnected", self.name)));
        }
        let payload = serde_json::to_string(message)
            .map_err(|e| LiveSelectError::Protocol(format!("{} link: {e}", self.name)))?;
        tracing::trace!(link = self.name, payload_len = payload.len(), "message posted");
        self.queue.push_back(payload);
        Ok(())
    }

    /// Dequeues and deserializes the oldest message.
    ///
    /// # Errors
    ///
    /// Returns [`LiveSelectError::Protocol`] if the payload does not decode;
    /// the broken payload is discarded.
    pub fn recv(&mut self) -> Result<Option<T>> {
        let Some(payload) = self.queue.pop_front() else {
            return Ok(None);
        };
        serde_json::from_str(&payload)
            .map(Some)
            .map_err(|e| LiveSelectError::Protocol(format!("{} link: {e}", self.name)))
    }

    /// Drops the connection and everything in flight.
    pub fn disconnect(&mut self) {
        let dropped = self.queue.len();
        self.queue.clear();
        self.connected = false;
        tracing::debug!(link = self.name, dropped, "link disconnected");
    }

    pub fn reconnect(&mut self) {
        self.connected = true;
        tracing::debug!(link = self.name, "link reconnected");
    }
}
