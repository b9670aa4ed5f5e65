//! Deterministic runtime wiring one surface to one controller.
//!
//! A [`Session`] owns both halves of a component instance, the two link
//! directions between them, the host's [`SearchHandler`] and a virtual clock
//! with a timer wheel. It executes surface actions, pumps both links until
//! nothing is in flight, and records every [`HostEvent`] the controller emits.
//!
//! Time only moves through [`Session::advance_to`], which makes debounce
//! behavior reproducible in tests. Transport drops are simulated with
//! [`Session::disconnect`] and [`Session::reconnect`]; a reconnect mounts a
//! fresh controller, as a restarted server process would.

use std::collections::BTreeMap;

use serde_json::Value;

use super::Link;
use crate::codec::FormField;
use crate::controller::{
    ControllerMessage, HostEvent, Outbound, SelectionController, SurfacePush, ValueFlavor,
};
use crate::domain::error::Result;
use crate::search::SearchHandler;
use crate::surface::{handle_event, Action, Event, SurfaceState, SurfaceView, TimerHandle};
use crate::Config;

/// When the host answers search requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplyMode {
    /// Answer inside the same pump, before anything else is processed.
    #[default]
    Immediate,

    /// Queue requests until [`Session::answer_search`] is called.
    Deferred,
}

/// A pending host search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub text: String,
    pub component_id: String,
    pub field_name: String,
}

pub struct Session<H: SearchHandler> {
    config: Config,
    initial_value: Value,
    surface: SurfaceState,
    controller: SelectionController,
    handler: H,
    uplink: Link<ControllerMessage>,
    downlink: Link<SurfacePush>,
    timers: BTreeMap<TimerHandle, u64>,
    now_ms: u64,
    reply_mode: ReplyMode,
    pending_searches: Vec<SearchRequest>,
    host_events: Vec<HostEvent>,
}

impl<H: SearchHandler> Session<H> {
    /// Mounts a component: the controller is seeded from `initial_value` and
    /// the surface starts from the controller's selection.
    pub fn new(config: Config, initial_value: Value, handler: H) -> Self {
        let controller = SelectionController::mount(config.clone(), &initial_value);
        let surface = SurfaceState::new(config.clone(), controller.selection().clone());
        tracing::debug!(
            field_name = %config.field_name,
            mode = %config.mode,
            initial_len = controller.selection().len(),
            "component mounted"
        );

        Self {
            config,
            initial_value,
            surface,
            controller,
            handler,
            uplink: Link::new("uplink"),
            downlink: Link::new("downlink"),
            timers: BTreeMap::new(),
            now_ms: 0,
            reply_mode: ReplyMode::Immediate,
            pending_searches: Vec::new(),
            host_events: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_reply_mode(mut self, reply_mode: ReplyMode) -> Self {
        self.reply_mode = reply_mode;
        self
    }

    #[must_use]
    pub const fn now(&self) -> u64 {
        self.now_ms
    }

    #[must_use]
    pub const fn surface(&self) -> &SurfaceState {
        &self.surface
    }

    #[must_use]
    pub const fn controller(&self) -> &SelectionController {
        &self.controller
    }

    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    #[must_use]
    pub fn view(&self) -> SurfaceView {
        self.surface.compute_viewmodel()
    }

    #[must_use]
    pub fn form_field(&self) -> FormField {
        self.controller.form_field()
    }

    /// Every host event emitted so far, oldest first.
    #[must_use]
    pub fn host_events(&self) -> &[HostEvent] {
        &self.host_events
    }

    pub fn take_host_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.host_events)
    }

    /// Search requests waiting for [`answer_search`](Self::answer_search).
    #[must_use]
    pub fn pending_searches(&self) -> &[SearchRequest] {
        &self.pending_searches
    }

    /// Number of armed timers.
    #[must_use]
    pub fn armed_timers(&self) -> usize {
        self.timers.len()
    }

    /// Delivers a surface event and runs everything it causes.
    ///
    /// Returns whether the surface asked for a re-render.
    ///
    /// # Errors
    ///
    /// Propagates errors from the surface's event handler. Transport errors
    /// are logged and swallowed.
    pub fn dispatch(&mut self, event: Event) -> Result<bool> {
        let (render, actions) = handle_event(&mut self.surface, &event)?;
        self.execute(actions);
        let pushed = self.pump()?;
        Ok(render || pushed)
    }

    /// Moves the clock forward to `t_ms`, firing due timers in deadline order.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub fn advance_to(&mut self, t_ms: u64) -> Result<bool> {
        let mut render = false;
        while let Some((handle, deadline)) = self.next_due(t_ms) {
            self.timers.remove(&handle);
            self.now_ms = self.now_ms.max(deadline);
            tracing::trace!(handle = handle.get(), at_ms = self.now_ms, "timer fired");
            render |= self.dispatch(Event::TimerFired { handle })?;
        }
        self.now_ms = self.now_ms.max(t_ms);
        Ok(render)
    }

    /// Moves the clock forward by `ms`.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub fn advance_by(&mut self, ms: u64) -> Result<bool> {
        self.advance_to(self.now_ms.saturating_add(ms))
    }

    fn next_due(&self, t_ms: u64) -> Option<(TimerHandle, u64)> {
        self.timers
            .iter()
            .filter(|&(_, deadline)| *deadline <= t_ms)
            .min_by_key(|&(handle, deadline)| (*deadline, *handle))
            .map(|(handle, deadline)| (*handle, *deadline))
    }

    /// Host-initiated selection value, in either flavor.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub fn set_value(&mut self, value: Value, flavor: ValueFlavor) -> Result<bool> {
        self.deliver(ControllerMessage::set_value(value, flavor))
    }

    /// Host-initiated candidate list, outside of any search request.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub fn set_options(&mut self, raw: Value) -> Result<bool> {
        self.deliver(ControllerMessage::set_options(raw))
    }

    /// Answers the deferred search request at `position` through the handler.
    ///
    /// Returns `Ok(false)` when there is no such request. Replies are applied
    /// whatever their age.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub fn answer_search(&mut self, position: usize) -> Result<bool> {
        if position >= self.pending_searches.len() {
            return Ok(false);
        }
        let request = self.pending_searches.remove(position);
        let raw = self
            .handler
            .search(&request.text, &request.component_id, &request.field_name);
        self.deliver(ControllerMessage::set_options(raw))
    }

    /// Drops the transport. In-flight messages and deferred searches are lost.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub fn disconnect(&mut self) -> Result<bool> {
        let _span =
            tracing::debug_span!("session_disconnect", field_name = %self.config.field_name)
                .entered();
        self.uplink.disconnect();
        self.downlink.disconnect();
        self.pending_searches.clear();
        self.dispatch(Event::Disconnected)
    }

    /// Re-establishes the transport against a freshly mounted controller and
    /// lets the surface recover.
    ///
    /// The surface drops its candidate copy and recovers a non-empty
    /// snapshot. With nothing to recover, the controller's mounted selection
    /// is pushed instead, so both halves agree afterwards.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub fn reconnect(&mut self) -> Result<bool> {
        let _span =
            tracing::debug_span!("session_reconnect", field_name = %self.config.field_name)
                .entered();
        self.controller = SelectionController::mount(self.config.clone(), &self.initial_value);
        self.uplink.reconnect();
        self.downlink.reconnect();

        let recovering = !self.surface.snapshot.is_empty();
        let mut render = self.dispatch(Event::Reconnected)?;
        if !recovering {
            let push = self.controller.selection_push();
            self.route(vec![push]);
            render |= self.pump()?;
        }
        Ok(render)
    }

    fn deliver(&mut self, message: ControllerMessage) -> Result<bool> {
        let outbound = self.controller.handle_message(message);
        self.route(outbound);
        self.pump()
    }

    fn execute(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::PostToController(message) => {
                    if let Err(e) = self.uplink.post(&message) {
                        tracing::warn!(
                            error = %e,
                            message_type = message.kind(),
                            "dropping message to controller"
                        );
                    }
                }
                Action::ArmTimer { handle, delay_ms } => {
                    self.timers.insert(handle, self.now_ms.saturating_add(delay_ms));
                }
                Action::CancelTimer(handle) => {
                    self.timers.remove(&handle);
                }
            }
        }
    }

    fn route(&mut self, outbound: Vec<Outbound>) {
        for message in outbound {
            match message {
                Outbound::Surface(push) => {
                    if let Err(e) = self.downlink.post(&push) {
                        tracing::warn!(error = %e, "dropping push to surface");
                    }
                }
                Outbound::Host(event) => self.record_host_event(event),
            }
        }
    }

    fn record_host_event(&mut self, event: HostEvent) {
        let request = match &event {
            HostEvent::SearchRequested {
                text,
                component_id,
                field_name,
            } => Some(SearchRequest {
                text: text.clone(),
                component_id: component_id.clone(),
                field_name: field_name.clone(),
            }),
            HostEvent::FormFieldChanged { .. } => None,
        };
        self.host_events.push(event);

        let Some(request) = request else {
            return;
        };
        match self.reply_mode {
            ReplyMode::Immediate => {
                let raw = self
                    .handler
                    .search(&request.text, &request.component_id, &request.field_name);
                let outbound = self.controller.handle_message(ControllerMessage::set_options(raw));
                self.route(outbound);
            }
            ReplyMode::Deferred => self.pending_searches.push(request),
        }
    }

    /// Drains both links until nothing is in flight.
    ///
    /// Returns whether any push asked the surface to re-render.
    fn pump(&mut self) -> Result<bool> {
        let mut render = false;
        loop {
            let mut progressed = false;

            while let Some(message) = self.recv_uplink() {
                progressed = true;
                let outbound = self.controller.handle_message(message);
                self.route(outbound);
            }

            while let Some(push) = self.recv_downlink() {
                progressed = true;
                let (rendered, actions) = handle_event(&mut self.surface, &Event::Push(push))?;
                render |= rendered;
                self.execute(actions);
            }

            if !progressed {
                return Ok(render);
            }
        }
    }

    fn recv_uplink(&mut self) -> Option<ControllerMessage> {
        loop {
            match self.uplink.recv() {
                Ok(message) => return message,
                Err(e) => tracing::warn!(error = %e, "discarding undecodable uplink message"),
            }
        }
    }

    fn recv_downlink(&mut self) -> Option<SurfacePush> {
        loop {
            match self.downlink.recv() {
                Ok(push) => return push,
                Err(e) => tracing::warn!(error = %e, "discarding undecodable downlink push"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Mode;
    use crate::search::FuzzyCatalog;
    use serde_json::json;

    fn session(mode: Mode) -> Session<FuzzyCatalog> {
        Session::new(
            Config {
                mode,
                debounce_ms: 50,
                ..Config::default()
            },
            Value::Null,
            FuzzyCatalog::from_labels(["Paris", "Parma", "Lima"]),
        )
    }

    #[test]
    fn typing_then_waiting_fills_the_dropdown() {
        let mut s = session(Mode::Single);
        s.dispatch(Event::Focus).unwrap();
        s.dispatch(Event::Input { text: "par".into() }).unwrap();
        assert!(s.surface().options.is_empty());
        assert_eq!(s.armed_timers(), 1);

        s.advance_to(49).unwrap();
        assert!(s.host_events().is_empty());

        s.advance_to(50).unwrap();
        assert_eq!(s.host_events().len(), 1);
        assert_eq!(s.surface().options.len(), 2);
        assert!(s.view().dropdown_open);
    }

    #[test]
    fn deferred_replies_wait_for_the_host() {
        let mut s = session(Mode::Single).with_reply_mode(ReplyMode::Deferred);
        s.dispatch(Event::Input { text: "lim".into() }).unwrap();
        s.advance_by(50).unwrap();
        assert_eq!(s.pending_searches().len(), 1);
        assert!(s.surface().options.is_empty());

        assert!(!s.answer_search(5).unwrap());
        s.answer_search(0).unwrap();
        assert_eq!(s.surface().options.len(), 1);
        assert!(s.pending_searches().is_empty());
    }

    #[test]
    fn surface_posts_are_dropped_while_disconnected() {
        let mut s = session(Mode::Tags);
        s.set_options(json!(["a", "b"])).unwrap();
        s.disconnect().unwrap();
        s.dispatch(Event::ClickOption(0)).unwrap();
        assert!(s.controller().selection().is_empty());
        assert!(!s.view().connected);
    }
}
