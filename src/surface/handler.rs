//! Event handling for the interactive surface.
//!
//! [`handle_event`] is the surface's whole behavior: every keystroke, timer,
//! click and controller push arrives as an [`Event`], mutates
//! [`SurfaceState`], and yields the [`Action`]s the runtime must execute. The
//! returned flag says whether the view changed and should be re-rendered.
//!
//! The surface only ever *asks* for selection changes. Its snapshot is
//! replaced when the controller pushes the resulting selection back, so the
//! controller always wins when the two disagree.

use super::{Action, SurfaceState};
use crate::controller::{ControllerMessage, Identifier, SurfacePush};
use crate::domain::error::Result;
use crate::domain::Mode;

/// Keys with dedicated behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Home,
    End,
    Enter,
    Escape,
    Backspace,
}

/// Everything that can happen to the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Focus,
    Blur,

    /// The input text changed (one keystroke).
    Input { text: String },

    /// A timer armed through [`Action::ArmTimer`] elapsed.
    TimerFired { handle: super::TimerHandle },

    /// A key press. Text editing itself arrives as [`Event::Input`].
    Key(Key),

    /// Pointer selection of candidate `index`.
    ClickOption(usize),

    /// Pointer removal of the selected tag at `index`.
    RemoveTag(usize),

    ClearButton,

    /// State pushed by the controller.
    Push(SurfacePush),

    /// The transport to the controller dropped.
    Disconnected,

    /// The transport came back, connected to a fresh controller.
    Reconnected,
}

impl Event {
    /// Events originating from the user, ignored while disabled.
    #[must_use]
    pub const fn is_user_input(&self) -> bool {
        matches!(
            self,
            Self::Focus
                | Self::Input { .. }
                | Self::Key(_)
                | Self::ClickOption(_)
                | Self::RemoveTag(_)
                | Self::ClearButton
        )
    }
}

/// Processes an event, mutates surface state, and returns actions to execute.
///
/// # Parameters
///
/// * `state` - Surface state
/// * `event` - Event to process
///
/// # Returns
///
/// `(should_render, actions)`. Actions must be executed in order.
///
/// # Errors
///
/// Currently infallible; the `Result` keeps the runtime's error path uniform.
pub fn handle_event(state: &mut SurfaceState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("surface_handle_event", event_type = ?event).entered();

    if state.config.disabled && event.is_user_input() {
        tracing::debug!("component disabled, ignoring input");
        return Ok((false, vec![]));
    }

    match event {
        Event::Focus => {
            state.focused = true;
            state.open_dropdown();
            Ok((true, vec![]))
        }
        Event::Blur => {
            state.focused = false;
            state.close_dropdown();
            if state.mode() == Mode::Single && !state.snapshot.is_empty() {
                state.sync_text_with_snapshot();
            }
            Ok((true, vec![]))
        }
        Event::Input { text } => Ok((true, handle_input(state, text))),
        Event::TimerFired { handle } => {
            if !state.interaction.debounce.fire(*handle) {
                return Ok((false, vec![]));
            }
            let Some(text) = state.interaction.pending_search_text.take() else {
                return Ok((false, vec![]));
            };
            tracing::debug!(text = %text, "debounce elapsed, requesting search");
            Ok((false, vec![Action::PostToController(ControllerMessage::search(text))]))
        }
        Event::Key(key) => Ok(handle_key(state, *key)),
        Event::ClickOption(index) => {
            let Some(option) = state.options.get(*index) else {
                return Ok((false, vec![]));
            };
            if option.is_disabled() {
                return Ok((false, vec![]));
            }
            Ok((false, vec![select(Identifier::Index(*index))]))
        }
        Event::RemoveTag(index) => match state.snapshot.get(*index) {
            Some(option) if !option.is_sticky() => Ok((
                false,
                vec![Action::PostToController(ControllerMessage::remove(*index))],
            )),
            _ => Ok((false, vec![])),
        },
        Event::ClearButton => {
            if state.mode() == Mode::Single && !state.config.allow_clear {
                return Ok((false, vec![]));
            }
            if state.snapshot.iter().all(|option| option.is_sticky()) {
                return Ok((false, vec![]));
            }
            Ok((false, vec![Action::PostToController(ControllerMessage::clear())]))
        }
        Event::Push(SurfacePush::OptionsUpdated { options }) => {
            state.replace_options(options.clone());
            Ok((true, vec![]))
        }
        Event::Push(SurfacePush::SelectionChanged { selection }) => {
            tracing::debug!(selection_len = selection.len(), "selection snapshot updated");
            state.replace_snapshot(selection.clone());
            Ok((true, vec![]))
        }
        Event::Disconnected => {
            tracing::debug!("link to controller dropped");
            state.connected = false;
            Ok((true, vec![]))
        }
        Event::Reconnected => {
            state.connected = true;
            // candidate indices refer to the previous controller's list
            state.replace_options(Vec::new());
            if state.snapshot.is_empty() {
                tracing::debug!("reconnected with empty snapshot, nothing to recover");
                return Ok((true, vec![]));
            }
            tracing::debug!(
                snapshot_len = state.snapshot.len(),
                "reconnected, sending recovery snapshot"
            );
            let snapshot = state.snapshot.as_slice().to_vec();
            Ok((
                true,
                vec![Action::PostToController(ControllerMessage::recover(snapshot))],
            ))
        }
    }
}

/// One keystroke: restart the debounce, or close the dropdown when the text
/// is too short to search for.
fn handle_input(state: &mut SurfaceState, text: &str) -> Vec<Action> {
    state.text = text.to_string();
    state.interaction.pending_search_text = Some(text.to_string());

    let mut actions = vec![];
    if text.chars().count() >= state.config.min_search_length {
        let (replaced, handle) = state.interaction.debounce.restart();
        if let Some(replaced) = replaced {
            actions.push(Action::CancelTimer(replaced));
        }
        actions.push(Action::ArmTimer {
            handle,
            delay_ms: state.interaction.debounce.delay_ms(),
        });
    } else {
        if let Some(cancelled) = state.interaction.debounce.cancel() {
            actions.push(Action::CancelTimer(cancelled));
        }
        state.close_dropdown();
    }

    tracing::trace!(
        text = %text,
        armed = actions.iter().any(|a| matches!(a, Action::ArmTimer { .. })),
        "input changed"
    );
    actions
}

fn handle_key(state: &mut SurfaceState, key: Key) -> (bool, Vec<Action>) {
    match key {
        Key::Down | Key::Up | Key::Home | Key::End => {
            if !state.interaction.dropdown_open {
                state.open_dropdown();
            }
            match key {
                Key::Down => state.move_active_down(),
                Key::Up => state.move_active_up(),
                Key::Home => state.move_active_first(),
                _ => state.move_active_last(),
            }
            (true, vec![])
        }
        Key::Enter => {
            let text = state.text.trim();
            let shows_selection = state.mode() == Mode::Single
                && state.snapshot.first().is_some_and(|option| option.label() == text);
            if state.config.user_defined_options && !text.is_empty() && !shows_selection {
                return (false, vec![select(Identifier::Text(text.to_string()))]);
            }
            match state.interaction.active_index {
                Some(index) if state.interaction.dropdown_open => {
                    (false, vec![select(Identifier::Index(index))])
                }
                _ => (false, vec![]),
            }
        }
        Key::Escape => {
            state.close_dropdown();
            (true, vec![])
        }
        Key::Backspace => {
            if !state.text.is_empty() {
                return (false, vec![]);
            }
            let message = if state.mode().is_multi() {
                state.snapshot.last_removable().map(ControllerMessage::remove)
            } else if state.snapshot.is_empty() {
                None
            } else {
                Some(ControllerMessage::clear())
            };
            (false, message.map(Action::PostToController).into_iter().collect())
        }
    }
}

fn select(identifier: Identifier) -> Action {
    Action::PostToController(ControllerMessage::select(identifier))
}
