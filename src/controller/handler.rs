//! The authoritative selection controller.
//!
//! [`SelectionController`] owns the canonical selection and the current
//! candidate list. It behaves as a single-threaded actor: the runtime feeds it
//! one [`ControllerMessage`] at a time through [`SelectionController::handle_message`]
//! and routes the returned [`Outbound`] values. The mutation operations are
//! also public so hosts and tests can drive the controller directly.

use serde_json::Value;

use crate::codec::{encode_selection, FormField};
use crate::controller::{
    ControllerMessage, HostEvent, Identifier, Outbound, SurfacePush, ValueFlavor,
};
use crate::domain::{SelectOption, Selection, SelectionPolicy};
use crate::normalize::{normalize, normalize_list};
use crate::Config;

/// Authoritative selection state for one component instance.
#[derive(Debug, Clone)]
pub struct SelectionController {
    config: Config,
    options: Vec<SelectOption>,
    selection: Selection,
}

impl SelectionController {
    /// Creates a controller with an empty candidate list and selection.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            options: Vec::new(),
            selection: Selection::new(),
        }
    }

    /// Creates a controller and seeds its selection from `initial`.
    ///
    /// This is the mount path: `initial` accepts anything
    /// [`set_selection_from_external_value`](Self::set_selection_from_external_value)
    /// accepts.
    #[must_use]
    pub fn mount(config: Config, initial: &Value) -> Self {
        let mut controller = Self::new(config);
        controller.set_selection_from_external_value(initial);
        controller
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub const fn policy(&self) -> SelectionPolicy {
        SelectionPolicy::new(self.config.mode, self.config.max_selectable)
    }

    /// The form field the host currently holds for this component.
    #[must_use]
    pub fn form_field(&self) -> FormField {
        encode_selection(&self.config.field_name, self.config.mode, &self.selection)
    }

    /// Replaces the candidate list with the normalized form of `raw`.
    ///
    /// The selection is not touched.
    pub fn set_options(&mut self, raw: &Value) -> &[SelectOption] {
        self.options = normalize_list(raw);
        &self.options
    }

    /// Selects a candidate by index or a free-text option.
    ///
    /// Out-of-range indices, disabled candidates, free text while user-defined
    /// options are off, and blank free text are all no-ops. Returns `true` when
    /// the selection changed.
    pub fn select(&mut self, identifier: &Identifier) -> bool {
        let option = match identifier {
            Identifier::Index(index) => match self.options.get(*index) {
                Some(option) if !option.is_disabled() => option.clone(),
                Some(_) => {
                    tracing::debug!(index, "ignoring disabled candidate");
                    return false;
                }
                None => {
                    tracing::debug!(
                        index,
                        option_count = self.options.len(),
                        "candidate index out of range"
                    );
                    return false;
                }
            },
            Identifier::Text(text) => {
                if !self.config.user_defined_options {
                    tracing::debug!("free-text selection is not enabled");
                    return false;
                }
                let text = text.trim();
                if text.is_empty() {
                    return false;
                }
                SelectOption::new(text, Value::String(text.to_string()))
            }
        };

        let policy = self.policy();
        self.selection.add(option, &policy)
    }

    /// Removes the selection entry at `index` unless it is sticky.
    pub fn remove(&mut self, index: usize) -> bool {
        self.selection.remove(index)
    }

    /// Removes every non-sticky selection entry.
    pub fn clear(&mut self) -> bool {
        self.selection.clear()
    }

    /// Replaces the selection with a host-supplied value.
    ///
    /// `value` may be `null` (empty selection), a list, or a single element.
    /// Each element is resolved against the candidate list by value first and
    /// normalized directly otherwise. Unrecognized elements and empty-string
    /// placeholders are skipped. Single mode keeps the first entry; the tags
    /// modes keep at most `max_selectable` entries.
    ///
    /// Returns `true` when the selection changed.
    pub fn set_selection_from_external_value(&mut self, value: &Value) -> bool {
        let elements: Vec<&Value> = match value {
            Value::Null => Vec::new(),
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        let resolved: Vec<SelectOption> = elements
            .into_iter()
            .filter(|element| !is_placeholder(element))
            .filter_map(|element| self.resolve(element))
            .collect();

        let mut selection = Selection::from_options(resolved, self.config.mode);
        if self.config.mode.is_multi() && self.config.max_selectable > 0 {
            let mut options = selection.into_vec();
            options.truncate(self.config.max_selectable);
            selection = Selection::from_trusted(options);
        }

        let changed = selection != self.selection;
        self.selection = selection;
        changed
    }

    fn resolve(&self, element: &Value) -> Option<SelectOption> {
        if let Some(candidate) = self.options.iter().find(|o| o.value() == element) {
            return Some(candidate.clone());
        }
        let option = normalize(element)?;
        let candidate = self.options.iter().find(|o| o.same_as(&option));
        Some(candidate.cloned().unwrap_or(option))
    }

    /// Restores the selection verbatim from a client snapshot.
    ///
    /// No limit, duplicate or disabled checks are applied. An empty snapshot
    /// leaves the current selection alone. Returns `true` when the snapshot
    /// was applied.
    pub fn recover(&mut self, snapshot: Vec<SelectOption>) -> bool {
        if snapshot.is_empty() {
            tracing::debug!("empty recovery snapshot, keeping current selection");
            return false;
        }
        self.selection = Selection::from_trusted(snapshot);
        true
    }

    /// Processes one message and returns what must be delivered.
    pub fn handle_message(&mut self, message: ControllerMessage) -> Vec<Outbound> {
        let _context_guard = attach_parent_trace_context(&message);

        let span = tracing::debug_span!(
            "controller_handle_message",
            message_type = message.kind(),
            field_name = %self.config.field_name,
        );
        let _guard = span.entered();

        match message {
            ControllerMessage::Search { text, .. } => {
                tracing::debug!(text = %text, "search requested");
                vec![Outbound::Host(HostEvent::SearchRequested {
                    text,
                    component_id: self.config.component_id.clone(),
                    field_name: self.config.field_name.clone(),
                })]
            }

            ControllerMessage::SetOptions { raw, .. } => {
                let options = self.set_options(&raw).to_vec();
                vec![Outbound::Surface(SurfacePush::OptionsUpdated { options })]
            }

            ControllerMessage::Select { identifier, .. } => {
                let changed = self.select(&identifier);
                self.selection_changed(changed)
            }

            ControllerMessage::Remove { index, .. } => {
                let changed = self.remove(index);
                self.selection_changed(changed)
            }

            ControllerMessage::Clear { .. } => {
                let changed = self.clear();
                self.selection_changed(changed)
            }

            ControllerMessage::Recover { snapshot, .. } => {
                if self.recover(snapshot) {
                    vec![self.selection_push()]
                } else {
                    Vec::new()
                }
            }

            ControllerMessage::SetValue { value, flavor, .. } => {
                self.set_selection_from_external_value(&value);
                match flavor {
                    ValueFlavor::Reset => self.selection_changed(true),
                    ValueFlavor::Recover => vec![self.selection_push()],
                }
            }
        }
    }

    fn selection_changed(&self, changed: bool) -> Vec<Outbound> {
        if !changed {
            return Vec::new();
        }
        let field = self.form_field();
        tracing::debug!(
            selection_len = self.selection.len(),
            form_field = %field.name,
            "selection changed"
        );
        vec![
            Outbound::Host(HostEvent::FormFieldChanged {
                name: field.name,
                encoded_value: field.value,
            }),
            self.selection_push(),
        ]
    }

    /// The current selection as a surface push, without notifying the host.
    #[must_use]
    pub fn selection_push(&self) -> Outbound {
        Outbound::Surface(SurfacePush::SelectionChanged {
            selection: self.selection.clone(),
        })
    }
}

fn is_placeholder(element: &Value) -> bool {
    matches!(element, Value::String(s) if s.is_empty())
}

/// Re-attaches the sender's trace context for the duration of the handler.
///
/// The returned guard must be held while the message is processed.
fn attach_parent_trace_context(message: &ControllerMessage) -> Option<opentelemetry::ContextGuard> {
    use opentelemetry::trace::{
        SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState,
    };

    let trace_context = message.trace_context()?;
    let trace_id = TraceId::from_hex(&trace_context.trace_id).ok()?;
    let span_id = SpanId::from_hex(&trace_context.parent_span_id).ok()?;

    let span_context = SpanContext::new(
        trace_id,
        span_id,
        TraceFlags::SAMPLED,
        true,
        TraceState::default(),
    );

    Some(
        opentelemetry::Context::current()
            .with_remote_span_context(span_context)
            .attach(),
    )
}
