//! Message protocol around the selection controller.
//!
//! [`ControllerMessage`] is everything the controller consumes: commands from
//! the interactive surface and the host's answers. What it produces is an
//! [`Outbound`], which is either a [`SurfacePush`] for the surface or a
//! [`HostEvent`] for the host application. Every type here is serde
//! serializable because it crosses the transport link as JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::FormValue;
use crate::domain::{SelectOption, Selection};

/// Distributed tracing context carried across the link.
///
/// Holds the OpenTelemetry trace id and the id of the span that sent the
/// message, so the controller's span joins the surface's trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// Trace id, 32 hex digits.
    pub trace_id: String,

    /// Sending span id, 16 hex digits.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Captures the context of the current tracing span.
    ///
    /// Returns `None` when no OpenTelemetry layer is installed or the span is
    /// not recorded.
    #[must_use]
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let otel_context = tracing::Span::current().context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if !span_context.is_valid() {
            return None;
        }

        let context = Self {
            trace_id: format!("{:032x}", span_context.trace_id()),
            parent_span_id: format!("{:016x}", span_context.span_id()),
        };
        tracing::trace!(
            trace_id = %context.trace_id,
            parent_span_id = %context.parent_span_id,
            "captured trace context"
        );
        Some(context)
    }
}

/// What the surface asks the controller to select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Identifier {
    /// Position in the current candidate list.
    Index(usize),

    /// Free-form text typed by the user.
    Text(String),
}

/// How an externally supplied value is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFlavor {
    /// Resynchronize only; the host form is not notified.
    Recover,

    /// Programmatic reset; the host form is notified like a user change.
    Reset,
}

/// Generates trace-aware constructors for [`ControllerMessage`] variants.
macro_rules! controller_message_builders {
    (
        $(
            $builder_name:ident($variant:ident { $($field:ident: $ty:ty),* $(,)? })
        ),* $(,)?
    ) => {
        impl ControllerMessage {
            $(
                #[doc = concat!(
                    "Create a ", stringify!($variant), " message with current trace context"
                )]
                #[must_use]
                pub fn $builder_name($($field: $ty),*) -> Self {
                    Self::$variant {
                        $($field,)*
                        trace_context: TraceContext::from_current(),
                    }
                }
            )*
        }
    };
}

controller_message_builders! {
    search(Search { text: String }),
    select(Select { identifier: Identifier }),
    remove(Remove { index: usize }),
    clear(Clear {}),
    recover(Recover { snapshot: Vec<SelectOption> }),
    set_options(SetOptions { raw: Value }),
    set_value(SetValue { value: Value, flavor: ValueFlavor }),
}

/// Messages consumed by the selection controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControllerMessage {
    /// The surface's debounce fired; forward a search to the host.
    Search {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Select a candidate or a free-text option.
    Select {
        identifier: Identifier,
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Remove the selection entry at `index`.
    Remove {
        index: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Remove every non-sticky selection entry.
    Clear {
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Restore the selection from the surface's snapshot after a reconnect.
    Recover {
        snapshot: Vec<SelectOption>,
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Host reply: a new raw candidate list.
    SetOptions {
        raw: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Host-supplied selection value (scalar, list or null).
    SetValue {
        value: Value,
        flavor: ValueFlavor,
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },
}

impl ControllerMessage {
    /// Variant name, used as a span field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Search { .. } => "search",
            Self::Select { .. } => "select",
            Self::Remove { .. } => "remove",
            Self::Clear { .. } => "clear",
            Self::Recover { .. } => "recover",
            Self::SetOptions { .. } => "set_options",
            Self::SetValue { .. } => "set_value",
        }
    }

    #[must_use]
    pub const fn trace_context(&self) -> Option<&TraceContext> {
        match self {
            Self::Search { trace_context, .. }
            | Self::Select { trace_context, .. }
            | Self::Remove { trace_context, .. }
            | Self::Clear { trace_context }
            | Self::Recover { trace_context, .. }
            | Self::SetOptions { trace_context, .. }
            | Self::SetValue { trace_context, .. } => trace_context.as_ref(),
        }
    }
}

/// State pushed from the controller down to the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SurfacePush {
    /// The candidate list was replaced.
    OptionsUpdated { options: Vec<SelectOption> },

    /// The authoritative selection, after a mutation, reset or recovery.
    SelectionChanged { selection: Selection },
}

/// Notifications for the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostEvent {
    /// The host must eventually answer with [`ControllerMessage::SetOptions`].
    SearchRequested {
        text: String,
        component_id: String,
        field_name: String,
    },

    /// The encoded form field changed.
    FormFieldChanged {
        name: String,
        encoded_value: FormValue,
    },
}

/// One controller output, routed by the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outbound {
    Surface(SurfacePush),
    Host(HostEvent),
}
