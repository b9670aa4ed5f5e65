//! Tracing subscriber setup.

use std::path::PathBuf;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::exporter;
use crate::Config;

/// Environment variable overriding the trace output directory.
pub const DATA_DIR_ENV: &str = "LIVESELECT_DATA_DIR";

/// File name of the span log inside the data directory.
pub const TRACE_FILE_NAME: &str = "liveselect-otlp.json";

/// Directory traces are written to.
///
/// `$LIVESELECT_DATA_DIR` when set, otherwise `liveselect/` under the
/// platform temp directory.
#[must_use]
pub fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("liveselect"))
}

/// Installs the global tracing subscriber.
///
/// The filter is `config.trace_level` when set, then `RUST_LOG`, then
/// `info`. Spans go through an OpenTelemetry layer to
/// `<data dir>/liveselect-otlp.json`.
///
/// Only the first call in a process takes effect. If the data directory
/// cannot be created, tracing stays disabled.
pub fn init_tracing(config: &Config) {
    let filter = config.trace_level.as_deref().map_or_else(
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        EnvFilter::new,
    );

    let data_dir = data_dir();
    if std::fs::create_dir_all(&data_dir).is_err() {
        return;
    }

    let resource = Resource::new(vec![opentelemetry::KeyValue::new(
        "service.name",
        "liveselect",
    )]);
    let provider = exporter::tracer_provider(data_dir.join(TRACE_FILE_NAME), resource);
    let otel_layer = OpenTelemetryLayer::new(provider.tracer("liveselect"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .try_init();
}
