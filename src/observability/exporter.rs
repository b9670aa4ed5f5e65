//! Span exporter writing JSON lines to a rotating file.
//!
//! Every exported batch becomes one line:
//!
//! ```json
//! {"service":"liveselect","exported_at":"2026-01-01T00:00:00+00:00","spans":[
//!   {"trace_id":"…","span_id":"…","parent_span_id":"…","name":"controller_handle_message",
//!    "start_unix_nano":"…","duration_us":42,"attributes":{"message_type":"select"},
//!    "events":[{"name":"selection changed","attributes":{}}],"status":"unset"}]}
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use futures_util::future::BoxFuture;
use opentelemetry::trace::{SpanId, Status, TraceError};
use opentelemetry::{Key, KeyValue};
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use serde_json::{json, Map, Value};

use super::rotating::RotatingFile;

/// Writes span batches as JSON lines.
pub struct JsonLinesExporter {
    file: RotatingFile,
    service: String,
    is_shutdown: AtomicBool,
}

impl JsonLinesExporter {
    #[must_use]
    pub fn new(file: RotatingFile, resource: &Resource) -> Self {
        let service = resource
            .get(Key::new("service.name"))
            .map_or_else(|| "liveselect".to_string(), |name| name.to_string());
        Self {
            file,
            service,
            is_shutdown: AtomicBool::new(false),
        }
    }

    /// The JSON document written for `batch`.
    #[must_use]
    pub fn format_batch(&self, batch: &[SpanData]) -> Value {
        json!({
            "service": self.service,
            "exported_at": chrono::Utc::now().to_rfc3339(),
            "spans": batch.iter().map(span_record).collect::<Vec<_>>(),
        })
    }
}

fn span_record(span: &SpanData) -> Value {
    let parent_span_id = (span.parent_span_id != SpanId::INVALID)
        .then(|| format!("{:016x}", span.parent_span_id));
    let duration_us = span
        .end_time
        .duration_since(span.start_time)
        .map_or(0, |d| u64::try_from(d.as_micros()).unwrap_or(u64::MAX));
    let events: Vec<Value> = span
        .events
        .iter()
        .map(|event| {
            json!({
                "name": event.name,
                "attributes": attributes(&event.attributes),
            })
        })
        .collect();

    json!({
        "trace_id": format!("{:032x}", span.span_context.trace_id()),
        "span_id": format!("{:016x}", span.span_context.span_id()),
        "parent_span_id": parent_span_id,
        "name": span.name,
        "start_unix_nano": unix_nanos(span.start_time).to_string(),
        "duration_us": duration_us,
        "attributes": attributes(&span.attributes),
        "events": events,
        "status": status(&span.status),
    })
}

fn unix_nanos(time: SystemTime) -> u128 {
    time.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_nanos())
}

fn attributes(attributes: &[KeyValue]) -> Map<String, Value> {
    attributes
        .iter()
        .map(|kv| (kv.key.as_str().to_string(), attribute_value(&kv.value)))
        .collect()
}

fn attribute_value(value: &opentelemetry::Value) -> Value {
    use opentelemetry::Value as Otel;

    match value {
        Otel::Bool(b) => json!(b),
        Otel::I64(i) => json!(i),
        Otel::F64(f) => json!(f),
        Otel::String(s) => json!(s.as_str()),
        Otel::Array(_) => json!(value.to_string()),
    }
}

fn status(status: &Status) -> Value {
    match status {
        Status::Unset => json!("unset"),
        Status::Ok => json!("ok"),
        Status::Error { description } => json!({ "error": description.to_string() }),
    }
}

impl SpanExporter for JsonLinesExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        if self.is_shutdown.load(Ordering::SeqCst) {
            return Box::pin(std::future::ready(Err(TraceError::from("exporter is shut down"))));
        }

        let line = self.format_batch(&batch).to_string();
        let result = self
            .file
            .write_line(&line)
            .map_err(|e| TraceError::from(e.to_string()));
        Box::pin(std::future::ready(result))
    }

    fn shutdown(&mut self) {
        self.is_shutdown.store(true, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for JsonLinesExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesExporter")
            .field("file", &self.file)
            .field("service", &self.service)
            .field("is_shutdown", &self.is_shutdown)
            .finish()
    }
}

/// Tracer provider exporting every finished span to `trace_file`.
#[must_use]
pub fn tracer_provider(trace_file: PathBuf, resource: Resource) -> TracerProvider {
    let exporter = JsonLinesExporter::new(RotatingFile::new(trace_file), &resource);

    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_batch_document() {
        let dir = tempfile::tempdir().unwrap();
        let resource = Resource::new(vec![KeyValue::new("service.name", "liveselect-test")]);
        let file = RotatingFile::new(dir.path().join("t.json"));
        let exporter = JsonLinesExporter::new(file, &resource);

        let document = exporter.format_batch(&[]);
        assert_eq!(document["service"], "liveselect-test");
        assert_eq!(document["spans"], json!([]));
        assert!(document["exported_at"].is_string());
    }

    #[test]
    fn attribute_values_map_to_json() {
        let attrs = attributes(&[
            KeyValue::new("flag", true),
            KeyValue::new("count", 3_i64),
            KeyValue::new("name", "city"),
        ]);
        assert_eq!(Value::Object(attrs), json!({"flag": true, "count": 3, "name": "city"}));
    }

    #[test]
    fn statuses() {
        assert_eq!(status(&Status::Unset), json!("unset"));
        assert_eq!(
            status(&Status::error("boom")),
            json!({"error": "boom"})
        );
    }
}
