//! OpenTelemetry tracing with file-based span export.
//!
//! ```text
//! tracing spans → tracing-opentelemetry → opentelemetry_sdk → JsonLinesExporter → RotatingFile
//! ```
//!
//! Spans from the surface and the controller share one trace per user action:
//! the surface's span context travels on every link message as a
//! [`TraceContext`](crate::controller::TraceContext) and is re-attached on the
//! controller side.
//!
//! # Modules
//!
//! - [`init`]: Subscriber setup and output location
//! - [`exporter`]: Span exporter and tracer provider
//! - [`rotating`]: Size-rotated output file

pub mod exporter;
pub mod init;
pub mod rotating;

pub use init::{data_dir, init_tracing, DATA_DIR_ENV, TRACE_FILE_NAME};
