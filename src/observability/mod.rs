//! Tracing with OpenTelemetry spans exported to a local JSON file.
//!
//! keygrid sits on the keyboard path, so nothing here may block or fail loudly.
//! Spans go through the regular `tracing` macros and end up as OTLP-shaped JSON
//! lines on disk:
//!
//! ```text
//! tracing macros → tracing-opentelemetry → TracerProvider → FileSpanExporter → RotatingFile
//! ```
//!
//! The default file is `<data dir>/keygrid/keygrid-otlp.json`. It is rotated at
//! 10 MB and the three most recent backups are kept.
//!
//! The filter comes from `trace_level` in the configuration (an `EnvFilter`
//! directive such as `"debug"` or `"keygrid::app=trace"`), defaulting to
//! `"info"`.

mod exporter;
mod init;
mod otlp;
mod rotation;

pub use init::{file_subscriber, init_tracing, trace_file_path};
