//! Subscriber setup.

use super::exporter;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::resource::Resource;
use std::path::PathBuf;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SERVICE_NAME: &str = "keygrid";
const DEFAULT_LEVEL: &str = "info";
const TRACE_FILE_NAME: &str = "keygrid-otlp.json";

/// Where spans are written for `config`.
///
/// An explicit `trace_file` wins; otherwise the file lives in the data
/// directory. `None` when neither is available.
#[must_use]
pub fn trace_file_path(config: &Config) -> Option<PathBuf> {
    config.trace_file.clone().or_else(|| {
        crate::infrastructure::data_dir().map(|dir| dir.join(TRACE_FILE_NAME))
    })
}

/// Installs the global tracing subscriber.
///
/// Observability is optional: when the trace directory cannot be created the
/// call returns without installing anything. Only the first successful call
/// takes effect, later calls are ignored.
pub fn init_tracing(config: &Config) {
    let level = config.trace_level.as_deref().unwrap_or(DEFAULT_LEVEL);

    let Some(trace_file) = trace_file_path(config) else {
        return;
    };
    if let Some(parent) = trace_file.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }

    let _ = file_subscriber(trace_file, level).try_init();
}

/// Builds, without installing, a subscriber that filters with `filter` and
/// exports spans to `trace_file`.
///
/// Events are exported as events of the span that is current when they fire.
/// Events emitted outside every span are not written.
pub fn file_subscriber(
    trace_file: PathBuf,
    filter: &str,
) -> impl tracing::Subscriber + Send + Sync + 'static {
    let resource = Resource::new(vec![
        KeyValue::new("service.name", SERVICE_NAME),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);
    let provider = exporter::file_tracer_provider(trace_file, resource);
    let otel_layer = OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME));

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(otel_layer)
}
