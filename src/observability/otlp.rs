//! OTLP/JSON encoding of finished spans.
//!
//! The field names follow the OTLP JSON mapping (camelCase, ids as lowercase
//! hex, 64-bit integers as strings) so the file can be replayed into any OTLP
//! collector.

use opentelemetry::trace::{SpanId, SpanKind, Status};
use opentelemetry::{KeyValue, Value};
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::resource::Resource;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    resource_spans: Vec<ResourceSpans>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceSpans {
    resource: ResourceBlock,
    scope_spans: Vec<ScopeSpans>,
}

#[derive(Debug, Serialize)]
struct ResourceBlock {
    attributes: Vec<Attribute>,
}

#[derive(Debug, Serialize)]
struct ScopeSpans {
    scope: Scope,
    spans: Vec<OtlpSpan>,
}

#[derive(Debug, Serialize)]
struct Scope {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OtlpSpan {
    trace_id: String,
    span_id: String,
    parent_span_id: String,
    name: String,
    kind: u8,
    start_time_unix_nano: String,
    end_time_unix_nano: String,
    attributes: Vec<Attribute>,
    events: Vec<OtlpEvent>,
    status: OtlpStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OtlpEvent {
    time_unix_nano: String,
    name: String,
    attributes: Vec<Attribute>,
}

#[derive(Debug, Serialize)]
struct OtlpStatus {
    code: u8,
    #[serde(skip_serializing_if = "String::is_empty")]
    message: String,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Attribute {
    key: String,
    value: AnyValue,
}

#[derive(Debug, PartialEq, Serialize)]
pub enum AnyValue {
    #[serde(rename = "boolValue")]
    Bool(bool),
    /// OTLP/JSON carries 64-bit integers as strings.
    #[serde(rename = "intValue")]
    Int(String),
    #[serde(rename = "doubleValue")]
    Double(f64),
    #[serde(rename = "stringValue")]
    String(String),
}

impl From<&Value> for AnyValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Bool(b) => Self::Bool(*b),
            Value::I64(i) => Self::Int(i.to_string()),
            Value::F64(f) => Self::Double(*f),
            Value::String(s) => Self::String(s.to_string()),
            // Arrays are flattened to their display form.
            Value::Array(_) => Self::String(value.to_string()),
        }
    }
}

impl From<&KeyValue> for Attribute {
    fn from(kv: &KeyValue) -> Self {
        Self {
            key: kv.key.to_string(),
            value: AnyValue::from(&kv.value),
        }
    }
}

impl ExportDocument {
    /// Builds one document holding every span of `batch` under `resource`.
    pub fn new(resource: &Resource, scope_name: &str, batch: &[SpanData]) -> Self {
        let attributes = resource
            .iter()
            .map(|(key, value)| Attribute {
                key: key.to_string(),
                value: AnyValue::from(value),
            })
            .collect();

        Self {
            resource_spans: vec![ResourceSpans {
                resource: ResourceBlock { attributes },
                scope_spans: vec![ScopeSpans {
                    scope: Scope {
                        name: scope_name.to_owned(),
                        version: Some(env!("CARGO_PKG_VERSION").to_owned()),
                    },
                    spans: batch.iter().map(OtlpSpan::from).collect(),
                }],
            }],
        }
    }
}

impl From<&SpanData> for OtlpSpan {
    fn from(span: &SpanData) -> Self {
        let parent_span_id = if span.parent_span_id == SpanId::INVALID {
            String::new()
        } else {
            format!("{:016x}", span.parent_span_id)
        };

        Self {
            trace_id: format!("{:032x}", span.span_context.trace_id()),
            span_id: format!("{:016x}", span.span_context.span_id()),
            parent_span_id,
            name: span.name.to_string(),
            kind: kind_code(&span.span_kind),
            start_time_unix_nano: unix_nanos(span.start_time),
            end_time_unix_nano: unix_nanos(span.end_time),
            attributes: span.attributes.iter().map(Attribute::from).collect(),
            events: span
                .events
                .iter()
                .map(|event| OtlpEvent {
                    time_unix_nano: unix_nanos(event.timestamp),
                    name: event.name.to_string(),
                    attributes: event.attributes.iter().map(Attribute::from).collect(),
                })
                .collect(),
            status: status_of(&span.status),
        }
    }
}

const fn kind_code(kind: &SpanKind) -> u8 {
    match kind {
        SpanKind::Internal => 1,
        SpanKind::Server => 2,
        SpanKind::Client => 3,
        SpanKind::Producer => 4,
        SpanKind::Consumer => 5,
    }
}

fn status_of(status: &Status) -> OtlpStatus {
    match status {
        Status::Unset => OtlpStatus {
            code: 0,
            message: String::new(),
        },
        Status::Ok => OtlpStatus {
            code: 1,
            message: String::new(),
        },
        Status::Error { description } => OtlpStatus {
            code: 2,
            message: description.to_string(),
        },
    }
}

/// Times before the epoch are written as zero.
fn unix_nanos(time: SystemTime) -> String {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn attribute_values_use_otlp_field_names() {
        let attrs = [
            KeyValue::new("mode", "grid_active"),
            KeyValue::new("consumed", true),
            KeyValue::new("depth", 2_i64),
            KeyValue::new("multiplier", 1.5),
        ];
        let json: Vec<serde_json::Value> = attrs
            .iter()
            .map(|kv| serde_json::to_value(Attribute::from(kv)).unwrap())
            .collect();

        assert_eq!(
            json[0],
            serde_json::json!({"key": "mode", "value": {"stringValue": "grid_active"}})
        );
        assert_eq!(json[1]["value"], serde_json::json!({"boolValue": true}));
        assert_eq!(json[2]["value"], serde_json::json!({"intValue": "2"}));
        assert_eq!(json[3]["value"], serde_json::json!({"doubleValue": 1.5}));
    }

    #[test]
    fn empty_batch_still_carries_resource() {
        let resource = Resource::new(vec![KeyValue::new("service.name", "keygrid")]);
        let doc = serde_json::to_value(ExportDocument::new(&resource, "keygrid", &[])).unwrap();

        let block = &doc["resourceSpans"][0];
        let attributes = block["resource"]["attributes"].as_array().unwrap();
        assert!(attributes.contains(
            &serde_json::json!({"key": "service.name", "value": {"stringValue": "keygrid"}})
        ));
        assert_eq!(block["scopeSpans"][0]["scope"]["name"], "keygrid");
        assert_eq!(block["scopeSpans"][0]["spans"], serde_json::json!([]));
    }

    #[test]
    fn pre_epoch_times_clamp_to_zero() {
        assert_eq!(unix_nanos(UNIX_EPOCH), "0");
        assert_eq!(unix_nanos(UNIX_EPOCH + Duration::from_micros(3)), "3000");
        if let Some(before) = UNIX_EPOCH.checked_sub(Duration::from_secs(1)) {
            assert_eq!(unix_nanos(before), "0");
        }
    }

    #[test]
    fn error_status_keeps_description() {
        let status = status_of(&Status::error("boom"));
        assert_eq!(status.code, 2);
        assert_eq!(status.message, "boom");
        assert_eq!(status_of(&Status::Unset).code, 0);
    }
}
