//! Pushed-message classification
//!
//! The push channel carries no request identifiers, so every message is
//! either the readiness announcement, the result of the one outstanding
//! calculation, or (structural mode only) an engine-reported failure.

use serde_json::{Map, Value};
use ziwei_core::RawChartPayload;

use crate::config::ClassifierMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    Ready,
    Chart(RawChartPayload),
    EngineFailure(String),
}

pub fn classify(raw: &str, mode: ClassifierMode, readiness_marker: &str) -> InboundMessage {
    match mode {
        ClassifierMode::Substring if raw.contains(readiness_marker) => InboundMessage::Ready,
        ClassifierMode::Substring => InboundMessage::Chart(RawChartPayload::new(raw)),
        ClassifierMode::Structural => classify_structural(raw),
    }
}

/// Reads the top-level `status` (or `kind`) tag. Anything that is not an
/// object tagged `ready` or `error` is a chart.
fn classify_structural(raw: &str) -> InboundMessage {
    let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(raw) else {
        return InboundMessage::Chart(RawChartPayload::new(raw));
    };

    let tag = ["status", "kind"]
        .iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_str));
    match tag {
        Some("ready") => InboundMessage::Ready,
        Some("error") => InboundMessage::EngineFailure(error_text(&fields)),
        _ => InboundMessage::Chart(RawChartPayload::new(raw)),
    }
}

/// A string `error`/`message`, else the first of them serialized as JSON.
fn error_text(fields: &Map<String, Value>) -> String {
    let detail = ["error", "message"].iter().filter_map(|key| fields.get(*key));
    let mut fallback = None;
    for value in detail {
        match value {
            Value::String(text) => return text.clone(),
            Value::Null => {}
            other => {
                fallback.get_or_insert_with(|| other.to_string());
            }
        }
    }
    fallback.unwrap_or_default()
}
