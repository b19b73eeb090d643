use serde_json::{json, Value};

/// Emits a structured info record on the operator log channel (stderr).
///
/// One JSON object per line so log aggregators can ingest records directly.
pub fn log_event(component: &str, event: &str, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": component,
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

/// Emits a structured error record on the operator log channel (stderr).
pub fn log_error(component: &str, event: &str, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": component,
            "level": "error",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
