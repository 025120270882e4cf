use agg_core::Event;
use agg_lang::Value;

/// Counters from one JSONL replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Events handed to the engine, including those whose evaluation failed.
    pub event_count: u64,
    /// Malformed lines plus events whose evaluation failed.
    pub error_count: u64,
}

/// Convert one JSON object into an [`Event`].
///
/// Scalar fields map onto [`Value`]; nested arrays and objects are dropped.
/// Returns `None` for anything but an object.
pub fn event_from_json(json: &serde_json::Value) -> Option<Event> {
    let serde_json::Value::Object(map) = json else {
        return None;
    };
    Some(
        map.iter()
            .filter_map(|(key, val)| {
                let v = match val {
                    serde_json::Value::Null => Value::Null,
                    serde_json::Value::Bool(b) => Value::Bool(*b),
                    serde_json::Value::Number(n) => Value::Number(n.as_f64()?),
                    serde_json::Value::String(s) => Value::Str(s.clone()),
                    serde_json::Value::Array(_) | serde_json::Value::Object(_) => return None,
                };
                Some((key.as_str(), v))
            })
            .collect(),
    )
}

/// Parse one JSONL line into an event.
pub(crate) fn parse_event_line(line: &str) -> Result<Event, String> {
    let json: serde_json::Value = serde_json::from_str(line).map_err(|e| e.to_string())?;
    event_from_json(&json).ok_or_else(|| "event is not a JSON object".to_string())
}
