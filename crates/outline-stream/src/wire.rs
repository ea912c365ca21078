use tracing::{debug, warn};

/// Control and data events recognized on the outline event stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WireEvent {
    /// The generation run has started.
    RunStarted,
    /// A text message block opened.
    MessageStart,
    /// A text message block closed.
    MessageEnd,
    /// A structured tool call opened; a fresh args buffer begins.
    ToolCallStart,
    /// Incremental fragment of the tool call's args payload.
    ToolCallArgs { delta: String },
    /// The tool call's args payload is complete.
    ToolCallEnd,
    /// The producer reported an error.
    Error { detail: String },
    /// Terminal sentinel, independent of normal control events.
    StreamDone,
}

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

/// Classifies one framed record.
///
/// Returns `None` for blank lines, non-`data:` lines, undecodable payloads,
/// and unrecognized event types; a single corrupt record never aborts an
/// otherwise healthy stream.
pub fn parse_record(line: &str) -> Option<WireEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let data = line.strip_prefix(DATA_PREFIX)?.trim_start();
    if data == DONE_SENTINEL {
        return Some(WireEvent::StreamDone);
    }
    let value: serde_json::Value = match serde_json::from_str(data) {
        Ok(value) => value,
        Err(err) => {
            warn!(%err, "skipping undecodable stream record");
            return None;
        }
    };
    map_event(&value)
}

fn map_event(value: &serde_json::Value) -> Option<WireEvent> {
    let Some(event_type) = value.get("type").and_then(|v| v.as_str()) else {
        warn!("skipping stream record without a type discriminator");
        return None;
    };
    match event_type {
        "RUN_STARTED" => Some(WireEvent::RunStarted),
        "TEXT_MESSAGE_START" => Some(WireEvent::MessageStart),
        "TEXT_MESSAGE_END" => Some(WireEvent::MessageEnd),
        "TOOL_CALL_START" => Some(WireEvent::ToolCallStart),
        "TOOL_CALL_ARGS" => {
            let delta = value
                .get("delta")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            Some(WireEvent::ToolCallArgs { delta })
        }
        "TOOL_CALL_END" => Some(WireEvent::ToolCallEnd),
        "error" => {
            let detail = value
                .get("detail")
                .and_then(|v| v.as_str())
                .unwrap_or("outline stream reported an error")
                .to_string();
            Some(WireEvent::Error { detail })
        }
        other => {
            debug!(event_type = other, "skipping unrecognized stream event type");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_control_discriminators() {
        assert_eq!(
            parse_record("data: {\"type\":\"RUN_STARTED\"}"),
            Some(WireEvent::RunStarted)
        );
        assert_eq!(
            parse_record("data: {\"type\":\"TEXT_MESSAGE_START\"}"),
            Some(WireEvent::MessageStart)
        );
        assert_eq!(
            parse_record("data: {\"type\":\"TEXT_MESSAGE_END\"}"),
            Some(WireEvent::MessageEnd)
        );
        assert_eq!(
            parse_record("data: {\"type\":\"TOOL_CALL_START\"}"),
            Some(WireEvent::ToolCallStart)
        );
        assert_eq!(
            parse_record("data: {\"type\":\"TOOL_CALL_END\"}"),
            Some(WireEvent::ToolCallEnd)
        );
    }

    #[test]
    fn done_sentinel_short_circuits_without_json_decoding() {
        assert_eq!(parse_record("data: [DONE]"), Some(WireEvent::StreamDone));
    }

    #[test]
    fn args_event_carries_delta() {
        let event = parse_record("data: {\"type\":\"TOOL_CALL_ARGS\",\"delta\":\"{\\\"sli\"}");
        assert_eq!(
            event,
            Some(WireEvent::ToolCallArgs {
                delta: "{\"sli".to_string()
            })
        );
    }

    #[test]
    fn args_event_without_delta_is_an_empty_delta() {
        let event = parse_record("data: {\"type\":\"TOOL_CALL_ARGS\"}");
        assert_eq!(
            event,
            Some(WireEvent::ToolCallArgs {
                delta: String::new()
            })
        );
    }

    #[test]
    fn error_event_carries_detail() {
        let event = parse_record("data: {\"type\":\"error\",\"detail\":\"quota exceeded\"}");
        assert_eq!(
            event,
            Some(WireEvent::Error {
                detail: "quota exceeded".to_string()
            })
        );
    }

    #[test]
    fn corrupt_and_foreign_lines_are_skipped() {
        assert_eq!(parse_record(""), None);
        assert_eq!(parse_record(": keep-alive"), None);
        assert_eq!(parse_record("event: message"), None);
        assert_eq!(parse_record("data: {not json"), None);
        assert_eq!(parse_record("data: {\"no_type\":1}"), None);
        assert_eq!(parse_record("data: {\"type\":\"SOMETHING_NEW\"}"), None);
    }
}
