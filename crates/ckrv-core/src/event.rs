use crate::error::{CkrvError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    StepStart,
    StepEnd,
    Success,
    Error,
    Warning,
    Log,
}

impl EventKind {
    pub fn all() -> &'static [EventKind] {
        &[
            EventKind::StepStart,
            EventKind::StepEnd,
            EventKind::Success,
            EventKind::Error,
            EventKind::Warning,
            EventKind::Log,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::StepStart => "step_start",
            EventKind::StepEnd => "step_end",
            EventKind::Success => "success",
            EventKind::Error => "error",
            EventKind::Warning => "warning",
            EventKind::Log => "log",
        }
    }

    /// Uppercased form used in log exports: `[STEP_START]`, `[ERROR]`, …
    pub fn label(self) -> &'static str {
        match self {
            EventKind::StepStart => "STEP_START",
            EventKind::StepEnd => "STEP_END",
            EventKind::Success => "SUCCESS",
            EventKind::Error => "ERROR",
            EventKind::Warning => "WARNING",
            EventKind::Log => "LOG",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventKind {
    type Err = CkrvError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "step_start" => Ok(EventKind::StepStart),
            "step_end" => Ok(EventKind::StepEnd),
            "success" => Ok(EventKind::Success),
            "error" => Ok(EventKind::Error),
            "warning" => Ok(EventKind::Warning),
            "log" => Ok(EventKind::Log),
            _ => Err(CkrvError::InvalidEventKind(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// OrchestrationEvent
// ---------------------------------------------------------------------------

/// One message from the orchestration engine's event stream.
///
/// Immutable once decoded. Ordering is arrival order; duplicates are
/// permitted (the engine may emit the same log line twice).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_name: Option<String>,
}

impl OrchestrationEvent {
    pub fn new(kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            message: message.into(),
            step_name: None,
        }
    }

    /// Best-effort decode of a raw stream payload.
    ///
    /// The engine is not held to a strict schema: a missing `type` falls
    /// back to `log` and a missing `timestamp` to the receive time. A
    /// payload that is not a JSON object with a string `message` is
    /// rejected — the caller drops it.
    pub fn decode(raw: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| CkrvError::MalformedEvent(format!("not JSON: {e}")))?;

        let obj = value
            .as_object()
            .ok_or_else(|| CkrvError::MalformedEvent("not a JSON object".to_string()))?;

        let message = obj
            .get("message")
            .and_then(|m| m.as_str())
            .ok_or_else(|| CkrvError::MalformedEvent("missing message".to_string()))?
            .to_string();

        let kind = match obj.get("type").and_then(|t| t.as_str()) {
            Some(s) => s.parse().unwrap_or(EventKind::Log),
            None => EventKind::Log,
        };

        let timestamp = obj
            .get("timestamp")
            .and_then(|t| t.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        let step_name = obj
            .get("step_name")
            .and_then(|s| s.as_str())
            .map(str::to_string);

        Ok(Self {
            timestamp,
            kind,
            message,
            step_name,
        })
    }

    /// Export format: `[<ISO-8601 timestamp>] [<UPPERCASED kind>] <message>`
    pub fn export_line(&self) -> String {
        format!(
            "[{}] [{}] {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.kind.label(),
            self.message
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn kind_roundtrip() {
        for kind in EventKind::all() {
            let parsed: EventKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, *kind);
        }
    }

    #[test]
    fn unknown_kind_rejected() {
        assert!("explosion".parse::<EventKind>().is_err());
    }

    #[test]
    fn decode_full_payload() {
        let raw = r#"{"timestamp":"2026-03-01T12:00:00Z","type":"step_start","message":"running verify","step_name":"verify"}"#;
        let event = OrchestrationEvent::decode(raw).unwrap();
        assert_eq!(event.kind, EventKind::StepStart);
        assert_eq!(event.message, "running verify");
        assert_eq!(event.step_name.as_deref(), Some("verify"));
    }

    #[test]
    fn decode_defaults_missing_type_to_log() {
        let event = OrchestrationEvent::decode(r#"{"message":"hello"}"#).unwrap();
        assert_eq!(event.kind, EventKind::Log);
        assert!(event.step_name.is_none());
    }

    #[test]
    fn decode_unknown_type_falls_back_to_log() {
        let event =
            OrchestrationEvent::decode(r#"{"type":"telemetry","message":"hi"}"#).unwrap();
        assert_eq!(event.kind, EventKind::Log);
    }

    #[test]
    fn decode_rejects_non_object() {
        assert!(OrchestrationEvent::decode("[1,2,3]").is_err());
        assert!(OrchestrationEvent::decode("not json at all").is_err());
    }

    #[test]
    fn decode_rejects_missing_message() {
        assert!(OrchestrationEvent::decode(r#"{"type":"log"}"#).is_err());
    }

    #[test]
    fn export_line_format() {
        let event = OrchestrationEvent {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap(),
            kind: EventKind::Error,
            message: "verify failed".to_string(),
            step_name: None,
        };
        assert_eq!(
            event.export_line(),
            "[2026-03-01T12:30:00.000Z] [ERROR] verify failed"
        );
    }
}
