//! Conversation session types.
//!
//! A session is identified by a caller-chosen business key (`session_id`) and
//! carries a lifecycle status plus start/end timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::JsonObject;

/// Lifecycle status of a conversation session.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (status IN ('initiated', 'active', 'completed', 'failed'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Initiated,
    Active,
    Completed,
    Failed,
}

impl SessionStatus {
    /// Completed and failed sessions are terminal in intent. Nothing enforces it.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Initiated => write!(f, "initiated"),
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::Completed => write!(f, "completed"),
            SessionStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "initiated" => Ok(SessionStatus::Initiated),
            "active" => Ok(SessionStatus::Active),
            "completed" => Ok(SessionStatus::Completed),
            "failed" => Ok(SessionStatus::Failed),
            other => Err(format!("invalid session status: '{other}'")),
        }
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Initiated
    }
}

/// A conversation session as persisted.
///
/// `ended_at` is set exactly once, when the session is first completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub status: SessionStatus,
    pub language: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub metadata: JsonObject,
}

/// Input for the create-or-fetch operation.
///
/// `status` and `metadata` only apply when the session does not exist yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub session_id: String,
    pub language: String,
    #[serde(default)]
    pub status: Option<SessionStatus>,
    #[serde(default)]
    pub metadata: Option<JsonObject>,
}

/// External response shape for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub status: SessionStatus,
    pub language: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub metadata: JsonObject,
}

impl From<Session> for SessionView {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.session_id,
            status: session.status,
            language: session.language,
            started_at: session.started_at,
            ended_at: session.ended_at,
            metadata: session.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_status_roundtrip() {
        for status in [
            SessionStatus::Initiated,
            SessionStatus::Active,
            SessionStatus::Completed,
            SessionStatus::Failed,
        ] {
            let s = status.to_string();
            let parsed: SessionStatus = s.parse().unwrap();
            assert_eq!(status, parsed);
        }
    }

    #[test]
    fn test_session_status_rejects_unknown() {
        let err = "crashed".parse::<SessionStatus>().unwrap_err();
        assert!(err.contains("crashed"));
    }

    #[test]
    fn test_session_status_default() {
        assert_eq!(SessionStatus::default(), SessionStatus::Initiated);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Failed.is_terminal());
        assert!(!SessionStatus::Initiated.is_terminal());
        assert!(!SessionStatus::Active.is_terminal());
    }

    #[test]
    fn test_create_request_optional_fields() {
        let req: CreateSessionRequest =
            serde_json::from_str(r#"{"sessionId":"s1","language":"en"}"#).unwrap();
        assert_eq!(req.session_id, "s1");
        assert!(req.status.is_none());
        assert!(req.metadata.is_none());
    }

    #[test]
    fn test_session_view_serializes_camel_case() {
        let view = SessionView::from(Session {
            session_id: "s1".to_string(),
            status: SessionStatus::Initiated,
            language: "en".to_string(),
            started_at: Utc::now(),
            ended_at: None,
            metadata: JsonObject::new(),
        });
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["sessionId"], "s1");
        assert_eq!(json["status"], "initiated");
        assert!(json["endedAt"].is_null());
        assert!(json.get("startedAt").is_some());
    }
}
