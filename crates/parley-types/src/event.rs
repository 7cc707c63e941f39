//! Timeline event types.
//!
//! Events are immutable and keyed by (`session_id`, `event_id`). The event
//! belongs to the session named by `session_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::JsonObject;

/// Kind of occurrence recorded on a session timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    UserSpeech,
    BotSpeech,
    System,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::UserSpeech => write!(f, "user_speech"),
            EventType::BotSpeech => write!(f, "bot_speech"),
            EventType::System => write!(f, "system"),
        }
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user_speech" => Ok(EventType::UserSpeech),
            "bot_speech" => Ok(EventType::BotSpeech),
            "system" => Ok(EventType::System),
            other => Err(format!("invalid event type: '{other}'")),
        }
    }
}

/// An event as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub session_id: String,
    pub event_id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub payload: JsonObject,
    pub timestamp: DateTime<Utc>,
}

/// Input for recording an event. The session comes from the request path.
///
/// When `timestamp` is omitted the store stamps the insertion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub event_id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub payload: JsonObject,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// External response shape for a recorded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub event_id: String,
    pub session_id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub payload: JsonObject,
    pub timestamp: DateTime<Utc>,
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        Self {
            event_id: event.event_id,
            session_id: event.session_id,
            event_type: event.event_type,
            payload: event.payload,
            timestamp: event.timestamp,
        }
    }
}

/// Event as listed inside a session detail (the session id is implied).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub event_id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub payload: JsonObject,
    pub timestamp: DateTime<Utc>,
}

impl From<Event> for TimelineEntry {
    fn from(event: Event) -> Self {
        Self {
            event_id: event.event_id,
            event_type: event.event_type,
            payload: event.payload,
            timestamp: event.timestamp,
        }
    }
}
