//! Event CLI commands.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use console::style;
use uuid::Uuid;

use parley_types::event::{CreateEventRequest, EventType};

use crate::cli::parse_json_object;
use crate::state::AppState;

/// Add an event to an existing session.
///
/// # Examples
///
/// ```bash
/// parley event add call-42 --type user_speech --payload '{"text":"hello"}'
/// parley event add call-42 --type system --id e-1 --timestamp 2026-01-01T00:00:00Z
/// ```
pub async fn add_event(
    state: &AppState,
    session_id: &str,
    event_type: EventType,
    payload: &str,
    id: Option<String>,
    timestamp: Option<String>,
    json: bool,
) -> Result<()> {
    anyhow::ensure!(!session_id.trim().is_empty(), "session id must not be empty");
    if let Some(id) = &id {
        anyhow::ensure!(!id.trim().is_empty(), "--id must not be empty");
    }

    let payload = parse_json_object(payload, "payload")?;
    let timestamp = timestamp
        .as_deref()
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .with_context(|| format!("--timestamp '{raw}' is not RFC 3339"))
        })
        .transpose()?;

    let request = CreateEventRequest {
        event_id: id.unwrap_or_else(|| Uuid::now_v7().to_string()),
        event_type,
        payload,
        timestamp,
    };

    let event = state.conversation.add_event(session_id, request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&event)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Event {} ({}) on session {}",
        style("✓").green().bold(),
        style(&event.event_id).cyan().bold(),
        event.event_type,
        style(&event.session_id).cyan(),
    );
    println!(
        "  At {}",
        style(event.timestamp.format("%Y-%m-%d %H:%M:%S%.6f UTC")).dim()
    );
    println!();

    Ok(())
}
