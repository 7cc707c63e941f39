//! Session CLI commands: start, show, complete, set-status.
//!
//! Show renders the session header plus a rich table of one page of its
//! timeline.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use parley_types::event::{EventType, TimelineEntry};
use parley_types::page::PageRequest;
use parley_types::session::{CreateSessionRequest, SessionStatus, SessionView};

use crate::cli::parse_json_object;
use crate::state::AppState;

/// Start a session, or report the existing one unchanged.
///
/// # Examples
///
/// ```bash
/// parley session start call-42 --language en --metadata '{"channel":"phone"}'
/// ```
pub async fn start_session(
    state: &AppState,
    session_id: String,
    language: String,
    status: Option<SessionStatus>,
    metadata: Option<String>,
    json: bool,
) -> Result<()> {
    anyhow::ensure!(!session_id.trim().is_empty(), "session id must not be empty");
    anyhow::ensure!(!language.trim().is_empty(), "--language must not be empty");

    let metadata = metadata
        .as_deref()
        .map(|raw| parse_json_object(raw, "metadata"))
        .transpose()?;

    let session = state
        .conversation
        .upsert_session(CreateSessionRequest {
            session_id,
            language,
            status,
            metadata,
        })
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Session {} ({})",
        style("✓").green().bold(),
        style(&session.session_id).cyan().bold(),
        styled_status(session.status),
    );
    println!(
        "  Started {}",
        style(session.started_at.format("%Y-%m-%d %H:%M:%S UTC")).dim()
    );
    println!();

    Ok(())
}

/// Show a session and one page of its events.
///
/// # Examples
///
/// ```bash
/// parley session show call-42
/// parley session show call-42 --page 2 --limit 50 --json
/// ```
pub async fn show_session(
    state: &AppState,
    session_id: &str,
    page: u32,
    limit: u32,
    json: bool,
) -> Result<()> {
    anyhow::ensure!(page >= 1, "--page must be at least 1");
    anyhow::ensure!(
        (1..=state.config.max_page_limit).contains(&limit),
        "--limit must be between 1 and {}",
        state.config.max_page_limit
    );

    let detail = state
        .conversation
        .get_session_with_events(session_id, PageRequest::new(page, limit))
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    print_session_header(&detail.session);

    if detail.events.is_empty() {
        println!("  {} No events on this page.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    println!("{}", timeline_table(&detail.events));
    println!();
    println!(
        "  Page {} of {} ({} event{})",
        style(detail.pagination.page).bold(),
        style(detail.pagination.total_pages).bold(),
        detail.pagination.total,
        if detail.pagination.total == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Complete a session. Completing twice keeps the first end time.
pub async fn complete_session(state: &AppState, session_id: &str, json: bool) -> Result<()> {
    let session = state.conversation.complete_session(session_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Session {} completed",
        style("✓").green().bold(),
        style(&session.session_id).cyan().bold(),
    );
    if let Some(ended) = session.ended_at {
        println!("  Ended {}", style(ended.format("%Y-%m-%d %H:%M:%S UTC")).dim());
    }
    println!();

    Ok(())
}

/// Set a session's status.
pub async fn set_status(
    state: &AppState,
    session_id: &str,
    status: SessionStatus,
    json: bool,
) -> Result<()> {
    let session = state
        .conversation
        .update_session_status(session_id, status)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Session {} is now {}",
        style("✓").green().bold(),
        style(&session.session_id).cyan().bold(),
        styled_status(session.status),
    );
    println!();

    Ok(())
}

fn print_session_header(session: &SessionView) {
    println!();
    println!(
        "  Session {} ({})",
        style(&session.session_id).cyan().bold(),
        styled_status(session.status),
    );
    println!("  Language  {}", session.language);
    println!(
        "  Started   {}",
        session.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(ended) = session.ended_at {
        println!("  Ended     {}", ended.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if !session.metadata.is_empty() {
        println!(
            "  Metadata  {}",
            serde_json::Value::Object(session.metadata.clone())
        );
    }
    println!();
}

fn timeline_table(events: &[TimelineEntry]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Time").fg(Color::White),
        Cell::new("Event").fg(Color::White),
        Cell::new("Type").fg(Color::White),
        Cell::new("Payload").fg(Color::White),
    ]);

    for event in events {
        let payload = serde_json::Value::Object(event.payload.clone()).to_string();
        let payload_display = if payload.chars().count() > 60 {
            format!("{}...", payload.chars().take(57).collect::<String>())
        } else {
            payload
        };

        let type_color = match event.event_type {
            EventType::UserSpeech => Color::Cyan,
            EventType::BotSpeech => Color::Green,
            EventType::System => Color::DarkGrey,
        };

        table.add_row(vec![
            Cell::new(event.timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string()).fg(Color::White),
            Cell::new(&event.event_id).fg(Color::White),
            Cell::new(event.event_type.to_string()).fg(type_color),
            Cell::new(payload_display).fg(Color::DarkGrey),
        ]);
    }

    table
}

fn styled_status(status: SessionStatus) -> console::StyledObject<String> {
    let text = status.to_string();
    match status {
        SessionStatus::Initiated => style(text).yellow(),
        SessionStatus::Active => style(text).green(),
        SessionStatus::Completed => style(text).dim(),
        SessionStatus::Failed => style(text).red(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::repository::session::SessionStore;
    use parley_infra::sqlite::pool::DatabasePool;
    use parley_types::config::ParleyConfig;

    async fn test_state() -> AppState {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let data_dir = dir.path().to_path_buf();
        std::mem::forget(dir);
        let pool = DatabasePool::new(&url).await.unwrap();
        AppState::from_pool(pool, ParleyConfig::default(), data_dir)
    }

    #[tokio::test]
    async fn test_start_rejects_blank_id_and_language() {
        let state = test_state().await;

        let err = start_session(&state, "".to_string(), "en".to_string(), None, None, true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("session id"));

        let err = start_session(&state, "s1".to_string(), "  ".to_string(), None, None, true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("--language"));

        assert!(state.conversation.sessions().find_by_id("").await.unwrap().is_none());
        assert!(state.conversation.sessions().find_by_id("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_start_then_complete() {
        let state = test_state().await;
        start_session(&state, "s1".to_string(), "en".to_string(), None, None, true)
            .await
            .unwrap();
        complete_session(&state, "s1", true).await.unwrap();

        let stored = state.conversation.sessions().find_by_id("s1").await.unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Completed);
    }
}
