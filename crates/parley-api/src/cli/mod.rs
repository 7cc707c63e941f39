//! CLI command definitions and dispatch for the `parley` binary.
//!
//! Uses clap derive macros for argument parsing. The CLI follows a noun-verb
//! pattern (e.g., `parley session start`, `parley event add`).

pub mod event;
pub mod session;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use parley_types::event::EventType;
use parley_types::session::SessionStatus;

/// Record conversation sessions and their event timelines.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (overrides config.toml).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config.toml).
        #[arg(long)]
        host: Option<String>,
    },

    /// Manage sessions.
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Record events.
    Event {
        #[command(subcommand)]
        command: EventCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Start a session, or show the existing one with this id.
    Start {
        /// Session id.
        session_id: String,

        /// Conversation language.
        #[arg(short, long, default_value = "en")]
        language: String,

        /// Initial status.
        #[arg(long)]
        status: Option<SessionStatus>,

        /// Metadata as a JSON object.
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Show a session and a page of its events, newest first.
    Show {
        /// Session id.
        session_id: String,

        /// Page number (1-based).
        #[arg(long, default_value = "1")]
        page: u32,

        /// Events per page.
        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// Mark a session completed.
    Complete {
        /// Session id.
        session_id: String,
    },

    /// Set a session's status.
    SetStatus {
        /// Session id.
        session_id: String,

        /// New status (initiated, active, completed, failed).
        status: SessionStatus,
    },
}

#[derive(Subcommand)]
pub enum EventCommand {
    /// Add an event to a session. Re-sending an event id is a no-op.
    Add {
        /// Session id.
        session_id: String,

        /// Event type (user_speech, bot_speech, system).
        #[arg(short = 't', long = "type")]
        event_type: EventType,

        /// Payload as a JSON object.
        #[arg(short, long, default_value = "{}")]
        payload: String,

        /// Event id (generated when omitted).
        #[arg(long)]
        id: Option<String>,

        /// Event time as RFC 3339 (defaults to now).
        #[arg(long)]
        timestamp: Option<String>,
    },
}

/// Parse a CLI JSON argument that must be an object.
pub(crate) fn parse_json_object(raw: &str, flag: &str) -> anyhow::Result<parley_types::JsonObject> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(_) => anyhow::bail!("--{flag} must be a JSON object"),
        Err(e) => anyhow::bail!("--{flag} is not valid JSON: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_parse_event_add() {
        let cli = Cli::try_parse_from([
            "parley", "event", "add", "s1", "--type", "bot_speech", "--payload", r#"{"text":"hi"}"#,
        ])
        .unwrap();
        match cli.command {
            Commands::Event {
                command: EventCommand::Add { session_id, event_type, id, .. },
            } => {
                assert_eq!(session_id, "s1");
                assert_eq!(event_type, EventType::BotSpeech);
                assert!(id.is_none());
            }
            _ => panic!("expected event add"),
        }
    }

    #[test]
    fn test_parse_set_status() {
        let cli = Cli::try_parse_from(["parley", "--json", "session", "set-status", "s1", "failed"])
            .unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Session {
                command: SessionCommand::SetStatus { status: SessionStatus::Failed, .. }
            }
        ));
    }

    #[test]
    fn test_parse_json_object() {
        assert_eq!(parse_json_object(r#"{"a":1}"#, "payload").unwrap().len(), 1);
        assert!(parse_json_object("[1,2]", "payload").is_err());
        assert!(parse_json_object("{nope", "payload").is_err());
    }
}
