//! Parley CLI and REST API entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, loads configuration, initializes the database and
//! service, then dispatches to the appropriate command handler or starts the
//! REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands, EventCommand, SessionCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need config or app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "parley", &mut std::io::stdout());
        return Ok(());
    }

    let (data_dir, config) = AppState::load_config().await?;

    // RUST_LOG wins; otherwise the filter follows verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,parley=debug",
        _ => "trace",
    };
    parley_observe::tracing_setup::init_tracing(config.otel, filter)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli, data_dir, config).await;
    parley_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(
    cli: Cli,
    data_dir: std::path::PathBuf,
    config: parley_types::config::ParleyConfig,
) -> anyhow::Result<()> {
    let state = AppState::init(data_dir, config).await?;

    match cli.command {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.host.clone());
            let port = port.unwrap_or(state.config.port);
            let addr = format!("{host}:{port}");

            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(%addr, data_dir = %state.data_dir.display(), "Parley API listening");

            if !cli.quiet {
                println!();
                println!("  Parley API listening on http://{addr}");
                println!("  Data directory: {}", state.data_dir.display());
                println!("  Press Ctrl+C to stop");
                println!();
            }

            let app = http::router::build_router(state);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Session { command } => match command {
            SessionCommand::Start {
                session_id,
                language,
                status,
                metadata,
            } => {
                cli::session::start_session(&state, session_id, language, status, metadata, cli.json)
                    .await?;
            }
            SessionCommand::Show {
                session_id,
                page,
                limit,
            } => {
                cli::session::show_session(&state, &session_id, page, limit, cli.json).await?;
            }
            SessionCommand::Complete { session_id } => {
                cli::session::complete_session(&state, &session_id, cli.json).await?;
            }
            SessionCommand::SetStatus { session_id, status } => {
                cli::session::set_status(&state, &session_id, status, cli.json).await?;
            }
        },

        Commands::Event { command } => match command {
            EventCommand::Add {
                session_id,
                event_type,
                payload,
                id,
                timestamp,
            } => {
                cli::event::add_event(
                    &state,
                    &session_id,
                    event_type,
                    &payload,
                    id,
                    timestamp,
                    cli.json,
                )
                .await?;
            }
        },

        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
