//! Blinkshot - webcam blink duel
//!
//! Runs the game engine against a perception source:
//! - `BLINKSHOT_SOURCE=sim` (default) for seeded synthetic players
//! - `BLINKSHOT_SOURCE=<path>` to replay recorded landmark frames
//!
//! Snapshots go to stdout as JSON lines for the renderer; `r` + Enter
//! restarts the match, `q` + Enter (or Ctrl+C) closes the session.

use std::io::Write;

use anyhow::Context;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blinkshot::config::{Config, SourceKind};
use blinkshot::game::snapshot::MatchSnapshot;
use blinkshot::perception::{PerceptionOracle, ReplaySource, SimulatedSource};
use blinkshot::session::{spawn_stdin_triggers, Session, SessionCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    info!("Starting Blinkshot");
    info!(
        width = config.game.frame_width,
        height = config.game.frame_height,
        two_player = config.game.two_player,
        fps = config.target_fps,
        "Engine configured"
    );

    let oracle = build_source(&config)?;
    let (session, handle) = Session::new(&config, oracle);

    // Renderer hand-off
    let printer = tokio::spawn(print_snapshots(handle.subscribe()));

    // Keyboard triggers
    spawn_stdin_triggers(handle.command_tx.clone());

    // Ctrl+C / SIGTERM close the session like the close button would
    let close_tx = handle.command_tx.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = close_tx.send(SessionCommand::Close).await;
    });

    let summary = session.run().await;
    drop(handle);
    let _ = printer.await;

    info!(
        frames = summary.frames,
        rounds = summary.rounds,
        state = ?summary.final_state,
        "Shutdown complete"
    );
    Ok(())
}

/// Pick the perception source named by the configuration
fn build_source(config: &Config) -> anyhow::Result<Box<dyn PerceptionOracle>> {
    match &config.source {
        SourceKind::Simulated { seed, frames } => {
            info!(seed, frames = ?frames, "Using simulated players");
            let (width, height) = (config.game.frame_width, config.game.frame_height);
            let source = SimulatedSource::new(*seed, width, height).with_limit(*frames);
            Ok(Box::new(source))
        }
        SourceKind::Replay(path) => {
            let source = ReplaySource::open(path)
                .with_context(|| format!("opening replay {}", path.display()))?;
            info!(path = %path.display(), frames = source.remaining(), "Replaying recorded frames");
            Ok(Box::new(source))
        }
    }
}

/// Write each snapshot as one JSON line on stdout
async fn print_snapshots(mut snapshots: broadcast::Receiver<MatchSnapshot>) {
    let stdout = std::io::stdout();

    loop {
        match snapshots.recv().await {
            Ok(snapshot) => {
                let line = match serde_json::to_string(&snapshot) {
                    Ok(line) => line,
                    Err(e) => {
                        warn!(error = %e, "Failed to serialize snapshot");
                        continue;
                    }
                };
                if writeln!(stdout.lock(), "{line}").is_err() {
                    // Renderer went away
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Snapshot printer lagging");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, closing session");
        }
        _ = terminate => {
            info!("Received terminate signal, closing session");
        }
    }
}
