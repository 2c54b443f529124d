//! IVR console binary: drives the dialogue controller over stdin/stdout.
//!
//! Reads one JSON turn event per line on stdin and writes one JSON voice
//! directive per line on stdout. Logs go to stderr. Stops on EOF, SIGINT or
//! SIGTERM.

use ivr_console::{background, build_controller, config, driver};
use ivr_dialogue::CallSessionStore;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("IVR_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("ivr.toml"));

    // Load configuration
    let config = match config::load_config(selected_config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ivr-console: {e}");
            std::process::exit(2);
        }
    };

    // Initialize tracing; stdout is reserved for directives.
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    let store = Arc::new(CallSessionStore::new());
    let controller = match build_controller(&config, Arc::clone(&store)) {
        Ok(controller) => controller,
        Err(e) => {
            tracing::error!(error = %e, "invalid dialogue configuration");
            std::process::exit(2);
        }
    };

    let sweep = tokio::spawn(background::start_sweep_task(
        Arc::clone(&store),
        config.dialogue.sessions.clone(),
    ));

    tracing::info!(
        max_attempts = config.dialogue.max_attempts,
        destination = config.dialogue.handoff.destination.as_str(),
        "ivr console ready, reading turn events from stdin"
    );

    let input = BufReader::new(tokio::io::stdin());
    let output = tokio::io::stdout();

    tokio::select! {
        result = driver::run(&controller, input, output) => match result {
            Ok(stats) => tracing::info!(
                processed = stats.processed,
                skipped = stats.skipped,
                "input closed"
            ),
            Err(e) => tracing::error!(error = %e, "turn loop failed"),
        },
        () = shutdown_signal() => {}
    }

    sweep.abort();
    tracing::info!(sessions = store.len(), "ivr console shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, shutting down"); }
        () = terminate => { tracing::info!("received SIGTERM, shutting down"); }
    }
}
