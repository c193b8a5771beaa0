//! sessiond - in-memory session store with an HTTP API.
//!
//! Usage:
//!   sessiond serve [--port 3000] [--ttl-secs 180] [--sweep-interval-secs 60]

use std::process::exit;
use std::time::Duration;

use clap::{Parser, Subcommand};
use sessiond::config::{SessionConfig, DEFAULT_COMMAND_BUFFER};
use sessiond::http_server;
use sessiond::session::SessionManager;
use sessiond::state::AppState;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "sessiond")]
#[command(about = "In-memory session store with an HTTP API")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "3000")]
        port: u16,

        /// Session inactivity lifetime in seconds
        #[arg(long, default_value = "180")]
        ttl_secs: u64,

        /// Seconds between expired-session sweeps
        #[arg(long, default_value = "60")]
        sweep_interval_secs: u64,

        /// Commands the session actor may have queued
        #[arg(long, default_value_t = DEFAULT_COMMAND_BUFFER)]
        command_buffer: usize,

        /// Per-request timeout in milliseconds (waits indefinitely if unset)
        #[arg(long)]
        request_timeout_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    match args.command {
        Commands::Serve {
            port,
            ttl_secs,
            sweep_interval_secs,
            command_buffer,
            request_timeout_ms,
        } => {
            let config = SessionConfig::default()
                .with_ttl(Duration::from_secs(ttl_secs))
                .with_sweep_interval(Duration::from_secs(sweep_interval_secs))
                .with_command_buffer(command_buffer)
                .with_request_timeout(request_timeout_ms.map(Duration::from_millis));

            let manager = match SessionManager::start(config).await {
                Ok(manager) => manager,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    exit(1);
                }
            };

            let state = AppState::new(manager.handle());
            let result = http_server::run_server(port, state, shutdown_signal()).await;

            manager.stop().await;
            info!("Session manager stopped");

            if let Err(e) = result {
                error!("HTTP server failed: {}", e);
                exit(1);
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
