//! Forwarded-header echo server.
//!
//! Replies to every request with the peer address as resolved by the
//! forwarded-header filter:
//!
//! ```text
//! $ curl -H 'X-Forwarded-For: 68.45.152.220' localhost:8080
//! {"remote_addr":"68.45.152.220:53412"}
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use xff::config::{load_config, validate_config, AppConfig, ConfigError, ConfigWatcher};
use xff::lifecycle::{shutdown_on_signal, Shutdown};
use xff::observability::{logging, metrics};
use xff::HttpServer;

#[derive(Parser)]
#[command(name = "xff-server")]
#[command(about = "Echo server resolving client addresses from X-Forwarded-* headers", long_about = None)]
struct Args {
    /// TOML configuration file; watched for changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Trusted proxy subnet (repeatable). Overrides the file at startup only.
    #[arg(long = "allow", value_name = "CIDR")]
    allow: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if !args.allow.is_empty() {
        config.xff.allowed_subnets = args.allow;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        allowed_subnets = ?config.xff.allowed_subnets,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    // Keep the watcher alive for the lifetime of the server.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            match watcher.run() {
                Ok(watcher) => (Some(watcher), updates),
                Err(e) => {
                    tracing::warn!(error = %e, "Config watcher unavailable; hot reload disabled");
                    (None, updates)
                }
            }
        }
        None => (None, mpsc::unbounded_channel().1),
    };

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move { shutdown_on_signal(&shutdown).await }
    });

    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
