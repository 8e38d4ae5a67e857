//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the echo handler
//! - Wire up middleware (tracing, timeout, forwarded-header filter)
//! - Rebuild and swap the filter on config updates
//! - Serve until the shutdown signal fires

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::any, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::forwarded::{XffError, XffFilter};
use crate::http::middleware::{shared_filter, xff_middleware, SharedFilter};
use crate::http::peer::PeerAddr;

/// Echo server reporting the resolved peer address of each request.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    filter: SharedFilter,
}

impl HttpServer {
    /// Create a new HTTP server; fails if the allowed subnets are invalid.
    pub fn new(config: AppConfig) -> Result<Self, XffError> {
        let filter = shared_filter(XffFilter::new(&config.xff)?);
        let router = Self::build_router(&config, filter.clone());

        Ok(Self {
            router,
            config,
            filter,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, filter: SharedFilter) -> Router {
        Router::new()
            .route("/{*path}", any(echo_handler))
            .route("/", any(echo_handler))
            .layer(middleware::from_fn_with_state(filter, xff_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<AppConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            allowed_subnets = self.config.xff.allowed_subnets.len(),
            "HTTP server starting"
        );

        tokio::spawn(apply_config_updates(self.filter.clone(), config_updates));

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Swap in a freshly built filter for every valid config update.
async fn apply_config_updates(filter: SharedFilter, mut updates: mpsc::UnboundedReceiver<AppConfig>) {
    while let Some(config) = updates.recv().await {
        match XffFilter::new(&config.xff) {
            Ok(new_filter) => {
                filter.store(Arc::new(new_filter));
                tracing::info!(
                    allowed_subnets = config.xff.allowed_subnets.len(),
                    "Forwarded header filter reloaded"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Rejected filter reload; keeping current allow-list");
            }
        }
    }
}

async fn echo_handler(PeerAddr(peer): PeerAddr) -> Json<Value> {
    Json(json!({ "remote_addr": peer }))
}
