//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use xff::{AppConfig, HttpServer, Shutdown};

/// A running echo server on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_updates: mpsc::UnboundedSender<AppConfig>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Start the echo server with the given allowed subnets.
pub async fn start_server(allowed_subnets: &[&str]) -> TestServer {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.xff.allowed_subnets = allowed_subnets.iter().map(|s| s.to_string()).collect();

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let (config_updates, updates_rx) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, updates_rx, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    TestServer {
        addr,
        shutdown,
        config_updates,
    }
}

/// Send a request with optional forwarded headers; return `remote_addr`.
pub async fn remote_addr(url: &str, xff: Option<&str>, xfp: Option<&str>) -> String {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let mut req = client.get(url);
    if let Some(xff) = xff {
        req = req.header("X-Forwarded-For", xff);
    }
    if let Some(xfp) = xfp {
        req = req.header("X-Forwarded-Port", xfp);
    }

    let res = req.send().await.expect("server unreachable");
    assert_eq!(res.status(), 200);

    let body: Value = res.json().await.unwrap();
    body["remote_addr"].as_str().unwrap().to_string()
}
