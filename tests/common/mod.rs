//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::State, routing::post, Json, Router};
use tokio::net::TcpListener;

use api_security_engine::gateway::Shutdown;
use api_security_engine::{EngineConfig, GatewayServer};

/// Payloads captured by the mock alert sink, in arrival order.
pub type Captured = Arc<Mutex<Vec<serde_json::Value>>>;

/// Start a mock alert sink that records every JSON payload POSTed to
/// `/alerts`. Returns its address and the capture buffer.
pub async fn start_alert_sink() -> (SocketAddr, Captured) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let state = captured.clone();

    let app = Router::new().route("/alerts", post(capture)).with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, captured)
}

async fn capture(State(captured): State<Captured>, Json(payload): Json<serde_json::Value>) -> &'static str {
    captured.lock().unwrap().push(payload);
    "ok"
}

/// Start a gateway with the given config on an ephemeral port.
///
/// Returns the bound address and a shutdown handle; trigger it to stop the
/// server at the end of a test.
pub async fn spawn_gateway(config: EngineConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let (_config_tx, config_updates) = tokio::sync::mpsc::unbounded_channel();

    let server = GatewayServer::new(config).unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    // Give the server task a beat to start accepting.
    tokio::time::sleep(Duration::from_millis(100)).await;

    (addr, shutdown)
}

/// Non-pooled HTTP client, so each test request opens a fresh connection.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
