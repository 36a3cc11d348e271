//! Gateway server setup and lifecycle.
//!
//! # Responsibilities
//! - Create Axum Router with the protected endpoints
//! - Wire up middleware (security gate, tracing, limits, request ID)
//! - Bind server to listener
//! - Rebuild the engine when the config watcher delivers an update
//! - Sweep stale rate-limiter state on a timer
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ConfigError, EngineConfig};
use crate::engine::SecurityEngine;
use crate::gateway::middleware::{security_gate_middleware, GateState};

/// HTTP gateway guarded by the security engine.
pub struct GatewayServer {
    router: Router,
    engine: Arc<ArcSwap<SecurityEngine>>,
    config: EngineConfig,
}

impl GatewayServer {
    /// Create a gateway and its engine from validated configuration.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let engine = Arc::new(ArcSwap::from_pointee(SecurityEngine::from_config(&config)?));

        let state = GateState {
            engine: engine.clone(),
            max_body_bytes: config.gateway.max_body_bytes,
        };

        let router = Self::build_router(&config, state);

        Ok(Self {
            router,
            engine,
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &EngineConfig, state: GateState) -> Router {
        Router::new()
            .route("/api/example-endpoint/", post(echo_body))
            .route("/api/user_login/", post(user_login))
            .route("/api/public-data", get(public_data))
            .layer(middleware::from_fn_with_state(state, security_gate_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.gateway.request_timeout_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// `config_updates` delivers validated configurations from the watcher;
    /// each builds a fresh engine which replaces the running one atomically.
    /// Rate-limiter history starts empty in the replacement.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<EngineConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let Self {
            router,
            engine,
            config,
        } = self;

        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Gateway starting");

        spawn_reload_task(engine.clone(), config_updates);
        spawn_sweep_task(
            engine,
            Duration::from_secs(config.gateway.sweep_interval_secs),
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// Rebuild the engine for every configuration the watcher delivers.
///
/// A config that fails engine construction is rejected and the current
/// engine stays in place. Ends when the watcher side is dropped.
fn spawn_reload_task(
    engine: Arc<ArcSwap<SecurityEngine>>,
    mut config_updates: mpsc::UnboundedReceiver<EngineConfig>,
) {
    tokio::spawn(async move {
        while let Some(new_config) = config_updates.recv().await {
            match SecurityEngine::from_config(&new_config) {
                Ok(new_engine) => {
                    engine.store(Arc::new(new_engine));
                    tracing::info!("Engine rebuilt from updated configuration");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Rejected configuration update");
                }
            }
        }
    });
}

/// Periodically drop rate-limiter history for paths that went quiet.
fn spawn_sweep_task(engine: Arc<ArcSwap<SecurityEngine>>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            engine.load().sweep();
        }
    });
}

/// Echo endpoint standing in for a typical protected resource.
async fn echo_body(body: String) -> Json<serde_json::Value> {
    Json(json!({ "request_body": body }))
}

async fn user_login() -> Json<serde_json::Value> {
    Json(json!({ "status": "OK" }))
}

async fn public_data() -> Json<serde_json::Value> {
    Json(json!({ "data": "This is public data" }))
}
