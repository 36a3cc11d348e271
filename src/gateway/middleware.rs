//! Security engine middleware.
//! Evaluates every request before it reaches an application handler.

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::engine::SecurityEngine;
use crate::model::SecurityRequest;
use crate::observability::metrics;

/// Body sent with every blocked request. Deliberately generic: the matched
/// pattern and the deciding module must not leak to the client.
const BLOCKED_MESSAGE: &str = "request blocked contains suspicious pattern";

/// Shared state injected into the middleware.
#[derive(Clone)]
pub struct GateState {
    /// Current engine. Hot reload swaps the whole engine; in-flight
    /// requests keep the one they loaded.
    pub engine: Arc<ArcSwap<SecurityEngine>>,

    /// Largest body the gateway will materialize, in bytes.
    pub max_body_bytes: usize,
}

pub async fn security_gate_middleware(
    State(state): State<GateState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let (parts, body) = request.into_parts();
    let method = parts.method.to_string();
    let url = parts.uri.path().to_string();

    // 1. Materialize the body; modules inspect it as a whole.
    let body_bytes = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::warn!(
                request_id = %request_id,
                url = %url,
                limit = state.max_body_bytes,
                "Request body over limit"
            );
            metrics::record_request(&method, StatusCode::PAYLOAD_TOO_LARGE.as_u16(), start);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    // 2. Build the engine's view of the request.
    let headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let security_request = SecurityRequest {
        body: String::from_utf8_lossy(&body_bytes).into_owned(),
        url,
        method: method.clone(),
        headers,
    };

    // 3. Let the engine decide.
    let engine = state.engine.load_full();
    if engine.evaluate(&security_request).await {
        tracing::warn!(
            request_id = %request_id,
            method = %method,
            url = %security_request.url,
            "Request blocked"
        );
        metrics::record_request(&method, StatusCode::FORBIDDEN.as_u16(), start);
        return (StatusCode::FORBIDDEN, Json(json!({ "error": BLOCKED_MESSAGE })))
            .into_response();
    }

    // 4. Allowed: restore the buffered body and continue the stack.
    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}
