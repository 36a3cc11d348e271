//! Alert sinks.
//!
//! # Data Flow
//!
//! ```text
//! SecurityAlert (one per detection)
//!     → engine submits to every handler in configuration order
//!     → submit: drop below-threshold alerts, forward the rest to dispatch
//!     → dispatch: sink-specific delivery (log line, webhook POST, ...)
//! ```
//!
//! # Design Decisions
//!
//! - Filtering lives in the provided `submit`, so every sink gets the same
//!   `>=` threshold semantics without reimplementing it
//! - A failing sink is logged by the engine and the remaining sinks still
//!   receive the alert; delivery is best-effort by contract
//! - Handlers never see each other and never learn the block decision

pub mod log;
pub mod webhook;

pub use log::LogAlertHandler;
pub use webhook::WebhookAlertHandler;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{SecurityAlert, ThreatSeverity};

/// Error raised while delivering an alert to a sink.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The sink answered but rejected the alert.
    #[error("sink rejected alert: {0}")]
    Sink(String),

    /// The HTTP transport to the sink failed.
    #[error("http dispatch failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// An alert sink with a configured severity floor.
///
/// `submit` is what the engine calls; `dispatch` is what implementations
/// write. Handlers must tolerate concurrent submissions.
#[async_trait]
pub trait AlertHandler: Send + Sync {
    /// Sink name used in logs and metrics.
    fn name(&self) -> &str;

    /// Minimum severity this handler delivers.
    fn severity_threshold(&self) -> ThreatSeverity;

    /// Deliver one alert to the sink.
    async fn dispatch(&self, alert: &SecurityAlert) -> Result<(), DispatchError>;

    /// Deliver `alert` if it meets the severity threshold, else do nothing.
    async fn submit(&self, alert: &SecurityAlert) -> Result<(), DispatchError> {
        if alert.threat_details.severity >= self.severity_threshold() {
            self.dispatch(alert).await
        } else {
            Ok(())
        }
    }
}
