//! In-process HTTP threat-detection gate.
//!
//! A configurable chain of detection modules evaluates every request and
//! blocks on the first threat found; alert sinks fan out the finding. The
//! engine itself is framework-agnostic; `gateway` adapts it to Axum.

pub mod alerts;
pub mod config;
pub mod engine;
pub mod gateway;
pub mod model;
pub mod modules;
pub mod observability;

pub use config::schema::EngineConfig;
pub use engine::SecurityEngine;
pub use gateway::{GatewayServer, Shutdown};
pub use model::{SecurityAlert, SecurityRequest, ThreatDetails, ThreatSeverity};
