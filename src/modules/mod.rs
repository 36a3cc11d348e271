//! Detection modules.
//!
//! # Data Flow
//!
//! ```text
//! SecurityRequest
//!     → engine walks the configured chain in order
//!     → each module answers: no threat / threat found / module failed
//!     → first threat short-circuits the chain
//! ```
//!
//! # Design Decisions
//!
//! - Modules see only `SecurityRequest`, never framework types
//! - A failing module must not decide anything: the engine logs the error
//!   and keeps evaluating, so one broken detector cannot open or close
//!   the gate on its own
//! - Modules own their internal state and must tolerate concurrent calls

pub mod enumeration;
pub mod payload;
pub mod rate_limiter;

pub use enumeration::EnumerationDelayModule;
pub use payload::MaliciousPayloadModule;
pub use rate_limiter::RateLimiterModule;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{SecurityRequest, ThreatDetails};

/// Error raised by a detection module.
///
/// The engine absorbs it: the failing module is treated as non-matching for
/// the current request and evaluation continues with the next module.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// Internal failure described by the module itself.
    #[error("detection failed: {0}")]
    Detection(String),
}

/// A pluggable threat detector evaluated for every request.
///
/// `Ok(None)` means no threat, `Ok(Some(..))` means the request must be
/// blocked, `Err(..)` means the module itself failed and must not influence
/// the decision. Implementations may keep internal state (the rate limiter
/// does) behind `&self`.
#[async_trait]
pub trait SecurityModule: Send + Sync {
    /// Stable module name used in alerts, logs, and metrics.
    fn name(&self) -> &str;

    /// Inspect one request and report a threat if found.
    async fn detect_threat(
        &self,
        request: &SecurityRequest,
    ) -> Result<Option<ThreatDetails>, ModuleError>;
}
