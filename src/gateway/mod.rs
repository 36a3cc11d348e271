//! HTTP adapter subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → middleware.rs (materialize body, build SecurityRequest)
//!     → SecurityEngine::evaluate
//!     → blocked: generic 403 JSON
//!     → allowed: restore body, continue to the application handler
//! ```
//!
//! # Design Decisions
//! - The engine never sees framework types; the adapter owns the translation
//! - Hot reload swaps in a freshly built engine; in-flight requests finish
//!   on the engine they loaded
//! - Rejection bodies stay generic so matched patterns cannot leak

pub mod middleware;
pub mod server;
pub mod shutdown;

pub use middleware::GateState;
pub use server::GatewayServer;
pub use shutdown::Shutdown;
