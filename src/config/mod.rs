//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → EngineConfig (validated, immutable)
//!     → SecurityEngine::from_config builds the module chain and sinks
//!
//! On reload signal:
//!     watcher.rs detects change
//!     → loader.rs loads and validates the new config
//!     → gateway builds a fresh SecurityEngine
//!     → atomic swap; in-flight requests finish on the old engine
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a full engine rebuild
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::EngineConfig;
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
