//! Threat model types shared by modules, the engine, and alert sinks.
//!
//! Everything here is an immutable value: built once, read everywhere,
//! never mutated after construction. The engine and its extension points
//! exchange only these types, which keeps detection logic independent of
//! any web framework.

use std::collections::HashMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Framework-neutral view of one inbound HTTP request.
///
/// Built once per request by an adapter (see `gateway::middleware`) with the
/// body fully materialized; no module ever sees a partial body. Read-only to
/// the engine and every module, and dropped when evaluation of the request
/// finishes (or cloned once into the alert envelope on detection).
#[derive(Debug, Clone)]
pub struct SecurityRequest {
    /// Request body, decoded lossily to UTF-8.
    pub body: String,

    /// Request path, without scheme, host, or query.
    pub url: String,

    /// HTTP method, when the adapter supplies it.
    pub method: String,

    /// Request headers, one value per name.
    pub headers: HashMap<String, String>,
}

impl SecurityRequest {
    /// Build a request from the two fields every module understands.
    ///
    /// Adapters that have more context fill `method` and `headers` directly.
    pub fn new(body: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            url: url.into(),
            method: String::new(),
            headers: HashMap::new(),
        }
    }
}

/// Ordered threat severity.
///
/// Declaration order is the ordering: `Low < Medium < High < Critical`.
/// Alert handlers compare against their configured threshold with `>=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for ThreatSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ThreatSeverity::Low => "low",
            ThreatSeverity::Medium => "medium",
            ThreatSeverity::High => "high",
            ThreatSeverity::Critical => "critical",
        };
        f.write_str(name)
    }
}

/// What a detection module found.
///
/// Produced only when a module detects a threat; immutable once created.
#[derive(Debug, Clone)]
pub struct ThreatDetails {
    /// How serious the finding is; gates alert delivery per handler.
    pub severity: ThreatSeverity,

    /// Human-readable description. May embed the matched fragment; it is
    /// only ever shown to operators, never to the client.
    pub description: String,
}

impl ThreatDetails {
    pub fn new(severity: ThreatSeverity, description: impl Into<String>) -> Self {
        Self {
            severity,
            description: description.into(),
        }
    }
}

/// Alert envelope built by the engine for one detected threat.
///
/// Created exactly once per detection, shared read-only with every alert
/// handler, and dropped once fan-out completes. The `id` ties together log
/// lines and sink deliveries for the same detection.
#[derive(Debug, Clone)]
pub struct SecurityAlert {
    /// Correlation id, unique per detection.
    pub id: Uuid,

    /// The offending request as the modules saw it.
    pub request: SecurityRequest,

    /// Name of the module that detected the threat.
    pub module_name: String,

    /// Wall-clock detection time.
    pub timestamp: SystemTime,

    /// The finding itself.
    pub threat_details: ThreatDetails,
}

impl SecurityAlert {
    pub fn new(
        request: SecurityRequest,
        module_name: impl Into<String>,
        threat_details: ThreatDetails,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            module_name: module_name.into(),
            timestamp: SystemTime::now(),
            threat_details,
        }
    }

    /// Detection time as seconds since the Unix epoch, for sink payloads.
    pub fn unix_timestamp(&self) -> u64 {
        self.timestamp
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
