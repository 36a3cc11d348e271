//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::model::ThreatSeverity;

/// Root configuration for the security engine and its gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Sliding-window rate limiter settings.
    pub rate_limiter: RateLimiterConfig,

    /// Enumeration-mitigation settings.
    pub enumeration: EnumerationConfig,

    /// Payload inspection settings.
    pub payload: PayloadConfig,

    /// Alert sink settings.
    pub alerts: AlertsConfig,

    /// HTTP gateway settings.
    pub gateway: GatewayConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Rate limiter module configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimiterConfig {
    /// Whether the module is part of the chain.
    pub enabled: bool,

    /// Admitted requests per URL path within the window.
    pub max_requests: u32,

    /// Window length in seconds.
    pub time_window_secs: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            time_window_secs: 60,
        }
    }
}

/// Enumeration mitigation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnumerationConfig {
    /// Whether the module is part of the chain.
    pub enabled: bool,

    /// Delay applied to each matching request, in milliseconds.
    pub delay_ms: u64,

    /// Exact URL paths to slow down.
    pub urls: Vec<String>,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            delay_ms: 100,
            urls: Vec::new(),
        }
    }
}

/// Payload inspection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PayloadConfig {
    /// Whether the module is part of the chain.
    pub enabled: bool,

    /// Regex patterns matched against request bodies.
    pub patterns: Vec<String>,
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            patterns: default_patterns(),
        }
    }
}

fn default_patterns() -> Vec<String> {
    vec![
        r"(?i)\bunion\b.*\bselect\b".to_string(),
        r"(?i)<script".to_string(),
        r"\.\./\.\./".to_string(),
    ]
}

/// Alert sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AlertsConfig {
    /// Structured-log sink.
    pub log: LogAlertConfig,

    /// HTTP webhook sink.
    pub webhook: WebhookAlertConfig,
}

/// Log sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogAlertConfig {
    /// Whether the sink receives alerts.
    pub enabled: bool,

    /// Minimum severity this sink delivers.
    pub severity_threshold: ThreatSeverity,
}

impl Default for LogAlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity_threshold: ThreatSeverity::Low,
        }
    }
}

/// Webhook sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebhookAlertConfig {
    /// Whether the sink receives alerts.
    pub enabled: bool,

    /// Minimum severity this sink delivers.
    pub severity_threshold: ThreatSeverity,

    /// Destination for alert POSTs (e.g. a Slack incoming webhook).
    pub webhook_url: String,
}

impl Default for WebhookAlertConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            severity_threshold: ThreatSeverity::Medium,
            webhook_url: String::new(),
        }
    }
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Largest request body the gateway will materialize, in bytes.
    pub max_body_bytes: usize,

    /// How often stale rate-limiter paths are swept, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 2 * 1024 * 1024,
            sweep_interval_secs: 300,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level filter (e.g., "info", "debug").
    pub log_level: String,

    /// Whether to expose Prometheus metrics.
    pub metrics_enabled: bool,

    /// Metrics scrape address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
