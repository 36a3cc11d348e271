//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (window > 0, body cap > 0)
//! - Compile-check payload patterns and parse-check sink URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: EngineConfig → Result<(), Vec<ValidationError>>
//! - Runs before a config is accepted into the system
//! - Disabled sections are not validated; operators can park half-written
//!   sections behind `enabled = false`

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::EngineConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("rate_limiter.max_requests must be greater than zero")]
    ZeroMaxRequests,

    #[error("rate_limiter.time_window_secs must be greater than zero")]
    ZeroTimeWindow,

    #[error("enumeration.delay_ms must be greater than zero")]
    ZeroDelay,

    #[error("enumeration.urls must not be empty when the module is enabled")]
    EmptyEnumerationUrls,

    #[error("payload.patterns must not be empty when the module is enabled")]
    EmptyPatterns,

    #[error("payload pattern {pattern:?} does not compile: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("alerts.webhook.webhook_url is not a valid URL: {0}")]
    InvalidWebhookUrl(String),

    #[error("gateway.bind_address is not a valid socket address: {0:?}")]
    InvalidBindAddress(String),

    #[error("gateway.max_body_bytes must be greater than zero")]
    ZeroBodyCap,

    #[error("observability.metrics_address is not a valid socket address: {0:?}")]
    InvalidMetricsAddress(String),
}

/// Validate semantic constraints on a parsed configuration.
pub fn validate_config(config: &EngineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.rate_limiter.enabled {
        if config.rate_limiter.max_requests == 0 {
            errors.push(ValidationError::ZeroMaxRequests);
        }
        if config.rate_limiter.time_window_secs == 0 {
            errors.push(ValidationError::ZeroTimeWindow);
        }
    }

    if config.enumeration.enabled {
        if config.enumeration.delay_ms == 0 {
            errors.push(ValidationError::ZeroDelay);
        }
        if config.enumeration.urls.is_empty() {
            errors.push(ValidationError::EmptyEnumerationUrls);
        }
    }

    if config.payload.enabled {
        if config.payload.patterns.is_empty() {
            errors.push(ValidationError::EmptyPatterns);
        }
        for pattern in &config.payload.patterns {
            if let Err(e) = regex::Regex::new(pattern) {
                errors.push(ValidationError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if config.alerts.webhook.enabled {
        if let Err(e) = Url::parse(&config.alerts.webhook.webhook_url) {
            errors.push(ValidationError::InvalidWebhookUrl(e.to_string()));
        }
    }

    if config.gateway.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.gateway.bind_address.clone(),
        ));
    }
    if config.gateway.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyCap);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_violation() {
        let mut config = EngineConfig::default();
        config.rate_limiter.max_requests = 0;
        config.rate_limiter.time_window_secs = 0;
        config.payload.patterns = vec!["(".to_string()];
        config.gateway.bind_address = "not-an-address".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn disabled_sections_are_not_checked() {
        let mut config = EngineConfig::default();
        config.rate_limiter.enabled = false;
        config.rate_limiter.max_requests = 0;

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn enabled_webhook_requires_valid_url() {
        let mut config = EngineConfig::default();
        config.alerts.webhook.enabled = true;
        config.alerts.webhook.webhook_url = "not a url".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidWebhookUrl(_)));
    }

    #[test]
    fn bad_pattern_is_reported_with_its_source() {
        let mut config = EngineConfig::default();
        config.payload.patterns = vec!["valid".to_string(), "[unclosed".to_string()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            ValidationError::InvalidPattern { pattern, .. } => {
                assert_eq!(pattern, "[unclosed");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
