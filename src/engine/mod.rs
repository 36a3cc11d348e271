//! Request evaluation and alert fan-out.
//!
//! # Data Flow
//!
//! ```text
//! SecurityRequest
//!     → modules, in order; first threat wins
//!     → threat: build one SecurityAlert, submit to every handler, block
//!     → no threat from any module: allow
//! ```
//!
//! # Design Decisions
//!
//! - `evaluate` returns a plain bool and never fails; module and handler
//!   errors are logged and absorbed so the gate always reaches a decision
//! - The module chain and handler list are fixed at construction; hot
//!   reload builds a whole new engine rather than mutating a running one
//! - The alert envelope is built exactly once per detection and shared
//!   read-only with the handlers

use std::sync::Arc;
use std::time::Duration;

use crate::alerts::{AlertHandler, LogAlertHandler, WebhookAlertHandler};
use crate::config::loader::ConfigError;
use crate::config::schema::EngineConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::model::{SecurityAlert, SecurityRequest};
use crate::modules::{
    EnumerationDelayModule, MaliciousPayloadModule, RateLimiterModule, SecurityModule,
};
use crate::observability::metrics;

/// The threat-detection gate.
///
/// Owns an ordered chain of detection modules and a list of alert sinks.
/// All state lives behind `&self`; one engine serves concurrent requests.
pub struct SecurityEngine {
    modules: Vec<Arc<dyn SecurityModule>>,
    alert_handlers: Vec<Arc<dyn AlertHandler>>,
    /// Maintenance handle to the built-in rate limiter, when configured.
    rate_limiter: Option<Arc<RateLimiterModule>>,
}

impl SecurityEngine {
    /// Assemble an engine from caller-built modules and handlers.
    ///
    /// Module order is evaluation order; handler order is delivery order.
    pub fn new(
        modules: Vec<Arc<dyn SecurityModule>>,
        alert_handlers: Vec<Arc<dyn AlertHandler>>,
    ) -> Self {
        Self {
            modules,
            alert_handlers,
            rate_limiter: None,
        }
    }

    /// Build the standard module chain and sink list from configuration.
    ///
    /// The configuration is validated first, so an engine that constructs
    /// successfully can never fail a request over bad settings.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        validate_config(config).map_err(ConfigError::Validation)?;

        let mut modules: Vec<Arc<dyn SecurityModule>> = Vec::new();
        let mut rate_limiter = None;

        if config.rate_limiter.enabled {
            let limiter = Arc::new(RateLimiterModule::new(
                "rate_limiter",
                config.rate_limiter.max_requests,
                Duration::from_secs(config.rate_limiter.time_window_secs),
            ));
            modules.push(limiter.clone() as Arc<dyn SecurityModule>);
            rate_limiter = Some(limiter);
        }

        if config.enumeration.enabled {
            modules.push(Arc::new(EnumerationDelayModule::new(
                "enumeration_delay",
                config.enumeration.urls.iter().cloned(),
                Duration::from_millis(config.enumeration.delay_ms),
            )));
        }

        if config.payload.enabled {
            let module = MaliciousPayloadModule::new("malicious_payload", &config.payload.patterns)
                .map_err(|e| {
                    let pattern = config
                        .payload
                        .patterns
                        .iter()
                        .find(|p| regex::Regex::new(p).is_err())
                        .cloned()
                        .unwrap_or_default();
                    ConfigError::Validation(vec![ValidationError::InvalidPattern {
                        pattern,
                        reason: e.to_string(),
                    }])
                })?;
            modules.push(Arc::new(module));
        }

        let mut alert_handlers: Vec<Arc<dyn AlertHandler>> = Vec::new();

        if config.alerts.log.enabled {
            alert_handlers.push(Arc::new(LogAlertHandler::new(
                config.alerts.log.severity_threshold,
            )));
        }

        if config.alerts.webhook.enabled {
            alert_handlers.push(Arc::new(WebhookAlertHandler::new(
                config.alerts.webhook.severity_threshold,
                config.alerts.webhook.webhook_url.clone(),
            )));
        }

        tracing::info!(
            modules = modules.len(),
            alert_handlers = alert_handlers.len(),
            "Security engine initialized"
        );

        Ok(Self {
            modules,
            alert_handlers,
            rate_limiter,
        })
    }

    /// Evaluate one request against the module chain.
    ///
    /// Returns `true` when the request must be blocked. Never fails: module
    /// and handler errors are logged and absorbed, only the decision
    /// escapes. Alert fan-out completes before this returns.
    pub async fn evaluate(&self, request: &SecurityRequest) -> bool {
        for module in &self.modules {
            match module.detect_threat(request).await {
                Ok(Some(threat_details)) => {
                    metrics::record_threat(module.name(), threat_details.severity);
                    tracing::debug!(
                        module = module.name(),
                        severity = %threat_details.severity,
                        url = %request.url,
                        "Threat detected"
                    );

                    let alert = SecurityAlert::new(request.clone(), module.name(), threat_details);
                    self.fan_out(&alert).await;
                    return true;
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::error!(
                        module = module.name(),
                        error = %error,
                        "Threat detection failed"
                    );
                    metrics::record_module_failure(module.name());
                }
            }
        }

        false
    }

    /// Deliver `alert` to every handler in configuration order.
    ///
    /// A failing handler is logged; the remaining handlers still run.
    async fn fan_out(&self, alert: &SecurityAlert) {
        for handler in &self.alert_handlers {
            match handler.submit(alert).await {
                Ok(()) => metrics::record_alert_submission(handler.name(), true),
                Err(error) => {
                    tracing::error!(
                        handler = handler.name(),
                        alert_id = %alert.id,
                        error = %error,
                        "Alert handler failed"
                    );
                    metrics::record_alert_submission(handler.name(), false);
                }
            }
        }
    }

    /// Drop rate-limiter history for paths that have gone quiet.
    pub fn sweep(&self) {
        if let Some(limiter) = &self.rate_limiter {
            let removed = limiter.sweep();
            if removed > 0 {
                tracing::debug!(removed, "Swept stale rate-limiter paths");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::alerts::DispatchError;
    use crate::model::{ThreatDetails, ThreatSeverity};
    use crate::modules::ModuleError;

    enum Behavior {
        Pass,
        Detect(ThreatSeverity),
        Fail,
    }

    struct StubModule {
        name: &'static str,
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl StubModule {
        fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                name,
                behavior,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SecurityModule for StubModule {
        fn name(&self) -> &str {
            self.name
        }

        async fn detect_threat(
            &self,
            _request: &SecurityRequest,
        ) -> Result<Option<ThreatDetails>, ModuleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Pass => Ok(None),
                Behavior::Detect(severity) => {
                    Ok(Some(ThreatDetails::new(*severity, "stub finding")))
                }
                Behavior::Fail => Err(ModuleError::Detection("stub failure".to_string())),
            }
        }
    }

    struct CapturingHandler {
        alerts: Mutex<Vec<SecurityAlert>>,
        fail: bool,
    }

    impl CapturingHandler {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                alerts: Mutex::new(Vec::new()),
                fail,
            })
        }

        fn received(&self) -> Vec<SecurityAlert> {
            self.alerts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AlertHandler for CapturingHandler {
        fn name(&self) -> &str {
            "capturing"
        }

        fn severity_threshold(&self) -> ThreatSeverity {
            ThreatSeverity::Low
        }

        async fn dispatch(&self, alert: &SecurityAlert) -> Result<(), DispatchError> {
            self.alerts.lock().unwrap().push(alert.clone());
            if self.fail {
                Err(DispatchError::Sink("stub sink down".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn request() -> SecurityRequest {
        SecurityRequest::new("body", "/api/resource")
    }

    #[tokio::test]
    async fn clean_request_is_allowed() {
        let module = StubModule::new("m1", Behavior::Pass);
        let handler = CapturingHandler::new(false);
        let engine = SecurityEngine::new(vec![module.clone()], vec![handler.clone()]);

        assert!(!engine.evaluate(&request()).await);
        assert_eq!(module.calls(), 1);
        assert!(handler.received().is_empty());
    }

    #[tokio::test]
    async fn detection_blocks_and_alerts() {
        let module = StubModule::new("m1", Behavior::Detect(ThreatSeverity::High));
        let handler = CapturingHandler::new(false);
        let engine = SecurityEngine::new(vec![module], vec![handler.clone()]);

        assert!(engine.evaluate(&request()).await);

        let alerts = handler.received();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].module_name, "m1");
        assert_eq!(alerts[0].threat_details.severity, ThreatSeverity::High);
        assert_eq!(alerts[0].request.url, "/api/resource");
    }

    #[tokio::test]
    async fn first_detection_short_circuits() {
        let first = StubModule::new("m1", Behavior::Detect(ThreatSeverity::Low));
        let second = StubModule::new("m2", Behavior::Detect(ThreatSeverity::Critical));
        let engine = SecurityEngine::new(vec![first.clone(), second.clone()], vec![]);

        assert!(engine.evaluate(&request()).await);
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn module_failure_is_absorbed() {
        let failing = StubModule::new("m1", Behavior::Fail);
        let engine = SecurityEngine::new(vec![failing.clone()], vec![]);

        // The only module failed; the gate stays open.
        assert!(!engine.evaluate(&request()).await);
        assert_eq!(failing.calls(), 1);
    }

    #[tokio::test]
    async fn evaluation_continues_past_failed_module() {
        let failing = StubModule::new("m1", Behavior::Fail);
        let detecting = StubModule::new("m2", Behavior::Detect(ThreatSeverity::Medium));
        let handler = CapturingHandler::new(false);
        let engine =
            SecurityEngine::new(vec![failing, detecting.clone()], vec![handler.clone()]);

        assert!(engine.evaluate(&request()).await);
        assert_eq!(detecting.calls(), 1);
        assert_eq!(handler.received()[0].module_name, "m2");
    }

    #[tokio::test]
    async fn failed_handler_does_not_stop_the_next() {
        let module = StubModule::new("m1", Behavior::Detect(ThreatSeverity::High));
        let failing = CapturingHandler::new(true);
        let working = CapturingHandler::new(false);
        let engine =
            SecurityEngine::new(vec![module], vec![failing.clone(), working.clone()]);

        assert!(engine.evaluate(&request()).await);
        assert_eq!(failing.received().len(), 1);
        assert_eq!(working.received().len(), 1);
    }

    #[tokio::test]
    async fn handlers_share_one_alert_instance() {
        let module = StubModule::new("m1", Behavior::Detect(ThreatSeverity::High));
        let first = CapturingHandler::new(false);
        let second = CapturingHandler::new(false);
        let engine = SecurityEngine::new(vec![module], vec![first.clone(), second.clone()]);

        engine.evaluate(&request()).await;
        assert_eq!(first.received()[0].id, second.received()[0].id);
    }

    #[tokio::test]
    async fn from_config_accepts_defaults() {
        let engine = SecurityEngine::from_config(&EngineConfig::default()).unwrap();
        assert!(!engine.evaluate(&SecurityRequest::new("harmless", "/api/ping")).await);
    }

    #[tokio::test]
    async fn from_config_rejects_invalid_settings() {
        let mut config = EngineConfig::default();
        config.rate_limiter.max_requests = 0;

        assert!(matches!(
            SecurityEngine::from_config(&config),
            Err(ConfigError::Validation(_))
        ));
    }
}
