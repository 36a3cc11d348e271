//! Structured-log alert sink.

use async_trait::async_trait;

use super::{AlertHandler, DispatchError};
use crate::model::{SecurityAlert, ThreatSeverity};

/// Writes alerts to the process log via `tracing`.
///
/// The sink of last resort: delivery cannot fail, so a low threshold here
/// guarantees every alert leaves a trace even when network sinks are down.
pub struct LogAlertHandler {
    severity_threshold: ThreatSeverity,
}

impl LogAlertHandler {
    pub fn new(severity_threshold: ThreatSeverity) -> Self {
        Self { severity_threshold }
    }
}

#[async_trait]
impl AlertHandler for LogAlertHandler {
    fn name(&self) -> &str {
        "log"
    }

    fn severity_threshold(&self) -> ThreatSeverity {
        self.severity_threshold
    }

    async fn dispatch(&self, alert: &SecurityAlert) -> Result<(), DispatchError> {
        tracing::warn!(
            alert_id = %alert.id,
            module = %alert.module_name,
            severity = %alert.threat_details.severity,
            url = %alert.request.url,
            description = %alert.threat_details.description,
            "Security alert"
        );
        Ok(())
    }
}
