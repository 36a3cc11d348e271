//! HTTP webhook alert sink.

use async_trait::async_trait;
use serde_json::json;

use super::{AlertHandler, DispatchError};
use crate::model::{SecurityAlert, ThreatSeverity};

/// POSTs alerts as Slack-compatible JSON to a configured webhook URL.
///
/// The payload is a color-coded attachment, so a Slack incoming webhook
/// renders it directly and any other collector can parse it as plain JSON.
/// One `reqwest::Client` is shared across deliveries.
pub struct WebhookAlertHandler {
    severity_threshold: ThreatSeverity,
    webhook_url: String,
    client: reqwest::Client,
}

impl WebhookAlertHandler {
    pub fn new(severity_threshold: ThreatSeverity, webhook_url: impl Into<String>) -> Self {
        Self {
            severity_threshold,
            webhook_url: webhook_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

fn severity_color(severity: ThreatSeverity) -> &'static str {
    match severity {
        ThreatSeverity::Low => "#36a64f",
        ThreatSeverity::Medium => "#daa520",
        ThreatSeverity::High => "#e8743b",
        ThreatSeverity::Critical => "#dc3545",
    }
}

fn build_payload(alert: &SecurityAlert) -> serde_json::Value {
    json!({
        "text": format!("Security alert from {}", alert.module_name),
        "attachments": [{
            "color": severity_color(alert.threat_details.severity),
            "title": format!("[{}] {}", alert.threat_details.severity, alert.module_name),
            "text": alert.threat_details.description,
            "fields": [
                { "title": "Alert ID", "value": alert.id.to_string(), "short": true },
                { "title": "URL", "value": alert.request.url, "short": true },
                { "title": "Detected", "value": alert.unix_timestamp(), "short": true },
            ],
        }]
    })
}

#[async_trait]
impl AlertHandler for WebhookAlertHandler {
    fn name(&self) -> &str {
        "webhook"
    }

    fn severity_threshold(&self) -> ThreatSeverity {
        self.severity_threshold
    }

    async fn dispatch(&self, alert: &SecurityAlert) -> Result<(), DispatchError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&build_payload(alert))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DispatchError::Sink(format!(
                "webhook returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SecurityRequest, ThreatDetails};

    fn sample_alert(severity: ThreatSeverity) -> SecurityAlert {
        SecurityAlert::new(
            SecurityRequest::new("1 OR 1=1", "/api/user_login/"),
            "malicious_payload",
            ThreatDetails::new(severity, "malicious payload found in request body"),
        )
    }

    #[test]
    fn payload_carries_alert_context() {
        let alert = sample_alert(ThreatSeverity::Medium);
        let payload = build_payload(&alert);

        assert!(payload["text"].as_str().unwrap().contains("malicious_payload"));

        let attachment = &payload["attachments"][0];
        assert_eq!(attachment["color"], "#daa520");
        assert!(attachment["title"].as_str().unwrap().contains("medium"));
        assert_eq!(
            attachment["fields"][0]["value"].as_str().unwrap(),
            alert.id.to_string()
        );
        assert_eq!(attachment["fields"][1]["value"], "/api/user_login/");
    }

    #[test]
    fn colors_cover_every_severity() {
        let colors: Vec<_> = [
            ThreatSeverity::Low,
            ThreatSeverity::Medium,
            ThreatSeverity::High,
            ThreatSeverity::Critical,
        ]
        .iter()
        .map(|s| severity_color(*s))
        .collect();

        for color in &colors {
            assert!(color.starts_with('#'));
        }
        assert_eq!(colors.len(), 4);
    }

    #[tokio::test]
    async fn unreachable_sink_reports_transport_error() {
        // Nothing listens on port 9; dispatch must surface the failure.
        let handler = WebhookAlertHandler::new(ThreatSeverity::Low, "http://127.0.0.1:9/alerts");
        let result = handler.dispatch(&sample_alert(ThreatSeverity::High)).await;
        assert!(matches!(result, Err(DispatchError::Http(_))));
    }
}
