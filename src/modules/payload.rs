//! Regex inspection of request bodies.

use async_trait::async_trait;
use regex::Regex;

use super::{ModuleError, SecurityModule};
use crate::model::{SecurityRequest, ThreatDetails, ThreatSeverity};

/// Scans request bodies against a set of compiled patterns.
///
/// The first matching pattern produces a medium-severity threat whose
/// description embeds the matched fragment, so operators can see what
/// tripped the gate without digging through the raw body. An empty body
/// never matches, whatever the patterns say.
pub struct MaliciousPayloadModule {
    name: String,
    patterns: Vec<Regex>,
}

impl MaliciousPayloadModule {
    /// Compile every pattern up front. An invalid pattern fails construction
    /// so it can never fail a request later.
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        patterns: &[S],
    ) -> Result<Self, regex::Error> {
        let compiled = patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.into(),
            patterns: compiled,
        })
    }
}

#[async_trait]
impl SecurityModule for MaliciousPayloadModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn detect_threat(
        &self,
        request: &SecurityRequest,
    ) -> Result<Option<ThreatDetails>, ModuleError> {
        if request.body.is_empty() {
            return Ok(None);
        }

        for pattern in &self.patterns {
            if let Some(found) = pattern.find(&request.body) {
                return Ok(Some(ThreatDetails::new(
                    ThreatSeverity::Medium,
                    format!("malicious payload found in request body: {:?}", found.as_str()),
                )));
            }
        }

        Ok(None)
    }
}
