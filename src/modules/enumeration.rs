//! Enumeration mitigation through response-time padding.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;

use super::{ModuleError, SecurityModule};
use crate::model::{SecurityRequest, ThreatDetails};

/// Slows probing of sensitive endpoints without ever blocking them.
///
/// Requests for a configured path are held for a fixed delay before the
/// chain continues. One delayed response is unnoticeable to a legitimate
/// caller, but the cost compounds for anyone walking an id or account space
/// through that endpoint. The module never reports a threat, so it cannot
/// short-circuit the chain.
pub struct EnumerationDelayModule {
    name: String,
    urls: HashSet<String>,
    delay: Duration,
}

impl EnumerationDelayModule {
    pub fn new(
        name: impl Into<String>,
        urls: impl IntoIterator<Item = String>,
        delay: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            urls: urls.into_iter().collect(),
            delay,
        }
    }
}

#[async_trait]
impl SecurityModule for EnumerationDelayModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn detect_threat(
        &self,
        request: &SecurityRequest,
    ) -> Result<Option<ThreatDetails>, ModuleError> {
        if self.urls.contains(&request.url) {
            tokio::time::sleep(self.delay).await;
        }
        Ok(None)
    }
}
