//! Sliding-window rate limiting keyed by request URL path.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{ModuleError, SecurityModule};
use crate::model::{SecurityRequest, ThreatDetails, ThreatSeverity};

/// Detects request floods against individual URL paths.
///
/// Keeps one timestamp per admitted request and reports a low-severity
/// threat once a path has seen `max_requests` admitted requests within the
/// trailing `time_window`. A blocked request is never recorded, so hammering
/// a limited path cannot extend its own lockout; the path reopens as soon as
/// enough admitted timestamps age out.
///
/// History for a path is pruned whenever that path is looked up. Paths that
/// stop receiving traffic keep their stale entries until [`sweep`] runs.
///
/// [`sweep`]: RateLimiterModule::sweep
pub struct RateLimiterModule {
    name: String,
    max_requests: u32,
    time_window: Duration,
    history: DashMap<String, Vec<Instant>>,
}

impl RateLimiterModule {
    /// Create a limiter admitting `max_requests` per `time_window` per path.
    pub fn new(name: impl Into<String>, max_requests: u32, time_window: Duration) -> Self {
        Self {
            name: name.into(),
            max_requests,
            time_window,
            history: DashMap::new(),
        }
    }

    /// Drop paths whose recorded requests have all aged out of the window.
    ///
    /// Lookups already prune their own path, so sweeping only reclaims
    /// memory for paths that stopped receiving traffic. It never changes a
    /// decision. Returns the number of paths dropped.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.history.len();
        self.history
            .retain(|_, stamps| stamps.iter().any(|t| now.duration_since(*t) <= self.time_window));
        before.saturating_sub(self.history.len())
    }

    /// Number of paths currently tracked.
    pub fn tracked_paths(&self) -> usize {
        self.history.len()
    }
}

#[async_trait]
impl SecurityModule for RateLimiterModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn detect_threat(
        &self,
        request: &SecurityRequest,
    ) -> Result<Option<ThreatDetails>, ModuleError> {
        let now = Instant::now();

        // The entry guard is the per-path critical section: prune, check,
        // and append must not interleave with another request for the same
        // path. No await happens while it is held.
        let mut entry = self.history.entry(request.url.clone()).or_default();
        let stamps = entry.value_mut();

        // The window boundary is inclusive: a request exactly `time_window`
        // old still counts against the limit.
        stamps.retain(|t| now.duration_since(*t) <= self.time_window);

        if stamps.len() >= self.max_requests as usize {
            return Ok(Some(ThreatDetails::new(
                ThreatSeverity::Low,
                format!(
                    "limit for {} exceeded {} requests in {} sec",
                    request.url,
                    self.max_requests,
                    self.time_window.as_secs()
                ),
            )));
        }

        stamps.push(now);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn request(url: &str) -> SecurityRequest {
        SecurityRequest::new("", url)
    }

    #[tokio::test]
    async fn admits_up_to_limit_then_blocks() {
        let module = RateLimiterModule::new("rate_limiter", 3, Duration::from_secs(60));

        for _ in 0..3 {
            let result = module.detect_threat(&request("/api/resource")).await.unwrap();
            assert!(result.is_none());
        }

        let threat = module
            .detect_threat(&request("/api/resource"))
            .await
            .unwrap()
            .expect("request over the limit must be flagged");
        assert_eq!(threat.severity, ThreatSeverity::Low);
        assert!(threat.description.contains("/api/resource"));
    }

    #[tokio::test]
    async fn paths_are_limited_independently() {
        let module = RateLimiterModule::new("rate_limiter", 2, Duration::from_secs(60));

        for _ in 0..2 {
            assert!(module.detect_threat(&request("/api/a")).await.unwrap().is_none());
        }
        assert!(module.detect_threat(&request("/api/a")).await.unwrap().is_some());

        // A different path still has its full allowance.
        assert!(module.detect_threat(&request("/api/b")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blocked_requests_are_not_recorded() {
        let module = RateLimiterModule::new("rate_limiter", 1, Duration::from_secs(60));

        assert!(module.detect_threat(&request("/api/x")).await.unwrap().is_none());
        for _ in 0..5 {
            assert!(module.detect_threat(&request("/api/x")).await.unwrap().is_some());
        }

        // Only the admitted request may appear in the history.
        let stamps = module.history.get("/api/x").unwrap();
        assert_eq!(stamps.len(), 1);
    }

    #[tokio::test]
    async fn window_expiry_readmits() {
        let module = RateLimiterModule::new("rate_limiter", 2, Duration::from_millis(150));

        for _ in 0..2 {
            assert!(module.detect_threat(&request("/api/resource")).await.unwrap().is_none());
        }
        assert!(module.detect_threat(&request("/api/resource")).await.unwrap().is_some());

        sleep(Duration::from_millis(300)).await;
        assert!(module.detect_threat(&request("/api/resource")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sweep_drops_only_stale_paths() {
        let module = RateLimiterModule::new("rate_limiter", 5, Duration::from_millis(150));

        assert!(module.detect_threat(&request("/api/old")).await.unwrap().is_none());
        sleep(Duration::from_millis(300)).await;
        assert!(module.detect_threat(&request("/api/fresh")).await.unwrap().is_none());

        let removed = module.sweep();
        assert_eq!(removed, 1);
        assert_eq!(module.tracked_paths(), 1);
        assert!(module.history.contains_key("/api/fresh"));
    }
}
