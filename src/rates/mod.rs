//! Cached currency-rate lookup for display conversion
//!
//! The live rate feed is an external collaborator consumed on an hourly
//! cadence. Lookups are served from the last successful snapshot; a failed
//! fetch logs a warning and keeps serving the previous snapshot (or the
//! configured fallback table), so pricing in the base currency always
//! succeeds. Stale rates are acceptable, a blocked pricing call is not.

#[cfg(feature = "live-rates")]
pub mod http;

#[cfg(feature = "live-rates")]
pub use http::HttpRateSource;

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;

/// A source of currency rates relative to the base currency
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetch the current rate table, `{currency code: rate}`
    async fn fetch(&self) -> Result<HashMap<String, f64>>;
}

/// Fixed rate table, used as the configured fallback and in tests
pub struct StaticRateSource {
    rates: HashMap<String, f64>,
}

impl StaticRateSource {
    pub fn new(rates: HashMap<String, f64>) -> Self {
        Self { rates }
    }
}

#[async_trait]
impl RateSource for StaticRateSource {
    async fn fetch(&self) -> Result<HashMap<String, f64>> {
        Ok(self.rates.clone())
    }
}

struct Snapshot {
    rates: HashMap<String, f64>,
    fetched_at: Option<Instant>,
}

/// Cached rate table with best-effort refresh
///
/// Starts from the fallback table; `refresh_if_stale` swaps in a fresh
/// snapshot at most once per refresh interval.
pub struct RateCache {
    snapshot: RwLock<Snapshot>,
    refresh_interval: Duration,
}

impl RateCache {
    /// Build a cache seeded with a fallback table and the default hourly
    /// refresh cadence
    pub fn new(fallback: HashMap<String, f64>) -> Self {
        Self {
            snapshot: RwLock::new(Snapshot {
                rates: fallback,
                fetched_at: None,
            }),
            refresh_interval: Duration::from_secs(3600),
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Rate for a currency code from the current snapshot
    pub fn rate_for(&self, code: &str) -> Option<f64> {
        let snapshot = self.snapshot.read().ok()?;
        snapshot.rates.get(code).copied()
    }

    /// Whether the snapshot is older than the refresh interval (or has
    /// never been fetched)
    pub fn is_stale(&self) -> bool {
        let Ok(snapshot) = self.snapshot.read() else {
            return false;
        };
        match snapshot.fetched_at {
            Some(at) => at.elapsed() >= self.refresh_interval,
            None => true,
        }
    }

    /// Unconditionally attempt a refresh; on failure the previous snapshot
    /// keeps serving
    pub async fn refresh(&self, source: &dyn RateSource) {
        match source.fetch().await {
            Ok(rates) => {
                if let Ok(mut snapshot) = self.snapshot.write() {
                    snapshot.rates = rates;
                    snapshot.fetched_at = Some(Instant::now());
                    tracing::debug!(count = snapshot.rates.len(), "currency rates refreshed");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "currency rate fetch failed, serving cached snapshot");
            }
        }
    }

    /// Refresh only when the snapshot has aged past the refresh interval
    pub async fn refresh_if_stale(&self, source: &dyn RateSource) {
        if self.is_stale() {
            self.refresh(source).await;
        }
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingSource;

    #[async_trait]
    impl RateSource for FailingSource {
        async fn fetch(&self) -> Result<HashMap<String, f64>> {
            anyhow::bail!("feed unreachable")
        }
    }

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RateSource for CountingSource {
        async fn fetch(&self) -> Result<HashMap<String, f64>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(HashMap::from([("EUR".to_string(), 0.92)]))
        }
    }

    #[tokio::test]
    async fn test_fallback_serves_until_first_fetch() {
        let cache = RateCache::new(HashMap::from([("EUR".to_string(), 0.9)]));
        assert_eq!(cache.rate_for("EUR"), Some(0.9));
        assert!(cache.is_stale());
    }

    #[tokio::test]
    async fn test_refresh_replaces_snapshot() {
        let cache = RateCache::new(HashMap::from([("EUR".to_string(), 0.9)]));
        let source = StaticRateSource::new(HashMap::from([("EUR".to_string(), 0.92)]));

        cache.refresh(&source).await;

        assert_eq!(cache.rate_for("EUR"), Some(0.92));
        assert!(!cache.is_stale());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_snapshot() {
        let cache = RateCache::new(HashMap::from([("EUR".to_string(), 0.9)]));

        cache.refresh(&FailingSource).await;

        // Fallback table still serving, never an error to the caller.
        assert_eq!(cache.rate_for("EUR"), Some(0.9));
    }

    #[tokio::test]
    async fn test_refresh_if_stale_respects_interval() {
        let cache = RateCache::new(HashMap::new())
            .with_refresh_interval(Duration::from_secs(3600));
        let source = CountingSource {
            calls: AtomicUsize::new(0),
        };

        cache.refresh_if_stale(&source).await;
        cache.refresh_if_stale(&source).await;
        cache.refresh_if_stale(&source).await;

        // Only the first call fetched; the snapshot stayed fresh after.
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_code_is_none() {
        let cache = RateCache::new(HashMap::from([("EUR".to_string(), 0.9)]));
        assert_eq!(cache.rate_for("JPY"), None);
    }
}
