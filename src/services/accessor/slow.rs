//! Slow tree accessor for testing
//!
//! A decorator around any TreeAccessor that adds configurable delays to
//! simulate a slow or distant server, and counts the calls that reach it.
//! Used to exercise out-of-order completion of listings and the
//! responsiveness of the navigation core.

use super::backend::{AccessorError, Entry, TreeAccessor};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Configuration for slow accessor simulation
#[derive(Debug, Clone)]
pub struct SlowAccessorConfig {
    /// Delay for list_directory calls
    pub list_directory_delay: Duration,
    /// Delay for read_range calls
    pub read_range_delay: Duration,
    /// Per-path listing delays, overriding `list_directory_delay`
    pub path_delays: HashMap<String, Duration>,
}

impl SlowAccessorConfig {
    /// Create a config with uniform delay for all operations
    pub fn uniform(delay: Duration) -> Self {
        Self {
            list_directory_delay: delay,
            read_range_delay: delay,
            path_delays: HashMap::new(),
        }
    }

    /// Create a config with no delays (useful as a baseline)
    pub fn none() -> Self {
        Self::uniform(Duration::ZERO)
    }

    /// Create a config simulating a file share over a slow network
    pub fn slow_network() -> Self {
        Self {
            list_directory_delay: Duration::from_millis(500),
            read_range_delay: Duration::from_millis(100),
            path_delays: HashMap::new(),
        }
    }

    /// Override the listing delay for one path
    pub fn with_path_delay(mut self, path: impl Into<String>, delay: Duration) -> Self {
        self.path_delays.insert(path.into(), delay);
        self
    }

    fn listing_delay(&self, path: &str) -> Duration {
        self.path_delays
            .get(path)
            .copied()
            .unwrap_or(self.list_directory_delay)
    }
}

impl Default for SlowAccessorConfig {
    fn default() -> Self {
        Self::none()
    }
}

/// Metrics tracking for accessor calls
#[derive(Debug, Clone, Default)]
pub struct AccessorMetrics {
    pub list_directory_calls: usize,
    pub read_range_calls: usize,
    /// Bytes returned by read_range
    pub bytes_read: usize,
    /// Total time spent in artificial delays
    pub total_delay_time: Duration,
}

impl AccessorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn total_calls(&self) -> usize {
        self.list_directory_calls + self.read_range_calls
    }
}

/// Slow accessor wrapper for testing
pub struct SlowAccessor {
    inner: Arc<dyn TreeAccessor>,
    config: SlowAccessorConfig,
    metrics: Arc<Mutex<AccessorMetrics>>,
}

impl SlowAccessor {
    pub fn new(inner: Arc<dyn TreeAccessor>, config: SlowAccessorConfig) -> Self {
        Self {
            inner,
            config,
            metrics: Arc::new(Mutex::new(AccessorMetrics::new())),
        }
    }

    pub fn with_uniform_delay(inner: Arc<dyn TreeAccessor>, delay: Duration) -> Self {
        Self::new(inner, SlowAccessorConfig::uniform(delay))
    }

    /// Get a snapshot of current metrics
    pub async fn metrics(&self) -> AccessorMetrics {
        self.metrics.lock().await.clone()
    }

    pub async fn reset_metrics(&self) {
        self.metrics.lock().await.reset();
    }

    async fn add_delay(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
            self.metrics.lock().await.total_delay_time += delay;
        }
    }
}

#[async_trait]
impl TreeAccessor for SlowAccessor {
    async fn list_directory(&self, path: &str) -> Result<Vec<Entry>, AccessorError> {
        self.add_delay(self.config.listing_delay(path)).await;
        self.metrics.lock().await.list_directory_calls += 1;
        self.inner.list_directory(path).await
    }

    async fn read_range(
        &self,
        path: &str,
        offset: u64,
        len: usize,
    ) -> Result<Vec<u8>, AccessorError> {
        self.add_delay(self.config.read_range_delay).await;
        let result = self.inner.read_range(path, offset, len).await;

        let mut metrics = self.metrics.lock().await;
        metrics.read_range_calls += 1;
        if let Ok(bytes) = &result {
            metrics.bytes_read += bytes.len();
        }
        drop(metrics);

        result
    }
}
