//! Metrics collection and export for connection pools

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of pool activity counters.
///
/// Obtained from [`ConnectionPool::get_metrics`](crate::ConnectionPool::get_metrics).
/// Counters are monotonic over the lifetime of the pool; the gauge fields
/// reflect the moment the snapshot was taken.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PoolMetrics {
    /// Connections handed out to callers
    pub total_acquired: u64,

    /// Connections returned via release
    pub total_released: u64,

    /// Acquisitions that expired without obtaining a connection
    pub acquire_timeouts: u64,

    /// Connections discarded after failing their health check
    pub health_check_failures: u64,

    /// Factory invocations that failed
    pub construction_failures: u64,

    /// Releases of foreign or already-returned connections
    pub invalid_releases: u64,

    /// In-use slots reclaimed after their handle was dropped without release
    pub abandoned_reclaimed: u64,

    /// Connections currently checked out
    pub active_connections: usize,

    /// Connections currently idle
    pub available_connections: usize,

    /// Pool utilization ratio (0.0 to 1.0)
    pub utilization: f64,

    /// Configured capacity
    pub max_capacity: usize,
}

impl PoolMetrics {
    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("total_acquired".to_string(), self.total_acquired.to_string());
        metrics.insert("total_released".to_string(), self.total_released.to_string());
        metrics.insert(
            "acquire_timeouts".to_string(),
            self.acquire_timeouts.to_string(),
        );
        metrics.insert(
            "health_check_failures".to_string(),
            self.health_check_failures.to_string(),
        );
        metrics.insert(
            "construction_failures".to_string(),
            self.construction_failures.to_string(),
        );
        metrics.insert(
            "invalid_releases".to_string(),
            self.invalid_releases.to_string(),
        );
        metrics.insert(
            "abandoned_reclaimed".to_string(),
            self.abandoned_reclaimed.to_string(),
        );
        metrics.insert(
            "active_connections".to_string(),
            self.active_connections.to_string(),
        );
        metrics.insert(
            "available_connections".to_string(),
            self.available_connections.to_string(),
        );
        metrics.insert("utilization".to_string(), format!("{:.2}", self.utilization));
        metrics.insert("max_capacity".to_string(), self.max_capacity.to_string());
        metrics
    }
}

/// Metrics exporter for Prometheus format
pub struct MetricsExporter;

impl MetricsExporter {
    /// Export metrics in Prometheus exposition format
    pub fn export_prometheus(
        metrics: &PoolMetrics,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> String {
        let mut output = String::new();
        let labels = Self::format_labels(pool_name, tags);

        // Gauge metrics
        output.push_str("# HELP connpool_connections_active Connections currently checked out\n");
        output.push_str("# TYPE connpool_connections_active gauge\n");
        output.push_str(&format!(
            "connpool_connections_active{{{}}} {}\n",
            labels, metrics.active_connections
        ));

        output.push_str("# HELP connpool_connections_available Connections currently idle\n");
        output.push_str("# TYPE connpool_connections_available gauge\n");
        output.push_str(&format!(
            "connpool_connections_available{{{}}} {}\n",
            labels, metrics.available_connections
        ));

        output.push_str("# HELP connpool_utilization Pool utilization ratio\n");
        output.push_str("# TYPE connpool_utilization gauge\n");
        output.push_str(&format!(
            "connpool_utilization{{{}}} {:.2}\n",
            labels, metrics.utilization
        ));

        // Counter metrics
        output.push_str("# HELP connpool_acquired_total Connections handed out\n");
        output.push_str("# TYPE connpool_acquired_total counter\n");
        output.push_str(&format!(
            "connpool_acquired_total{{{}}} {}\n",
            labels, metrics.total_acquired
        ));

        output.push_str("# HELP connpool_released_total Connections returned to the pool\n");
        output.push_str("# TYPE connpool_released_total counter\n");
        output.push_str(&format!(
            "connpool_released_total{{{}}} {}\n",
            labels, metrics.total_released
        ));

        output.push_str("# HELP connpool_acquire_timeouts_total Acquisitions that timed out\n");
        output.push_str("# TYPE connpool_acquire_timeouts_total counter\n");
        output.push_str(&format!(
            "connpool_acquire_timeouts_total{{{}}} {}\n",
            labels, metrics.acquire_timeouts
        ));

        output.push_str(
            "# HELP connpool_health_check_failures_total Connections discarded as unhealthy\n",
        );
        output.push_str("# TYPE connpool_health_check_failures_total counter\n");
        output.push_str(&format!(
            "connpool_health_check_failures_total{{{}}} {}\n",
            labels, metrics.health_check_failures
        ));

        output.push_str(
            "# HELP connpool_construction_failures_total Factory invocations that failed\n",
        );
        output.push_str("# TYPE connpool_construction_failures_total counter\n");
        output.push_str(&format!(
            "connpool_construction_failures_total{{{}}} {}\n",
            labels, metrics.construction_failures
        ));

        output.push_str(
            "# HELP connpool_invalid_releases_total Foreign or duplicate release attempts\n",
        );
        output.push_str("# TYPE connpool_invalid_releases_total counter\n");
        output.push_str(&format!(
            "connpool_invalid_releases_total{{{}}} {}\n",
            labels, metrics.invalid_releases
        ));

        output.push_str(
            "# HELP connpool_abandoned_reclaimed_total Slots reclaimed from dropped handles\n",
        );
        output.push_str("# TYPE connpool_abandoned_reclaimed_total counter\n");
        output.push_str(&format!(
            "connpool_abandoned_reclaimed_total{{{}}} {}\n",
            labels, metrics.abandoned_reclaimed
        ));

        output
    }

    fn format_labels(pool_name: &str, tags: Option<&HashMap<String, String>>) -> String {
        let mut labels = vec![format!("pool=\"{}\"", pool_name)];

        if let Some(tags) = tags {
            for (key, value) in tags {
                labels.push(format!("{}=\"{}\"", key, value));
            }
        }

        labels.join(",")
    }
}

/// Internal counter store shared between the pool and its maintenance task.
pub(crate) struct MetricsTracker {
    pub total_acquired: AtomicU64,
    pub total_released: AtomicU64,
    pub acquire_timeouts: AtomicU64,
    pub health_check_failures: AtomicU64,
    pub construction_failures: AtomicU64,
    pub invalid_releases: AtomicU64,
    pub abandoned_reclaimed: AtomicU64,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self {
            total_acquired: AtomicU64::new(0),
            total_released: AtomicU64::new(0),
            acquire_timeouts: AtomicU64::new(0),
            health_check_failures: AtomicU64::new(0),
            construction_failures: AtomicU64::new(0),
            invalid_releases: AtomicU64::new(0),
            abandoned_reclaimed: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self, active: usize, available: usize, capacity: usize) -> PoolMetrics {
        let utilization = if capacity > 0 {
            active as f64 / capacity as f64
        } else {
            0.0
        };

        PoolMetrics {
            total_acquired: self.total_acquired.load(Ordering::Relaxed),
            total_released: self.total_released.load(Ordering::Relaxed),
            acquire_timeouts: self.acquire_timeouts.load(Ordering::Relaxed),
            health_check_failures: self.health_check_failures.load(Ordering::Relaxed),
            construction_failures: self.construction_failures.load(Ordering::Relaxed),
            invalid_releases: self.invalid_releases.load(Ordering::Relaxed),
            abandoned_reclaimed: self.abandoned_reclaimed.load(Ordering::Relaxed),
            active_connections: active,
            available_connections: available,
            utilization,
            max_capacity: capacity,
        }
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new()
    }
}
