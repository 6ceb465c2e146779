//! Health reporting for connection pools

/// Point-in-time health report for a connection pool
///
/// # Examples
///
/// ```
/// use connpool::HealthStatus;
///
/// let health = HealthStatus::new(4, 0, 4);
/// assert!(health.is_healthy());
/// assert_eq!(health.available_connections, 4);
/// ```
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Whether the pool is healthy
    pub is_healthy: bool,

    /// Current pool utilization (0.0 to 1.0)
    pub utilization: f64,

    /// Idle connections available for immediate handout
    pub available_connections: usize,

    /// Connections currently checked out
    pub active_connections: usize,

    /// Configured capacity
    pub total_capacity: usize,

    /// Connections missing versus capacity, lost to failed construction or
    /// abandonment and not yet replaced by maintenance
    pub deficit: usize,

    /// Warning messages
    pub warnings: Vec<String>,
}

impl HealthStatus {
    /// Build a report from current counts
    pub fn new(available: usize, active: usize, capacity: usize) -> Self {
        let utilization = if capacity > 0 {
            active as f64 / capacity as f64
        } else {
            0.0
        };
        let deficit = capacity.saturating_sub(available + active);

        let mut warnings = Vec::new();

        if utilization > 0.9 {
            warnings.push(format!("high utilization: {:.1}%", utilization * 100.0));
        }

        if available == 0 && capacity > 0 {
            warnings.push("no idle connections available".to_string());
        }

        if deficit > 0 {
            warnings.push(format!(
                "{deficit} connections below capacity, awaiting maintenance top-up"
            ));
        }

        Self {
            is_healthy: warnings.is_empty(),
            utilization,
            available_connections: available,
            active_connections: active,
            total_capacity: capacity,
            deficit,
            warnings,
        }
    }

    /// Check if the pool is healthy
    pub fn is_healthy(&self) -> bool {
        self.is_healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_idle_pool_is_healthy() {
        let health = HealthStatus::new(10, 0, 10);
        assert!(health.is_healthy());
        assert_eq!(health.deficit, 0);
        assert!(health.warnings.is_empty());
    }

    #[test]
    fn saturated_pool_warns() {
        let health = HealthStatus::new(0, 10, 10);
        assert!(!health.is_healthy());
        assert!(health.utilization > 0.9);
        assert_eq!(health.warnings.len(), 2);
    }

    #[test]
    fn deficit_is_reported() {
        let health = HealthStatus::new(3, 4, 10);
        assert_eq!(health.deficit, 3);
        assert!(!health.is_healthy());
    }
}
