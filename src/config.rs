//! Pool configuration options

use std::time::Duration;

use crate::errors::{PoolError, PoolResult};

/// Configuration for connection pool behavior
///
/// # Examples
///
/// ```
/// use connpool::PoolConfiguration;
/// use std::time::Duration;
///
/// let config = PoolConfiguration::new()
///     .with_max_connections(100)
///     .with_maintenance_interval(Duration::from_millis(500));
///
/// assert_eq!(config.max_connections, 100);
/// assert_eq!(config.maintenance_interval, Duration::from_millis(500));
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolConfiguration {
    /// Maximum number of connections, idle and in-use combined
    pub max_connections: usize,

    /// How often the background maintenance task sweeps idle connections
    /// and tops the pool back up to capacity
    pub maintenance_interval: Duration,
}

impl Default for PoolConfiguration {
    fn default() -> Self {
        Self {
            max_connections: 10,
            maintenance_interval: Duration::from_secs(1),
        }
    }
}

impl PoolConfiguration {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of connections
    ///
    /// # Examples
    ///
    /// ```
    /// use connpool::PoolConfiguration;
    ///
    /// let config = PoolConfiguration::new().with_max_connections(50);
    ///
    /// assert_eq!(config.max_connections, 50);
    /// ```
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the maintenance interval
    pub fn with_maintenance_interval(mut self, interval: Duration) -> Self {
        self.maintenance_interval = interval;
        self
    }

    /// Check that the configuration describes a usable pool
    pub fn validate(&self) -> PoolResult<()> {
        if self.max_connections == 0 {
            return Err(PoolError::InvalidCapacity);
        }
        if self.maintenance_interval.is_zero() {
            return Err(PoolError::InvalidMaintenanceInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = PoolConfiguration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.maintenance_interval, Duration::from_secs(1));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = PoolConfiguration::new().with_max_connections(0);
        assert!(matches!(config.validate(), Err(PoolError::InvalidCapacity)));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = PoolConfiguration::new().with_maintenance_interval(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(PoolError::InvalidMaintenanceInterval)
        ));
    }
}
