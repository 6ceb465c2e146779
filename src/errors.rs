//! Error types for the connection pool

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PoolError {
    #[error("pool capacity must be at least one connection")]
    InvalidCapacity,

    #[error("maintenance interval must be greater than zero")]
    InvalidMaintenanceInterval,
}

pub type PoolResult<T> = Result<T, PoolError>;

/// Error returned by a [`ConnectionFactory`](crate::ConnectionFactory) that
/// could not construct a connection.
///
/// Construction failures are never fatal to the pool: whichever side needed
/// the connection logs the error and retries (the acquiring caller within
/// its timeout budget, the maintenance task on its next tick).
#[derive(Error, Debug)]
#[error("failed to establish connection: {message}")]
pub struct ConnectionError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ConnectionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
