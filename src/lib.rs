//! # connpool
//!
//! Bounded, thread-safe, self-healing connection pool.
//!
//! ## Features
//!
//! - Fixed capacity with blocking acquisition and per-call timeouts
//! - Health check on every handout; unhealthy connections are discarded
//!   and replaced within the caller's timeout budget
//! - Explicit release with double-release and foreign-release diagnostics
//! - Background maintenance: unhealthy idle connections are swept and
//!   replaced, abandoned handles reclaimed, lost capacity restored
//! - Async acquisition with timeout and cancellation
//! - Health reporting and metrics with Prometheus export
//!
//! ## Quick Start
//!
//! ```rust
//! use connpool::{Connection, ConnectionError, ConnectionFactory, ConnectionPool, PoolConfiguration};
//! use std::time::Duration;
//!
//! struct Conn;
//!
//! impl Connection for Conn {
//!     fn test_health(&self) -> bool {
//!         true
//!     }
//! }
//!
//! struct Factory;
//!
//! impl ConnectionFactory for Factory {
//!     type Conn = Conn;
//!
//!     fn new_connection(&self) -> Result<Conn, ConnectionError> {
//!         Ok(Conn)
//!     }
//! }
//!
//! let pool = ConnectionPool::new(Factory, PoolConfiguration::default()).unwrap();
//! let conn = pool.get_connection(Duration::from_millis(100)).expect("pool is populated");
//! pool.release_connection(&conn);
//! ```

mod config;
mod errors;
mod factory;
mod health;
mod maintenance;
mod metrics;
mod pool;

pub use config::PoolConfiguration;
pub use errors::{ConnectionError, PoolError, PoolResult};
pub use factory::{Connection, ConnectionFactory};
pub use health::HealthStatus;
pub use metrics::{MetricsExporter, PoolMetrics};
pub use pool::{ConnectionPool, PooledConnection};
