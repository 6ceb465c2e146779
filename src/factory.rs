//! Contracts between the pool and its collaborators

use crate::errors::ConnectionError;

/// A pooled connection.
///
/// The pool treats connections as opaque beyond this one capability: a
/// health probe consulted before every handout and during the periodic
/// idle sweep.
pub trait Connection: Send + Sync + 'static {
    /// Probe whether the connection is still usable.
    ///
    /// Returning `false` means "unusable": the pool discards the instance
    /// and arranges for a replacement. The probe may be called concurrently
    /// from caller threads and the maintenance task.
    fn test_health(&self) -> bool;
}

/// Produces new connections on behalf of the pool.
///
/// Invoked during pre-population, when an unhealthy connection has to be
/// replaced on acquire, and by the maintenance task when topping the pool
/// back up to capacity.
pub trait ConnectionFactory: Send + Sync + 'static {
    type Conn: Connection;

    /// Construct a fresh connection.
    fn new_connection(&self) -> Result<Self::Conn, ConnectionError>;
}
