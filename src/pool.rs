//! Core connection pool implementation

use crate::config::PoolConfiguration;
use crate::errors::PoolResult;
use crate::factory::{Connection, ConnectionFactory};
use crate::health::HealthStatus;
use crate::maintenance::{self, MaintenanceHandle};
use crate::metrics::{MetricsExporter, MetricsTracker, PoolMetrics};

use parking_lot::{Condvar, Mutex};
use std::collections::{HashMap, VecDeque};
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

/// A connection checked out from a [`ConnectionPool`].
///
/// Dereferences to the underlying connection. The handle does not return
/// itself to the pool on drop: hand it back with
/// [`ConnectionPool::release_connection`]. A handle that is dropped without
/// being released stops counting against pool capacity once the next
/// maintenance pass notices it.
#[must_use]
pub struct PooledConnection<C> {
    conn: Arc<C>,
    slot: u64,
}

impl<C> PooledConnection<C> {
    fn new(conn: Arc<C>, slot: u64) -> Self {
        Self { conn, slot }
    }
}

impl<C> Deref for PooledConnection<C> {
    type Target = C;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl<C> std::fmt::Debug for PooledConnection<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection")
            .field("slot", &self.slot)
            .finish()
    }
}

struct IdleEntry<C> {
    conn: Arc<C>,
    slot: u64,
}

/// Both sets live behind one mutex so every capacity decision, including
/// the maintenance task's deficit computation, reads them atomically
/// relative to each other.
pub(crate) struct PoolState<C> {
    idle: VecDeque<IdleEntry<C>>,
    in_use: HashMap<u64, Weak<C>>,
}

impl<C> PoolState<C> {
    fn total(&self) -> usize {
        self.idle.len() + self.in_use.len()
    }
}

pub(crate) struct PoolInner<F: ConnectionFactory> {
    pub(crate) factory: F,
    pub(crate) config: PoolConfiguration,
    state: Mutex<PoolState<F::Conn>>,
    available: Condvar,
    pub(crate) metrics: MetricsTracker,
    next_slot: AtomicU64,
}

impl<F: ConnectionFactory> PoolInner<F> {
    fn next_slot(&self) -> u64 {
        self.next_slot.fetch_add(1, Ordering::Relaxed)
    }

    /// Construct connections until the idle set reaches capacity, skipping
    /// logged construction failures. The pool may come up short; the
    /// maintenance task tops it up later.
    pub(crate) fn prepopulate(&self) {
        for _ in 0..self.config.max_connections {
            match self.factory.new_connection() {
                Ok(conn) => {
                    self.admit_idle(conn);
                }
                Err(err) => {
                    self.metrics
                        .construction_failures
                        .fetch_add(1, Ordering::Relaxed);
                    tracing::error!(error = %err, "failed to construct connection during pool startup");
                }
            }
        }
    }

    /// Insert a freshly constructed connection into the idle set, unless the
    /// pool is already at capacity.
    pub(crate) fn admit_idle(&self, conn: F::Conn) -> bool {
        let conn = Arc::new(conn);
        let slot = self.next_slot();
        let mut state = self.state.lock();
        if state.total() >= self.config.max_connections {
            // Bookkeeping bug if this ever fires outside a construction race.
            tracing::error!(slot, "pool already at capacity, dropping surplus connection");
            return false;
        }
        state.idle.push_back(IdleEntry { conn, slot });
        drop(state);
        self.available.notify_one();
        true
    }

    pub(crate) fn counts(&self) -> (usize, usize) {
        let state = self.state.lock();
        (state.idle.len(), state.in_use.len())
    }

    pub(crate) fn snapshot_idle(&self) -> Vec<(Arc<F::Conn>, u64)> {
        let state = self.state.lock();
        state
            .idle
            .iter()
            .map(|entry| (Arc::clone(&entry.conn), entry.slot))
            .collect()
    }

    /// Remove an idle entry by slot. Returns `false` when a racing acquire
    /// already took it.
    pub(crate) fn remove_idle(&self, slot: u64) -> bool {
        let mut state = self.state.lock();
        match state.idle.iter().position(|entry| entry.slot == slot) {
            Some(at) => state.idle.remove(at).is_some(),
            None => false,
        }
    }

    /// Drop in-use entries whose connection has no live handle left.
    pub(crate) fn prune_dead_handles(&self) -> usize {
        let mut state = self.state.lock();
        let before = state.in_use.len();
        state.in_use.retain(|_, conn| conn.strong_count() > 0);
        before - state.in_use.len()
    }

    pub(crate) fn current_deficit(&self) -> usize {
        let state = self.state.lock();
        self.config.max_connections.saturating_sub(state.total())
    }

    /// Pop the oldest idle connection and mark it in-use in one atomic step,
    /// waiting until the deadline when the idle set is empty.
    fn take_idle(&self, deadline: Option<Instant>) -> Option<(Arc<F::Conn>, u64)> {
        let mut state = self.state.lock();
        loop {
            if let Some(entry) = state.idle.pop_front() {
                state.in_use.insert(entry.slot, Arc::downgrade(&entry.conn));
                return Some((entry.conn, entry.slot));
            }
            match deadline {
                Some(deadline) => {
                    if self.available.wait_until(&mut state, deadline).timed_out()
                        && state.idle.is_empty()
                    {
                        self.metrics.acquire_timeouts.fetch_add(1, Ordering::Relaxed);
                        return None;
                    }
                }
                None => self.available.wait(&mut state),
            }
        }
    }

    /// Construct replacements until one passes its health check.
    /// Construction failures are retried immediately, without backoff. The
    /// loop is bounded by the caller's deadline, with one attempt guaranteed
    /// even on a zero budget.
    fn build_replacement(&self, deadline: Option<Instant>) -> Option<Arc<F::Conn>> {
        loop {
            match self.factory.new_connection() {
                Ok(conn) => {
                    if conn.test_health() {
                        return Some(Arc::new(conn));
                    }
                    self.metrics
                        .health_check_failures
                        .fetch_add(1, Ordering::Relaxed);
                    tracing::info!("replacement connection failed its health check, discarding");
                }
                Err(err) => {
                    self.metrics
                        .construction_failures
                        .fetch_add(1, Ordering::Relaxed);
                    tracing::error!(error = %err, "failed to construct replacement connection");
                }
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                self.metrics.acquire_timeouts.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        }
    }

    fn checkout(&self, timeout: Duration) -> Option<PooledConnection<F::Conn>> {
        // A deadline that overflows Instant is treated as no deadline.
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let (conn, slot) = self.take_idle(deadline)?;

            // Health check runs outside the pool lock.
            if conn.test_health() {
                self.metrics.total_acquired.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(slot, "connection handed out");
                return Some(PooledConnection::new(conn, slot));
            }

            self.state.lock().in_use.remove(&slot);
            self.metrics
                .health_check_failures
                .fetch_add(1, Ordering::Relaxed);
            tracing::info!(slot, "discarded unhealthy connection on acquire");
            drop(conn);

            let fresh = self.build_replacement(deadline)?;
            let slot = self.next_slot();
            let mut state = self.state.lock();
            if state.total() < self.config.max_connections {
                state.in_use.insert(slot, Arc::downgrade(&fresh));
                drop(state);
                self.metrics.total_acquired.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(slot, "connection handed out");
                return Some(PooledConnection::new(fresh, slot));
            }
            // A maintenance top-up filled the discarded slot first; yield the
            // surplus replacement and go back to the idle set.
            drop(state);
            tracing::debug!(slot, "replacement lost construction race, retrying idle set");
        }
    }

    fn do_release(&self, handle: &PooledConnection<F::Conn>) {
        let mut state = self.state.lock();
        let tracked = state
            .in_use
            .get(&handle.slot)
            .and_then(Weak::upgrade)
            .is_some_and(|held| Arc::ptr_eq(&held, &handle.conn));
        let already_idle = state
            .idle
            .iter()
            .any(|entry| Arc::ptr_eq(&entry.conn, &handle.conn));

        if tracked && !already_idle {
            state.in_use.remove(&handle.slot);
            state.idle.push_back(IdleEntry {
                conn: Arc::clone(&handle.conn),
                slot: handle.slot,
            });
            drop(state);
            self.metrics.total_released.fetch_add(1, Ordering::Relaxed);
            self.available.notify_one();
            tracing::debug!(slot = handle.slot, "connection returned to pool");
        } else {
            drop(state);
            self.metrics.invalid_releases.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                slot = handle.slot,
                "released connection was not acquired from this pool or was already returned"
            );
        }
    }
}

/// Thread-safe, self-healing pool of connections produced by a
/// [`ConnectionFactory`].
///
/// The pool pre-populates itself up to `max_connections` on construction,
/// validates every connection before handing it out, and runs a background
/// maintenance task that replaces unhealthy idle connections and restores
/// capacity lost to construction failures or abandoned handles.
pub struct ConnectionPool<F: ConnectionFactory> {
    inner: Arc<PoolInner<F>>,
    maintenance: Option<MaintenanceHandle>,
}

impl<F: ConnectionFactory> ConnectionPool<F> {
    /// Create a new pool and pre-populate it.
    ///
    /// Construction failures for individual connections are logged and
    /// skipped, so the pool may start below capacity; only an invalid
    /// configuration makes construction itself fail.
    pub fn new(factory: F, config: PoolConfiguration) -> PoolResult<Self> {
        config.validate()?;
        let capacity = config.max_connections;
        let inner = Arc::new(PoolInner {
            factory,
            config,
            state: Mutex::new(PoolState {
                idle: VecDeque::with_capacity(capacity),
                in_use: HashMap::new(),
            }),
            available: Condvar::new(),
            metrics: MetricsTracker::new(),
            next_slot: AtomicU64::new(0),
        });
        inner.prepopulate();
        let maintenance = maintenance::spawn(Arc::clone(&inner));
        Ok(Self {
            inner,
            maintenance: Some(maintenance),
        })
    }

    /// Get a connection, blocking up to `timeout` while the pool is empty.
    ///
    /// Returns `None` when no connection could be obtained within the
    /// timeout. That is an expected outcome under load, not an error. Every
    /// returned connection has passed its health check at the moment of
    /// handout; unhealthy connections are discarded and replaced via the
    /// factory within the same timeout budget.
    pub fn get_connection(&self, timeout: Duration) -> Option<PooledConnection<F::Conn>> {
        self.inner.checkout(timeout)
    }

    /// Get a connection without waiting.
    pub fn try_get_connection(&self) -> Option<PooledConnection<F::Conn>> {
        self.get_connection(Duration::ZERO)
    }

    /// Get a connection asynchronously.
    ///
    /// Polls the pool until a connection becomes available or `timeout`
    /// expires. Cancelling the future behaves like a timeout: the caller
    /// simply ends up without a connection.
    pub async fn get_connection_async(
        &self,
        timeout: Duration,
    ) -> Option<PooledConnection<F::Conn>> {
        tokio::time::timeout(timeout, async {
            loop {
                if let Some(conn) = self.try_get_connection() {
                    return conn;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .ok()
    }

    /// Return a previously acquired connection to the pool.
    ///
    /// Releasing a connection that was not acquired from this pool, or one
    /// that has already been returned, is a diagnostic no-op: a warning is
    /// logged and pool state is left untouched. Never blocks.
    pub fn release_connection(&self, handle: &PooledConnection<F::Conn>) {
        self.inner.do_release(handle);
    }

    /// Number of idle connections available for immediate handout
    pub fn available_count(&self) -> usize {
        self.inner.counts().0
    }

    /// Number of connections currently checked out
    pub fn active_count(&self) -> usize {
        self.inner.counts().1
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.inner.config.max_connections
    }

    /// Get health status
    pub fn get_health_status(&self) -> HealthStatus {
        let (available, active) = self.inner.counts();
        HealthStatus::new(available, active, self.capacity())
    }

    /// Get pool metrics
    pub fn get_metrics(&self) -> PoolMetrics {
        let (available, active) = self.inner.counts();
        self.inner.metrics.snapshot(active, available, self.capacity())
    }

    /// Export metrics
    pub fn export_metrics(&self) -> HashMap<String, String> {
        self.get_metrics().export()
    }

    /// Export metrics in Prometheus format
    pub fn export_metrics_prometheus(
        &self,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> String {
        MetricsExporter::export_prometheus(&self.get_metrics(), pool_name, tags)
    }

    /// Stop the maintenance task and drop the pool.
    ///
    /// Dropping the pool does the same; this form just makes the stop
    /// explicit at call sites that want one.
    pub fn shutdown(mut self) {
        if let Some(handle) = self.maintenance.take() {
            handle.stop();
        }
    }
}

impl<F: ConnectionFactory> Drop for ConnectionPool<F> {
    fn drop(&mut self) {
        if let Some(handle) = self.maintenance.take() {
            handle.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ConnectionError, PoolError};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;

    struct TestConnection {
        healthy: Arc<AtomicBool>,
    }

    impl Connection for TestConnection {
        fn test_health(&self) -> bool {
            self.healthy.load(Ordering::Relaxed)
        }
    }

    #[derive(Default)]
    struct FactoryState {
        built: AtomicUsize,
        failing: AtomicBool,
        flags: Mutex<Vec<Arc<AtomicBool>>>,
    }

    #[derive(Clone, Default)]
    struct TestFactory {
        state: Arc<FactoryState>,
    }

    impl TestFactory {
        fn built(&self) -> usize {
            self.state.built.load(Ordering::Relaxed)
        }

        fn set_failing(&self, failing: bool) {
            self.state.failing.store(failing, Ordering::Relaxed);
        }

        /// Flip every connection built so far to unhealthy.
        fn poison_all(&self) {
            for flag in self.state.flags.lock().iter() {
                flag.store(false, Ordering::Relaxed);
            }
        }
    }

    impl ConnectionFactory for TestFactory {
        type Conn = TestConnection;

        fn new_connection(&self) -> Result<TestConnection, ConnectionError> {
            if self.state.failing.load(Ordering::Relaxed) {
                return Err(ConnectionError::new("backend refused the handshake"));
            }
            self.state.built.fetch_add(1, Ordering::Relaxed);
            let healthy = Arc::new(AtomicBool::new(true));
            self.state.flags.lock().push(Arc::clone(&healthy));
            Ok(TestConnection { healthy })
        }
    }

    fn quiet_config(max: usize) -> PoolConfiguration {
        // Long interval keeps maintenance out of tests that do not need it.
        PoolConfiguration::new()
            .with_max_connections(max)
            .with_maintenance_interval(Duration::from_secs(60))
    }

    fn busy_config(max: usize) -> PoolConfiguration {
        PoolConfiguration::new()
            .with_max_connections(max)
            .with_maintenance_interval(Duration::from_millis(20))
    }

    #[test]
    fn prepopulates_to_capacity() {
        let factory = TestFactory::default();
        let pool = ConnectionPool::new(factory.clone(), quiet_config(5)).unwrap();

        assert_eq!(pool.available_count(), 5);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(factory.built(), 5);
    }

    #[test]
    fn rejects_zero_capacity() {
        let result = ConnectionPool::new(
            TestFactory::default(),
            PoolConfiguration::new().with_max_connections(0),
        );
        assert!(matches!(result, Err(PoolError::InvalidCapacity)));
    }

    #[test]
    fn starts_short_when_factory_fails() {
        let factory = TestFactory::default();
        factory.set_failing(true);
        let pool = ConnectionPool::new(factory.clone(), quiet_config(3)).unwrap();

        assert_eq!(pool.available_count(), 0);
        assert_eq!(pool.get_metrics().construction_failures, 3);
    }

    #[test]
    fn get_marks_connection_in_use() {
        let factory = TestFactory::default();
        let pool = ConnectionPool::new(factory, quiet_config(5)).unwrap();

        let conn = pool.get_connection(Duration::ZERO).unwrap();
        assert_eq!(pool.available_count(), 4);
        assert_eq!(pool.active_count(), 1);

        pool.release_connection(&conn);
        assert_eq!(pool.available_count(), 5);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn get_times_out_when_pool_is_drained() {
        let factory = TestFactory::default();
        let pool = ConnectionPool::new(factory, quiet_config(1)).unwrap();

        let _held = pool.get_connection(Duration::ZERO).unwrap();
        let started = Instant::now();
        let second = pool.get_connection(Duration::from_millis(50));

        assert!(second.is_none());
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(pool.get_metrics().acquire_timeouts, 1);
    }

    #[test]
    fn blocked_caller_is_woken_by_release() {
        let factory = TestFactory::default();
        let pool = ConnectionPool::new(factory, quiet_config(1)).unwrap();
        let held = pool.get_connection(Duration::ZERO).unwrap();

        thread::scope(|s| {
            let waiter = s.spawn(|| pool.get_connection(Duration::from_secs(5)));
            thread::sleep(Duration::from_millis(50));
            pool.release_connection(&held);
            let woken = waiter.join().unwrap();
            assert!(woken.is_some());
        });
    }

    #[test]
    fn double_release_is_a_noop() {
        let factory = TestFactory::default();
        let pool = ConnectionPool::new(factory, quiet_config(2)).unwrap();

        let conn = pool.get_connection(Duration::ZERO).unwrap();
        pool.release_connection(&conn);
        pool.release_connection(&conn);

        assert_eq!(pool.available_count(), 2);
        assert_eq!(pool.active_count(), 0);
        let metrics = pool.get_metrics();
        assert_eq!(metrics.total_released, 1);
        assert_eq!(metrics.invalid_releases, 1);
    }

    #[test]
    fn foreign_release_is_a_noop() {
        let factory = TestFactory::default();
        let pool_a = ConnectionPool::new(factory.clone(), quiet_config(2)).unwrap();
        let pool_b = ConnectionPool::new(factory, quiet_config(2)).unwrap();

        let foreign = pool_b.get_connection(Duration::ZERO).unwrap();
        pool_a.release_connection(&foreign);

        assert_eq!(pool_a.available_count(), 2);
        assert_eq!(pool_a.active_count(), 0);
        assert_eq!(pool_a.get_metrics().invalid_releases, 1);
        assert_eq!(pool_b.active_count(), 1);
    }

    #[test]
    fn unhealthy_connection_is_replaced_on_get() {
        let factory = TestFactory::default();
        let pool = ConnectionPool::new(factory.clone(), quiet_config(1)).unwrap();

        factory.poison_all();
        let conn = pool.get_connection(Duration::from_secs(1)).unwrap();

        assert!(conn.test_health());
        assert_eq!(factory.built(), 2);
        assert_eq!(pool.active_count(), 1);
        assert_eq!(pool.available_count(), 0);
        assert_eq!(pool.get_metrics().health_check_failures, 1);
    }

    #[test]
    fn replacement_loop_is_bounded_by_the_timeout() {
        let factory = TestFactory::default();
        let pool = ConnectionPool::new(factory.clone(), busy_config(1)).unwrap();

        factory.set_failing(true);
        factory.poison_all();
        let started = Instant::now();
        let conn = pool.get_connection(Duration::from_millis(50));

        assert!(conn.is_none());
        assert!(started.elapsed() >= Duration::from_millis(50));

        // The lost slot comes back through maintenance once the factory heals.
        factory.set_failing(false);
        thread::sleep(Duration::from_millis(200));
        assert_eq!(pool.available_count(), 1);
    }

    #[test]
    fn maintenance_replaces_unhealthy_idle_connections() {
        let factory = TestFactory::default();
        let pool = ConnectionPool::new(factory.clone(), busy_config(3)).unwrap();

        factory.poison_all();
        thread::sleep(Duration::from_millis(200));

        assert_eq!(pool.available_count(), 3);
        assert_eq!(factory.built(), 6);
        let conn = pool.get_connection(Duration::ZERO).unwrap();
        assert!(conn.test_health());
    }

    #[test]
    fn abandoned_handle_is_reclaimed_by_maintenance() {
        let factory = TestFactory::default();
        let pool = ConnectionPool::new(factory.clone(), busy_config(2)).unwrap();

        let conn = pool.get_connection(Duration::ZERO).unwrap();
        assert_eq!(pool.active_count(), 1);
        drop(conn);

        thread::sleep(Duration::from_millis(200));
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.available_count(), 2);
        assert_eq!(factory.built(), 3);
        assert_eq!(pool.get_metrics().abandoned_reclaimed, 1);
    }

    #[test]
    fn concurrent_callers_get_distinct_connections() {
        let factory = TestFactory::default();
        let pool = ConnectionPool::new(factory, quiet_config(10)).unwrap();
        let granted: Mutex<Vec<PooledConnection<TestConnection>>> = Mutex::new(Vec::new());

        thread::scope(|s| {
            for _ in 0..10 {
                s.spawn(|| {
                    let conn = pool.get_connection(Duration::from_secs(1)).unwrap();
                    granted.lock().push(conn);
                });
            }
        });

        let granted = granted.lock();
        assert_eq!(granted.len(), 10);
        let mut addresses: Vec<_> = granted
            .iter()
            .map(|conn| Arc::as_ptr(&conn.conn) as usize)
            .collect();
        addresses.sort_unstable();
        addresses.dedup();
        assert_eq!(addresses.len(), 10);
    }

    /// Connection that reports healthy for a fixed number of probes.
    struct FlakyConnection {
        checks_left: AtomicUsize,
    }

    impl Connection for FlakyConnection {
        fn test_health(&self) -> bool {
            let mut left = self.checks_left.load(Ordering::Relaxed);
            loop {
                if left == 0 {
                    return false;
                }
                match self.checks_left.compare_exchange(
                    left,
                    left - 1,
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => return true,
                    Err(current) => left = current,
                }
            }
        }
    }

    #[derive(Clone)]
    struct FlakyFactory {
        lives: usize,
        built: Arc<AtomicUsize>,
    }

    impl ConnectionFactory for FlakyFactory {
        type Conn = FlakyConnection;

        fn new_connection(&self) -> Result<FlakyConnection, ConnectionError> {
            self.built.fetch_add(1, Ordering::Relaxed);
            Ok(FlakyConnection {
                checks_left: AtomicUsize::new(self.lives),
            })
        }
    }

    #[test]
    fn every_handout_has_passed_a_health_check() {
        let factory = FlakyFactory {
            lives: 3,
            built: Arc::new(AtomicUsize::new(0)),
        };
        let pool = ConnectionPool::new(factory.clone(), quiet_config(2)).unwrap();

        for _ in 0..30 {
            let conn = pool
                .get_connection(Duration::from_secs(1))
                .expect("replacement keeps the pool serving");
            pool.release_connection(&conn);
        }
        assert!(factory.built.load(Ordering::Relaxed) > 2);
    }

    #[tokio::test]
    async fn async_get_returns_a_connection() {
        let factory = TestFactory::default();
        let pool = ConnectionPool::new(factory, quiet_config(2)).unwrap();

        let conn = pool.get_connection_async(Duration::from_millis(100)).await;
        assert!(conn.is_some());
        assert_eq!(pool.active_count(), 1);
    }

    #[tokio::test]
    async fn async_get_times_out_when_drained() {
        let factory = TestFactory::default();
        let pool = ConnectionPool::new(factory, quiet_config(1)).unwrap();

        let _held = pool.get_connection(Duration::ZERO).unwrap();
        let conn = pool.get_connection_async(Duration::from_millis(50)).await;
        assert!(conn.is_none());
    }

    #[test]
    fn health_status_reflects_counts() {
        let factory = TestFactory::default();
        let pool = ConnectionPool::new(factory, quiet_config(4)).unwrap();

        assert!(pool.get_health_status().is_healthy());
        let _conns: Vec<_> = (0..4)
            .map(|_| pool.get_connection(Duration::ZERO).unwrap())
            .collect();

        let health = pool.get_health_status();
        assert!(!health.is_healthy());
        assert_eq!(health.active_connections, 4);
        assert_eq!(health.available_connections, 0);
    }

    #[test]
    fn prometheus_export_contains_pool_counters() {
        let factory = TestFactory::default();
        let pool = ConnectionPool::new(factory, quiet_config(2)).unwrap();

        let _conn = pool.get_connection(Duration::ZERO).unwrap();
        let output = pool.export_metrics_prometheus("demo", None);

        assert!(output.contains("connpool_connections_active{pool=\"demo\"} 1"));
        assert!(output.contains("connpool_acquired_total{pool=\"demo\"} 1"));
    }
}
