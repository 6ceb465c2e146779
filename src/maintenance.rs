//! Background self-healing of the pool
//!
//! Each pool owns one maintenance thread, started at construction and
//! stopped on shutdown. Every tick it reclaims capacity from abandoned
//! handles, sweeps unhealthy connections out of the idle set, and tops the
//! pool back up to capacity.

use crate::factory::{Connection, ConnectionFactory};
use crate::pool::PoolInner;

use crossbeam::channel::{self, RecvTimeoutError, Sender};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub(crate) struct MaintenanceHandle {
    shutdown: Sender<()>,
    thread: JoinHandle<()>,
}

impl MaintenanceHandle {
    pub(crate) fn stop(self) {
        drop(self.shutdown);
        let _ = self.thread.join();
    }
}

pub(crate) fn spawn<F: ConnectionFactory>(inner: Arc<PoolInner<F>>) -> MaintenanceHandle {
    let (shutdown, signal) = channel::bounded::<()>(0);
    let interval = inner.config.maintenance_interval;
    let thread = thread::Builder::new()
        .name("connpool-maintenance".into())
        .spawn(move || {
            loop {
                match signal.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => inner.run_maintenance(),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        })
        .expect("failed to spawn pool maintenance thread");
    MaintenanceHandle { shutdown, thread }
}

impl<F: ConnectionFactory> PoolInner<F> {
    pub(crate) fn run_maintenance(&self) {
        self.reclaim_abandoned();
        self.sweep_idle();
        self.top_up();
    }

    /// Forget in-use entries whose handle no longer exists anywhere, so
    /// leaked connections stop counting against capacity.
    fn reclaim_abandoned(&self) {
        let reclaimed = self.prune_dead_handles();
        if reclaimed > 0 {
            self.metrics
                .abandoned_reclaimed
                .fetch_add(reclaimed as u64, Ordering::Relaxed);
            tracing::info!(reclaimed, "reclaimed capacity from abandoned connections");
        }
    }

    /// Health-check every idle connection and replace the ones that fail.
    ///
    /// The probe runs on a snapshot, outside the pool lock. A failing
    /// connection is replaced only if this pass is the one that actually
    /// removes it from the idle set; a racing acquire that took it first
    /// handles the replacement itself.
    fn sweep_idle(&self) {
        let snapshot = self.snapshot_idle();
        for (conn, slot) in snapshot {
            if conn.test_health() {
                continue;
            }
            if !self.remove_idle(slot) {
                continue;
            }
            self.metrics
                .health_check_failures
                .fetch_add(1, Ordering::Relaxed);
            tracing::info!(slot, "removed unhealthy idle connection");
            match self.factory.new_connection() {
                Ok(fresh) => {
                    self.admit_idle(fresh);
                }
                Err(err) => {
                    self.metrics
                        .construction_failures
                        .fetch_add(1, Ordering::Relaxed);
                    tracing::error!(error = %err, "failed to replace unhealthy idle connection");
                }
            }
        }
    }

    /// Restore the pool to capacity, covering connections lost to abandoned
    /// handles, construction races, and earlier factory failures.
    fn top_up(&self) {
        let deficit = self.current_deficit();
        for _ in 0..deficit {
            match self.factory.new_connection() {
                Ok(conn) => {
                    if !self.admit_idle(conn) {
                        break;
                    }
                    tracing::info!("constructed connection to restore pool capacity");
                }
                Err(err) => {
                    self.metrics
                        .construction_failures
                        .fetch_add(1, Ordering::Relaxed);
                    tracing::error!(error = %err, "failed to construct connection during top-up");
                }
            }
        }
    }
}
