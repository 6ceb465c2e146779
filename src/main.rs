// connpool - bounded, self-healing connection pool
// This is just a demo wrapper - the actual library is in lib.rs

use connpool::{Connection, ConnectionError, ConnectionFactory, ConnectionPool, PoolConfiguration};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

struct DemoConnection {
    id: usize,
}

impl Connection for DemoConnection {
    fn test_health(&self) -> bool {
        true
    }
}

#[derive(Default)]
struct DemoFactory {
    built: AtomicUsize,
}

impl ConnectionFactory for DemoFactory {
    type Conn = DemoConnection;

    fn new_connection(&self) -> Result<DemoConnection, ConnectionError> {
        Ok(DemoConnection {
            id: self.built.fetch_add(1, Ordering::Relaxed),
        })
    }
}

fn main() {
    println!("=== connpool demo ===");
    println!();

    let config = PoolConfiguration::new()
        .with_max_connections(4)
        .with_maintenance_interval(Duration::from_millis(500));
    let pool = ConnectionPool::new(DemoFactory::default(), config).expect("valid configuration");

    println!("Idle connections after startup: {}", pool.available_count());

    let conn = pool
        .get_connection(Duration::from_millis(100))
        .expect("pool is populated");
    println!("Got connection #{}", conn.id);
    println!(
        "Idle: {}, active: {}",
        pool.available_count(),
        pool.active_count()
    );

    pool.release_connection(&conn);
    println!("Idle after release: {}", pool.available_count());

    let health = pool.get_health_status();
    println!("Healthy: {}", health.is_healthy());

    pool.shutdown();
}
