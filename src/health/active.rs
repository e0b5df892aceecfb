//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every instance in the pool
//! - Keep running regardless of individual instance failures

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;

use crate::load_balancer::pool::InstancePool;

pub struct HealthMonitor {
    pool: Arc<InstancePool>,
    interval: Duration,
}

impl HealthMonitor {
    pub fn new(pool: Arc<InstancePool>, interval: Duration) -> Self {
        Self { pool, interval }
    }

    /// Check all instances, sleep for the interval, repeat.
    ///
    /// Returns only when the shutdown channel fires or closes.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval = ?self.interval, "Health monitor starting");

        loop {
            tokio::select! {
                _ = self.pool.health_check_all() => {}
                _ = shutdown.recv() => break,
            }
            tokio::select! {
                _ = time::sleep(self.interval) => {}
                _ = shutdown.recv() => break,
            }
        }

        tracing::info!("Health monitor received shutdown signal, exiting loop");
    }
}
