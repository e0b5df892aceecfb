//! Instance pool management.
//!
//! # Responsibilities
//! - Own the ordered instance sequence and the round-robin cursor
//! - Add/remove instances by position
//! - Select the next healthy instance
//! - Probe instances (one or all) through the [`HealthProbe`]
//!
//! # Locking
//! The sequence and the cursor live behind one mutex. Only the bookkeeping
//! runs under it; probes are awaited on a snapshot with the lock released.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use futures_util::future::join_all;

use crate::health::probe::HealthProbe;
use crate::load_balancer::backend::{Instance, InstanceAddr};
use crate::observability::metrics;

#[derive(Debug, Default)]
struct PoolState {
    instances: Vec<Arc<Instance>>,
    /// Position considered by the next selection. Always `< instances.len()`
    /// while the pool is non-empty, `0` otherwise.
    next_index: usize,
}

/// Ordered, thread-safe pool of backend instances.
#[derive(Debug)]
pub struct InstancePool {
    state: Mutex<PoolState>,
    probe: HealthProbe,
}

impl InstancePool {
    pub fn new(probe: HealthProbe) -> Self {
        Self {
            state: Mutex::new(PoolState::default()),
            probe,
        }
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        // Every critical section leaves the state consistent, so a panic
        // elsewhere never invalidates it.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an instance in the unhealthy state without probing it.
    pub fn register(&self, addr: InstanceAddr) -> Arc<Instance> {
        let instance = Arc::new(Instance::new(addr));
        let len = {
            let mut state = self.lock();
            state.instances.push(instance.clone());
            state.instances.len()
        };
        tracing::info!(addr = %instance.addr, pool_size = len, "Instance added");
        metrics::record_pool_size(len);
        instance
    }

    /// Append an instance and probe it once before returning.
    ///
    /// A failed probe leaves the instance in the pool, unhealthy.
    pub async fn add(&self, addr: InstanceAddr) -> bool {
        let instance = self.register(addr);
        self.health_check_one(&instance).await
    }

    /// Remove the instance at `index`. Out-of-range indexes are ignored.
    pub fn remove(&self, index: usize) -> Option<Arc<Instance>> {
        let (removed, len) = {
            let mut state = self.lock();
            if index >= state.instances.len() {
                return None;
            }
            let removed = state.instances.remove(index);
            if state.next_index >= state.instances.len() {
                state.next_index = 0;
            }
            (removed, state.instances.len())
        };
        tracing::info!(addr = %removed.addr, index, pool_size = len, "Instance removed");
        metrics::record_pool_size(len);
        Some(removed)
    }

    /// Round-robin selection over healthy instances.
    ///
    /// Walks at most one full pass starting at the cursor. The cursor
    /// advances past every instance it reads, healthy or not.
    pub fn select_next(&self) -> Option<Arc<Instance>> {
        let mut state = self.lock();
        let len = state.instances.len();
        for _ in 0..len {
            let instance = state.instances[state.next_index].clone();
            state.next_index = (state.next_index + 1) % len;
            if instance.is_healthy() {
                return Some(instance);
            }
        }
        None
    }

    /// Probe a single instance and update its flag.
    pub async fn health_check_one(&self, instance: &Instance) -> bool {
        self.probe.check(instance).await
    }

    /// Probe every instance currently in the pool, concurrently.
    pub async fn health_check_all(&self) {
        let instances = self.snapshot();
        let checks = instances.iter().map(|i| self.probe.check(i));
        let results = join_all(checks).await;
        let healthy = results.iter().filter(|ok| **ok).count();
        tracing::debug!(total = results.len(), healthy, "Health pass complete");
    }

    /// Point-in-time copy of the instance sequence, in pool order.
    pub fn snapshot(&self) -> Vec<Arc<Instance>> {
        self.lock().instances.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().instances.is_empty()
    }

    /// Current round-robin cursor.
    pub fn cursor(&self) -> usize {
        self.lock().next_index
    }
}
