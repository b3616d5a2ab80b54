//! Core pool engine

use crate::config::PoolConfig;
use crate::errors::{PoolError, PoolResult};
use crate::factory::ResourceFactory;
use crate::stats::PoolStats;
use crate::store::{IdleEntry, IdleStore};
use crate::sweep::SweepSchedule;

use parking_lot::Mutex;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, trace, warn};

/// A checked-out resource that returns to the pool when dropped
pub struct PooledResource<'p, F: ResourceFactory> {
    resource: Option<F::Resource>,
    pool: &'p LoosePool<F>,
}

impl<F: ResourceFactory> PooledResource<'_, F> {
    /// Retire the resource instead of returning it to the pool
    pub fn discard(mut self) {
        if let Some(resource) = self.resource.take() {
            self.pool.discard(resource);
        }
    }
}

impl<F: ResourceFactory> Deref for PooledResource<'_, F> {
    type Target = F::Resource;

    fn deref(&self) -> &Self::Target {
        self.resource.as_ref().expect("resource already taken")
    }
}

impl<F: ResourceFactory> DerefMut for PooledResource<'_, F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.resource.as_mut().expect("resource already taken")
    }
}

impl<F: ResourceFactory> Drop for PooledResource<'_, F> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            self.pool.release(resource);
        }
    }
}

/// Everything guarded by the pool lock.
struct PoolState<R> {
    idle: IdleStore<R>,
    in_use: usize,
    schedule: SweepSchedule,
    peak_in_use: usize,
    peak_idle: usize,
    peak_timed_out: usize,
}

/// Concurrent, self-shrinking resource pool.
///
/// The pool grows on demand and never enforces an upper bound; the
/// configured `max_size` is advisory only. Shrinking is lazy: an eviction
/// sweep runs at the start of [`release`](LoosePool::release) whenever the
/// sweep deadline has passed, retiring entries idle longer than the
/// configured timeout. Because eviction piggybacks on release activity, a
/// pool that stops seeing releases also stops shrinking, and idle
/// resources from an earlier burst stay allocated until traffic resumes
/// or [`destroy`](LoosePool::destroy) runs.
///
/// All operations take `&self` and are safe to call from any number of
/// threads. Factory calls happen outside the pool lock, so a slow
/// construction or teardown never stalls other callers.
pub struct LoosePool<F: ResourceFactory> {
    factory: F,
    config: PoolConfig,
    state: Mutex<PoolState<F::Resource>>,
    create_count: AtomicU64,
    remove_count: AtomicU64,
}

impl<F: ResourceFactory> LoosePool<F> {
    /// Create a pool around a factory. The first sweep deadline is the
    /// construction instant, so the very first release already sweeps.
    pub fn new(factory: F, config: PoolConfig) -> Self {
        let state = PoolState {
            idle: IdleStore::new(config.initial_capacity),
            in_use: 0,
            schedule: SweepSchedule::new(config.idle_timeout),
            peak_in_use: 0,
            peak_idle: 0,
            peak_timed_out: 0,
        };
        trace!(
            initial_capacity = config.initial_capacity,
            idle_timeout_ms = config.idle_timeout.as_millis() as u64,
            "pool initialized"
        );
        Self {
            factory,
            config,
            state: Mutex::new(state),
            create_count: AtomicU64::new(0),
            remove_count: AtomicU64::new(0),
        }
    }

    /// Hand out a resource, reusing the most recently released idle entry
    /// or constructing a fresh one on a miss.
    ///
    /// Construction failures propagate unchanged; the pool state is not
    /// touched by a failed construction.
    pub fn acquire(&self) -> PoolResult<F::Resource, F::Error> {
        if let Some(resource) = self.reuse_idle() {
            return Ok(resource);
        }
        debug!("creating resource");
        let resource = self.factory.create().map_err(PoolError::Create)?;
        self.register_created();
        Ok(resource)
    }

    /// Like [`acquire`](Self::acquire), forwarding constructor arguments
    /// to the factory on a miss. An idle hit ignores the arguments.
    pub fn acquire_with(&self, args: F::Args) -> PoolResult<F::Resource, F::Error> {
        if let Some(resource) = self.reuse_idle() {
            return Ok(resource);
        }
        debug!("creating resource");
        let resource = self.factory.create_with(args).map_err(PoolError::Create)?;
        self.register_created();
        Ok(resource)
    }

    /// Return a resource to the pool.
    ///
    /// Runs the eviction sweep first, then stores the resource as the
    /// newest idle entry, growing the store when it is full. Never fails:
    /// teardown problems hit by the sweep are logged and absorbed.
    pub fn release(&self, resource: F::Resource) {
        self.sweep();

        let mut state = self.state.lock();
        state.idle.push(IdleEntry {
            resource,
            released_at: Instant::now(),
        });
        state.in_use = state.in_use.saturating_sub(1);
        state.peak_idle = state.peak_idle.max(state.idle.len());
        let available = state.idle.len();
        drop(state);
        trace!(available, "released resource");
    }

    /// Retire a checked-out resource without returning it to the idle
    /// store. The idle entries are untouched.
    pub fn discard(&self, resource: F::Resource) {
        {
            let mut state = self.state.lock();
            state.in_use = state.in_use.saturating_sub(1);
        }
        self.remove_resource(resource, "discarded");
    }

    /// Tear down every idle resource and reset the in-use count.
    ///
    /// Idempotent: a second call finds an empty store and does nothing
    /// beyond logging. Runs automatically when the pool is dropped.
    pub fn destroy(&self) {
        let entries = {
            let mut state = self.state.lock();
            state.in_use = 0;
            state.idle.take_all()
        };

        if entries.is_empty() {
            trace!("destroying empty pool");
        } else {
            debug!(count = entries.len(), "destroying pooled resources");
        }

        for entry in entries {
            self.remove_resource(entry.resource, "pool destroyed");
        }
    }

    /// Acquire wrapped in a guard that releases on drop.
    pub fn checkout(&self) -> PoolResult<PooledResource<'_, F>, F::Error> {
        let resource = self.acquire()?;
        Ok(PooledResource {
            resource: Some(resource),
            pool: self,
        })
    }

    /// Like [`checkout`](Self::checkout), forwarding constructor
    /// arguments on a miss.
    pub fn checkout_with(&self, args: F::Args) -> PoolResult<PooledResource<'_, F>, F::Error> {
        let resource = self.acquire_with(args)?;
        Ok(PooledResource {
            resource: Some(resource),
            pool: self,
        })
    }

    /// Point-in-time statistics snapshot.
    pub fn stats(&self) -> PoolStats {
        let state = self.state.lock();
        let available = state.idle.len();
        let in_use = state.in_use;
        let peak_in_use = state.peak_in_use;
        let peak_idle = state.peak_idle;
        let peak_timed_out = state.peak_timed_out;
        let next_at = state.schedule.next_at();
        drop(state);

        PoolStats {
            available,
            in_use,
            size: available + in_use,
            peak_in_use,
            peak_idle,
            peak_timed_out,
            create_count: self.create_count.load(Ordering::Relaxed),
            remove_count: self.remove_count.load(Ordering::Relaxed),
            max_size: self.config.max_size,
            idle_timeout: self.config.idle_timeout,
            next_sweep_in: next_at.saturating_duration_since(Instant::now()),
        }
    }

    /// Idle resources ready for reuse.
    pub fn available(&self) -> usize {
        self.state.lock().idle.len()
    }

    /// Resources currently checked out.
    pub fn in_use(&self) -> usize {
        self.state.lock().in_use
    }

    /// Logical pool size: idle plus checked out.
    pub fn size(&self) -> usize {
        let state = self.state.lock();
        state.idle.len() + state.in_use
    }

    /// Successful constructions since the pool was built.
    pub fn create_count(&self) -> u64 {
        self.create_count.load(Ordering::Relaxed)
    }

    /// Resources retired from the pool since it was built.
    pub fn remove_count(&self) -> u64 {
        self.remove_count.load(Ordering::Relaxed)
    }

    /// The configuration the pool was built with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    fn reuse_idle(&self) -> Option<F::Resource> {
        let mut state = self.state.lock();
        let entry = state.idle.pop()?;
        state.in_use += 1;
        state.peak_in_use = state.peak_in_use.max(state.in_use);
        let available = state.idle.len();
        drop(state);
        trace!(available, "reusing idle resource");
        Some(entry.resource)
    }

    fn register_created(&self) {
        self.create_count.fetch_add(1, Ordering::Relaxed);
        let mut state = self.state.lock();
        state.in_use += 1;
        state.peak_in_use = state.peak_in_use.max(state.in_use);
    }

    /// Evict idle entries that aged past the timeout. Fires at most once
    /// per crossed deadline; before the deadline it is a cheap no-op.
    /// The deadline advances by exactly one period per fired sweep, so
    /// after a long gap the next releases sweep back to back until the
    /// schedule catches up.
    fn sweep(&self) {
        let now = Instant::now();

        let timed_out = {
            let mut state = self.state.lock();
            if !state.schedule.is_due(now) {
                return;
            }
            let timed_out = if state.idle.is_empty() {
                Vec::new()
            } else {
                match state.schedule.cutoff(now) {
                    Some(cutoff) => state.idle.drain_older_than(cutoff),
                    None => Vec::new(),
                }
            };
            state.schedule.advance();
            state.peak_timed_out = state.peak_timed_out.max(timed_out.len());
            timed_out
        };

        if timed_out.is_empty() {
            trace!("sweep found nothing to evict");
        } else {
            debug!(evicted = timed_out.len(), "sweep evicted idle resources");
        }

        for entry in timed_out {
            self.remove_resource(entry.resource, "timed out");
        }
    }

    /// Hand a resource back to the factory. Counts the retirement first;
    /// teardown errors are logged, never propagated.
    fn remove_resource(&self, resource: F::Resource, reason: &str) {
        self.remove_count.fetch_add(1, Ordering::Relaxed);
        debug!(reason, "removing resource");
        if let Err(error) = self.factory.remove(resource).map_err(PoolError::Remove) {
            warn!(reason, error = %error, "failed to remove resource");
        }
    }
}

impl<F: ResourceFactory> Drop for LoosePool<F> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<F: ResourceFactory> fmt::Debug for LoosePool<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        f.debug_struct("LoosePool").field("stats", &stats).finish()
    }
}

/// Pool capability: hand out, take back, and retire resources.
///
/// [`LoosePool`] is the engine implementation; the trait is the seam for
/// code that wants to stay generic over pooling strategies.
pub trait ResourcePool {
    type Resource;
    type Args;
    type Error;

    /// Hand out a resource, constructing one on an idle miss.
    fn acquire(&self) -> PoolResult<Self::Resource, Self::Error>;

    /// Hand out a resource, forwarding constructor arguments on a miss.
    fn acquire_with(&self, args: Self::Args) -> PoolResult<Self::Resource, Self::Error>;

    /// Return a resource to the pool. Infallible.
    fn release(&self, resource: Self::Resource);

    /// Retire a checked-out resource without pooling it.
    fn discard(&self, resource: Self::Resource);

    /// Retire every idle resource and reset the in-use count.
    fn destroy(&self);

    /// Point-in-time statistics.
    fn stats(&self) -> PoolStats;
}

impl<F: ResourceFactory> ResourcePool for LoosePool<F> {
    type Resource = F::Resource;
    type Args = F::Args;
    type Error = F::Error;

    fn acquire(&self) -> PoolResult<F::Resource, F::Error> {
        LoosePool::acquire(self)
    }

    fn acquire_with(&self, args: F::Args) -> PoolResult<F::Resource, F::Error> {
        LoosePool::acquire_with(self, args)
    }

    fn release(&self, resource: F::Resource) {
        LoosePool::release(self, resource)
    }

    fn discard(&self, resource: F::Resource) {
        LoosePool::discard(self, resource)
    }

    fn destroy(&self) {
        LoosePool::destroy(self)
    }

    fn stats(&self) -> PoolStats {
        LoosePool::stats(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("factory refused to {0}")]
    struct FactoryError(&'static str);

    #[derive(Default)]
    struct Counters {
        create_calls: AtomicUsize,
        removed: AtomicUsize,
    }

    /// Builds `usize` resources numbered in creation order. `create_with`
    /// marks its resources by adding 1000 to the argument.
    struct CountingFactory {
        counters: Arc<Counters>,
        fail_create: bool,
        fail_remove: bool,
    }

    impl CountingFactory {
        fn new() -> (Self, Arc<Counters>) {
            let counters = Arc::new(Counters::default());
            let factory = Self {
                counters: Arc::clone(&counters),
                fail_create: false,
                fail_remove: false,
            };
            (factory, counters)
        }
    }

    impl ResourceFactory for CountingFactory {
        type Resource = usize;
        type Args = usize;
        type Error = FactoryError;

        fn create(&self) -> Result<usize, FactoryError> {
            let serial = self.counters.create_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_create {
                return Err(FactoryError("create"));
            }
            Ok(serial)
        }

        fn create_with(&self, args: usize) -> Result<usize, FactoryError> {
            self.counters.create_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_create {
                return Err(FactoryError("create"));
            }
            Ok(1000 + args)
        }

        fn remove(&self, _resource: usize) -> Result<(), FactoryError> {
            self.counters.removed.fetch_add(1, Ordering::SeqCst);
            if self.fail_remove {
                return Err(FactoryError("remove"));
            }
            Ok(())
        }
    }

    fn pool_with(config: PoolConfig) -> (LoosePool<CountingFactory>, Arc<Counters>) {
        let (factory, counters) = CountingFactory::new();
        (LoosePool::new(factory, config), counters)
    }

    #[test]
    fn test_first_acquire_creates() {
        let (pool, counters) = pool_with(PoolConfig::default());

        let resource = pool.acquire().unwrap();
        assert_eq!(resource, 0);
        assert_eq!(counters.create_calls.load(Ordering::SeqCst), 1);

        let stats = pool.stats();
        assert_eq!(stats.in_use, 1);
        assert_eq!(stats.available, 0);
        assert_eq!(stats.size, 1);
        assert_eq!(stats.create_count, 1);
    }

    #[test]
    fn test_acquire_prefers_most_recent_release() {
        let (pool, counters) = pool_with(PoolConfig::default());

        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        pool.release(a);
        pool.release(b);

        assert_eq!(pool.acquire().unwrap(), b);
        assert_eq!(pool.acquire().unwrap(), a);
        assert_eq!(pool.acquire().unwrap(), 2);
        assert_eq!(counters.create_calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_release_grows_past_initial_capacity() {
        let config = PoolConfig::new().with_initial_capacity(2);
        let (pool, counters) = pool_with(config);

        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        let c = pool.acquire().unwrap();
        pool.release(a);
        pool.release(b);
        pool.release(c);

        assert_eq!(pool.available(), 3);
        assert_eq!(pool.acquire().unwrap(), c);
        assert_eq!(pool.acquire().unwrap(), b);
        assert_eq!(pool.acquire().unwrap(), a);
        assert_eq!(counters.create_calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_discard_skips_the_idle_store() {
        let (pool, counters) = pool_with(PoolConfig::default());

        let resource = pool.acquire().unwrap();
        pool.discard(resource);

        let stats = pool.stats();
        assert_eq!(stats.in_use, 0);
        assert_eq!(stats.available, 0);
        assert_eq!(stats.remove_count, 1);
        assert_eq!(counters.removed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sweep_evicts_aged_entries() {
        let config = PoolConfig::new().with_idle_timeout(Duration::from_millis(100));
        let (pool, counters) = pool_with(config);

        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        let c = pool.acquire().unwrap();
        let d = pool.acquire().unwrap();
        pool.release(a);
        pool.release(b);
        pool.release(c);

        thread::sleep(Duration::from_millis(150));
        pool.release(d);

        let stats = pool.stats();
        assert_eq!(stats.available, 1);
        assert_eq!(stats.peak_timed_out, 3);
        assert_eq!(stats.remove_count, 3);
        assert_eq!(counters.removed.load(Ordering::SeqCst), 3);
        assert_eq!(pool.acquire().unwrap(), d);
    }

    #[test]
    fn test_sweep_keeps_fresh_entries_in_order() {
        let config = PoolConfig::new().with_idle_timeout(Duration::from_millis(300));
        let (pool, _counters) = pool_with(config);

        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        let c = pool.acquire().unwrap();
        let d = pool.acquire().unwrap();
        let e = pool.acquire().unwrap();
        pool.release(a);
        pool.release(b);

        thread::sleep(Duration::from_millis(150));
        pool.release(c);
        pool.release(d);

        thread::sleep(Duration::from_millis(200));
        pool.release(e);

        let stats = pool.stats();
        assert_eq!(stats.available, 3);
        assert_eq!(stats.peak_timed_out, 2);
        assert_eq!(pool.acquire().unwrap(), e);
        assert_eq!(pool.acquire().unwrap(), d);
        assert_eq!(pool.acquire().unwrap(), c);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let (pool, counters) = pool_with(PoolConfig::default());

        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        pool.release(a);
        pool.release(b);

        pool.destroy();
        assert_eq!(counters.removed.load(Ordering::SeqCst), 2);

        pool.destroy();
        assert_eq!(counters.removed.load(Ordering::SeqCst), 2);

        let stats = pool.stats();
        assert_eq!(stats.available, 0);
        assert_eq!(stats.in_use, 0);
        assert_eq!(stats.remove_count, 2);

        drop(pool);
        assert_eq!(counters.removed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_create_failure_propagates() {
        let (mut factory, counters) = CountingFactory::new();
        factory.fail_create = true;
        let pool = LoosePool::new(factory, PoolConfig::default());

        let result = pool.acquire();
        assert!(matches!(result, Err(PoolError::Create(_))));
        assert_eq!(counters.create_calls.load(Ordering::SeqCst), 1);

        let stats = pool.stats();
        assert_eq!(stats.create_count, 0);
        assert_eq!(stats.in_use, 0);
        assert_eq!(stats.size, 0);
    }

    #[test]
    fn test_remove_failure_does_not_stop_the_batch() {
        let (mut factory, counters) = CountingFactory::new();
        factory.fail_remove = true;
        let pool = LoosePool::new(factory, PoolConfig::default());

        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        let c = pool.acquire().unwrap();
        pool.release(a);
        pool.release(b);
        pool.release(c);
        pool.destroy();

        assert_eq!(counters.removed.load(Ordering::SeqCst), 3);
        let stats = pool.stats();
        assert_eq!(stats.remove_count, 3);
        assert_eq!(stats.available, 0);
        assert_eq!(stats.in_use, 0);
    }

    #[test]
    fn test_acquire_with_reuses_idle_before_building() {
        let (pool, counters) = pool_with(PoolConfig::default());

        let first = pool.acquire_with(5).unwrap();
        assert_eq!(first, 1005);
        pool.release(first);

        let second = pool.acquire_with(9).unwrap();
        assert_eq!(second, 1005);
        assert_eq!(counters.create_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_peak_statistics_track_high_water_marks() {
        let (pool, _counters) = pool_with(PoolConfig::default());

        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        let _c = pool.acquire().unwrap();
        pool.release(a);
        pool.release(b);
        let _d = pool.acquire().unwrap();

        let stats = pool.stats();
        assert_eq!(stats.peak_in_use, 3);
        assert_eq!(stats.peak_idle, 2);
        assert_eq!(stats.available, 1);
        assert_eq!(stats.in_use, 2);
    }

    #[test]
    fn test_release_without_acquire_saturates_in_use() {
        let (pool, _counters) = pool_with(PoolConfig::default());

        pool.release(99);

        let stats = pool.stats();
        assert_eq!(stats.in_use, 0);
        assert_eq!(stats.available, 1);
    }

    #[test]
    fn test_release_after_destroy_readmits_the_resource() {
        let (pool, counters) = pool_with(PoolConfig::default());

        let a = pool.acquire().unwrap();
        pool.destroy();
        pool.release(a);

        let stats = pool.stats();
        assert_eq!(stats.available, 1);
        assert_eq!(stats.in_use, 0);
        assert_eq!(pool.acquire().unwrap(), a);
        assert_eq!(counters.create_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_checkout_guard_returns_on_drop() {
        let (pool, counters) = pool_with(PoolConfig::default());

        {
            let guard = pool.checkout().unwrap();
            assert_eq!(*guard, 0);
            assert_eq!(pool.in_use(), 1);
        }

        let stats = pool.stats();
        assert_eq!(stats.in_use, 0);
        assert_eq!(stats.available, 1);
        assert_eq!(pool.acquire().unwrap(), 0);
        assert_eq!(counters.create_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_checkout_guard_discard_retires() {
        let (pool, counters) = pool_with(PoolConfig::default());

        let guard = pool.checkout().unwrap();
        guard.discard();

        let stats = pool.stats();
        assert_eq!(stats.in_use, 0);
        assert_eq!(stats.available, 0);
        assert_eq!(counters.removed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_checkout_guard_mutation_survives_pooling() {
        let (pool, _counters) = pool_with(PoolConfig::default());

        {
            let mut guard = pool.checkout().unwrap();
            *guard = 7;
        }

        assert_eq!(pool.acquire().unwrap(), 7);
    }

    #[test]
    fn test_pool_trait_is_usable_generically() {
        fn shut_down<P: ResourcePool>(pool: &P) -> PoolStats {
            pool.destroy();
            pool.stats()
        }

        let (pool, _counters) = pool_with(PoolConfig::default());
        let resource = ResourcePool::acquire(&pool).unwrap();
        ResourcePool::release(&pool, resource);

        let stats = shut_down(&pool);
        assert_eq!(stats.available, 0);
        assert_eq!(stats.remove_count, 1);
    }
}
