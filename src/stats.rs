//! Pool statistics snapshot

use std::fmt;
use std::time::Duration;

/// Point-in-time view of pool state and counters.
///
/// Snapshots are taken atomically with respect to pool operations, so the
/// gauges are mutually consistent: `size` always equals
/// `available + in_use` at the instant of the snapshot.
///
/// # Examples
///
/// ```
/// use loosepool::{LoosePool, PoolConfig, ResourceFactory};
/// use std::convert::Infallible;
///
/// struct Tokens;
///
/// impl ResourceFactory for Tokens {
///     type Resource = u64;
///     type Args = ();
///     type Error = Infallible;
///
///     fn create(&self) -> Result<u64, Infallible> {
///         Ok(0)
///     }
/// }
///
/// let pool = LoosePool::new(Tokens, PoolConfig::default());
/// let token = pool.acquire().unwrap();
///
/// let stats = pool.stats();
/// assert_eq!(stats.in_use, 1);
/// assert_eq!(stats.size, 1);
///
/// pool.release(token);
/// assert_eq!(pool.stats().available, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PoolStats {
    /// Idle resources ready for reuse
    pub available: usize,

    /// Resources currently checked out
    pub in_use: usize,

    /// Logical pool size: `available + in_use`
    pub size: usize,

    /// Highest in-use count observed
    pub peak_in_use: usize,

    /// Highest idle count observed
    pub peak_idle: usize,

    /// Largest number of resources evicted by a single sweep
    pub peak_timed_out: usize,

    /// Successful resource constructions since the pool was built
    pub create_count: u64,

    /// Resources retired from the pool since it was built
    pub remove_count: u64,

    /// Configured advisory ceiling; never enforced
    pub max_size: Option<usize>,

    /// Configured idle timeout and sweep cadence
    pub idle_timeout: Duration,

    /// Time remaining until the next sweep deadline; zero when overdue
    pub next_sweep_in: Duration,
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pool[available={} inUse={} size={} peakInUse={} peakIdle={} \
             peakTimedOut={} createCount={} removeCount={} maxSize={} \
             idleTimeout={:?} nextSweepIn={:?}]",
            self.available,
            self.in_use,
            self.size,
            self.peak_in_use,
            self.peak_idle,
            self.peak_timed_out,
            self.create_count,
            self.remove_count,
            match self.max_size {
                Some(max) => max.to_string(),
                None => "unbounded".to_string(),
            },
            self.idle_timeout,
            self.next_sweep_in,
        )
    }
}
