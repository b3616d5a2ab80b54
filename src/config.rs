//! Pool configuration options

use std::time::Duration;

/// Default number of idle slots reserved up front, and the step by which
/// the idle store grows when it is full.
pub const DEFAULT_INITIAL_CAPACITY: usize = 100;

/// Default idle timeout after which pooled resources become eligible for
/// eviction.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Configuration for pool behavior
///
/// # Examples
///
/// ```
/// use loosepool::PoolConfig;
/// use std::time::Duration;
///
/// let config = PoolConfig::new()
///     .with_initial_capacity(10)
///     .with_max_size(50)
///     .with_idle_timeout(Duration::from_secs(60));
///
/// assert_eq!(config.initial_capacity, 10);
/// assert_eq!(config.max_size, Some(50));
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolConfig {
    /// Capacity reserved for idle resources up front; also the chunk by
    /// which the idle store grows when it fills up. A value of 0 is
    /// treated as 1.
    pub initial_capacity: usize,

    /// Advisory ceiling on the total number of pooled resources. Recorded
    /// and reported in statistics, never enforced: the pool keeps creating
    /// resources past this value.
    pub max_size: Option<usize>,

    /// How long a resource may sit idle before an eviction sweep retires
    /// it. Also the cadence at which sweeps fire.
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_size: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl PoolConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial idle capacity and growth chunk
    ///
    /// # Examples
    ///
    /// ```
    /// use loosepool::PoolConfig;
    ///
    /// let config = PoolConfig::new().with_initial_capacity(25);
    ///
    /// assert_eq!(config.initial_capacity, 25);
    /// ```
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Set the advisory maximum pool size
    pub fn with_max_size(mut self, size: usize) -> Self {
        self.max_size = Some(size);
        self
    }

    /// Set the idle timeout for pooled resources
    ///
    /// # Examples
    ///
    /// ```
    /// use loosepool::PoolConfig;
    /// use std::time::Duration;
    ///
    /// let config = PoolConfig::new()
    ///     .with_idle_timeout(Duration::from_secs(300));
    ///
    /// assert_eq!(config.idle_timeout, Duration::from_secs(300));
    /// ```
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }
}
