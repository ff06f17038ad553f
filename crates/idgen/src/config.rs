use crate::{Error, Result};

/// Pending identifiers buffered per producer in the shared output channel.
///
/// A single consumer drains the channel, so a deeper buffer smooths rate
/// mismatches between many producers and that one reader at the cost of
/// memory.
pub const DEFAULT_CAPACITY_PER_WORKER: usize = 128;

/// Sizing of a [`ProducerPool`](crate::ProducerPool).
///
/// # Example
///
/// ```
/// use idgen::PoolConfig;
///
/// let config = PoolConfig::default().with_num_workers(4);
/// assert_eq!(config.channel_capacity().unwrap(), 4 * 128);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of producer threads. Each gets a distinct worker index in
    /// `0..num_workers`.
    pub num_workers: usize,

    /// Output channel slots per worker. Zero makes every hand-off a
    /// rendezvous between one producer and the consumer.
    pub capacity_per_worker: usize,
}

impl Default for PoolConfig {
    /// One worker per logical CPU, [`DEFAULT_CAPACITY_PER_WORKER`] slots each.
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            capacity_per_worker: DEFAULT_CAPACITY_PER_WORKER,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub const fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    #[must_use]
    pub const fn with_capacity_per_worker(mut self, capacity_per_worker: usize) -> Self {
        self.capacity_per_worker = capacity_per_worker;
        self
    }

    /// Total capacity of the shared output channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the product overflows `usize`.
    pub fn channel_capacity(&self) -> Result<usize> {
        self.num_workers
            .checked_mul(self.capacity_per_worker)
            .ok_or_else(|| Error::InvalidConfig {
                reason: format!(
                    "channel capacity overflows: {} workers x {} slots",
                    self.num_workers, self.capacity_per_worker
                ),
            })
    }

    /// Checks that a pool can be started from this config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if there are no workers or the channel
    /// capacity overflows.
    pub fn validate(&self) -> Result<()> {
        if self.num_workers == 0 {
            return Err(Error::InvalidConfig {
                reason: "num_workers must be greater than 0".into(),
            });
        }
        self.channel_capacity().map(|_| ())
    }
}
