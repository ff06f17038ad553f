use crate::{
    DefaultEntropyHasher, Error, HardwareAddress, Id, PoolConfig, ProducerPool, Result,
    SystemClock, TimeSource, pool::reserve_ids,
};
use core::hash::BuildHasher;

/// Generates fixed-size batches of identifiers in parallel.
///
/// Each call to [`BatchCoordinator::generate`] starts a [`ProducerPool`],
/// drains exactly the requested number of identifiers and then stops and
/// joins every producer. No threads outlive the call.
///
/// # Example
///
/// ```
/// use idgen::{BatchCoordinator, DefaultEntropyHasher, HardwareAddress, PoolConfig, SystemClock};
///
/// let coordinator = BatchCoordinator::with_components(
///     PoolConfig::default().with_num_workers(2),
///     SystemClock,
///     DefaultEntropyHasher::default(),
/// );
/// let ids = coordinator.generate(HardwareAddress::new([2, 0, 0, 0, 0, 1]), 10).unwrap();
/// assert_eq!(ids.len(), 10);
/// ```
#[derive(Debug, Clone)]
pub struct BatchCoordinator<T = SystemClock, S = DefaultEntropyHasher> {
    config: PoolConfig,
    time: T,
    hasher: S,
}

impl Default for BatchCoordinator {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl BatchCoordinator {
    /// Uses the system clock and the default digest.
    pub fn new(config: PoolConfig) -> Self {
        Self::with_components(config, SystemClock, DefaultEntropyHasher::default())
    }
}

impl<T, S> BatchCoordinator<T, S>
where
    T: TimeSource,
    S: BuildHasher + Clone + Send + 'static,
{
    pub const fn with_components(config: PoolConfig, time: T, hasher: S) -> Self {
        Self {
            config,
            time,
            hasher,
        }
    }

    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Returns exactly `n` identifiers in receipt order.
    ///
    /// Receipt order is not creation order; sort with
    /// [`sort_by_creation_time`](crate::sort_by_creation_time) if needed.
    /// `n == 0` returns immediately without starting any producer.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] if the pool config is unusable or `n` does
    ///   not fit in memory on this platform.
    /// - [`Error::ChannelError`] if every producer died before `n`
    ///   identifiers arrived.
    /// - [`Error::WorkerPanicked`] if a producer panicked.
    pub fn generate(&self, hardware_address: HardwareAddress, n: u64) -> Result<Vec<Id>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let n = usize::try_from(n).map_err(|_| Error::InvalidConfig {
            reason: format!("batch of {n} ids exceeds the address space"),
        })?;
        // Allocate before any producer starts.
        let mut ids = reserve_ids(n)?;

        let pool = ProducerPool::start(
            hardware_address,
            &self.config,
            self.time.clone(),
            self.hasher.clone(),
        )?;
        let received = pool.receive_into(&mut ids, n);
        let stopped = pool.shutdown();

        received?;
        stopped?;

        #[cfg(feature = "tracing")]
        tracing::debug!("Generated batch of {} ids", ids.len());

        Ok(ids)
    }
}

/// Generates `n` identifiers using one producer per logical CPU.
///
/// # Errors
///
/// See [`BatchCoordinator::generate`].
pub fn generate_batch(hardware_address: HardwareAddress, n: u64) -> Result<Vec<Id>> {
    BatchCoordinator::default().generate(hardware_address, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ID_LEN, compare_by_creation_time, sort_by_creation_time};
    use std::collections::HashSet;
    use std::sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    };

    const HW: HardwareAddress = HardwareAddress::new([0x02, 0x00, 0x5e, 0x10, 0x00, 0x02]);

    /// Every producer reads the same nanosecond.
    #[derive(Clone)]
    struct FrozenTime;

    impl TimeSource for FrozenTime {
        fn current_nanos(&self) -> i64 {
            1_494_590_520_160_966_782
        }
    }

    /// Advances by one nanosecond on every read, shared across producers.
    #[derive(Clone)]
    struct MockStepTime(Arc<AtomicI64>);

    impl TimeSource for MockStepTime {
        fn current_nanos(&self) -> i64 {
            self.0.fetch_add(1, Ordering::Relaxed)
        }
    }

    #[test]
    fn returns_exactly_n_ids() {
        for n in [0_u64, 1, 10, 10_000] {
            let ids = generate_batch(HW, n).unwrap();
            assert_eq!(ids.len() as u64, n);
            assert!(ids.iter().all(|id| id.as_bytes().len() == ID_LEN));
        }
    }

    #[test]
    fn batch_of_ten_has_no_pairwise_collisions() {
        let ids = generate_batch(HW, 10).unwrap();
        for a in 0..9 {
            for b in a + 1..10 {
                assert_ne!(ids[a], ids[b]);
            }
        }
    }

    #[test]
    fn large_batch_is_unique() {
        let ids = generate_batch(HW, 100_000).unwrap();
        let unique: HashSet<_> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn frozen_clock_distinct_workers_do_not_collide() {
        // With the clock frozen, only the worker index separates producers.
        // Each worker repeats its own identifier, so a batch yields at most
        // one distinct id per worker.
        let coordinator = BatchCoordinator::with_components(
            PoolConfig::default().with_num_workers(4),
            FrozenTime,
            DefaultEntropyHasher::default(),
        );
        let ids = coordinator.generate(HW, 1_000).unwrap();

        let distinct: HashSet<_> = ids.iter().copied().collect();
        assert!(distinct.len() <= 4);
        assert!(ids.iter().all(|id| id.timestamp() == 1_494_590_520_160_966_782));
    }

    #[test]
    fn sorted_batch_is_chronological() {
        let coordinator = BatchCoordinator::with_components(
            PoolConfig::default().with_num_workers(4),
            MockStepTime(Arc::new(AtomicI64::new(0))),
            DefaultEntropyHasher::default(),
        );
        let mut ids = coordinator.generate(HW, 5_000).unwrap();
        sort_by_creation_time(&mut ids);

        assert!(ids.windows(2).all(|w| {
            compare_by_creation_time(&w[0], &w[1]) == core::cmp::Ordering::Less
        }));
    }

    #[test]
    fn invalid_config_is_reported() {
        let coordinator = BatchCoordinator::new(PoolConfig::default().with_num_workers(0));
        assert!(matches!(
            coordinator.generate(HW, 1),
            Err(Error::InvalidConfig { .. })
        ));
        // An empty batch never touches the pool.
        assert_eq!(coordinator.generate(HW, 0), Ok(Vec::new()));
    }

    #[test]
    fn oversized_batch_is_an_error_not_a_panic() {
        let coordinator = BatchCoordinator::new(PoolConfig::default().with_num_workers(2));
        assert!(matches!(
            coordinator.generate(HW, 1_u64 << 62),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn repeated_batches_do_not_leak_producers() {
        // Each call joins its producers before returning; a leak would show
        // up as unbounded thread growth and eventually spawn failure.
        let coordinator = BatchCoordinator::new(PoolConfig::default().with_num_workers(2));
        for _ in 0..200 {
            assert_eq!(coordinator.generate(HW, 3).unwrap().len(), 3);
        }
    }
}
