//! Long-lived pool of producer threads feeding one bounded channel.
//!
//! The pool spawns one [`Producer`] per configured worker, each with a
//! distinct worker index, all sending into a single bounded MPSC channel. The
//! channel is the only shared mutable state; every identifier is delivered to
//! exactly one receive call.
//!
//! Producers run until [`ProducerPool::shutdown`] is called or the pool is
//! dropped. Shutdown signals every producer first and then joins them, so a
//! producer parked on a full channel does not hold up the others.

use crate::{
    DefaultEntropyHasher, Error, HardwareAddress, Id, PoolConfig, Producer, ProducerHandle,
    Result, SystemClock, TimeSource,
};
use core::hash::BuildHasher;
use crossbeam_channel::Receiver;

/// A running set of producers and the receiving end of their output channel.
///
/// # Example
///
/// ```
/// use idgen::{HardwareAddress, ProducerPool};
///
/// let pool = ProducerPool::with_defaults(HardwareAddress::new([2, 0, 0, 0, 0, 1])).unwrap();
/// let ids = pool.take(100).unwrap();
/// assert_eq!(ids.len(), 100);
/// pool.shutdown().unwrap();
/// ```
#[derive(Debug)]
pub struct ProducerPool {
    receiver: Receiver<Id>,
    producers: Vec<ProducerHandle>,
}

impl ProducerPool {
    /// Starts a pool with [`PoolConfig::default`], the system clock and the
    /// default digest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the default config is unusable on
    /// this host.
    pub fn with_defaults(hardware_address: HardwareAddress) -> Result<Self> {
        Self::start(
            hardware_address,
            &PoolConfig::default(),
            SystemClock,
            DefaultEntropyHasher::default(),
        )
    }

    /// Starts `config.num_workers` producers with worker indices
    /// `0..num_workers`, all sharing `hardware_address`, `time` and `hasher`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` fails validation.
    pub fn start<T, S>(
        hardware_address: HardwareAddress,
        config: &PoolConfig,
        time: T,
        hasher: S,
    ) -> Result<Self>
    where
        T: TimeSource,
        S: BuildHasher + Clone + Send + 'static,
    {
        config.validate()?;
        let capacity = config.channel_capacity()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Starting {} producers for {} (channel capacity {})",
            config.num_workers,
            hardware_address,
            capacity
        );

        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        let producers = (0..config.num_workers)
            .map(|worker_index| {
                Producer::new(hardware_address, worker_index, time.clone(), hasher.clone())
                    .spawn(sender.clone())
            })
            .collect();

        // Only producers hold senders, so the receiver disconnects if they all
        // exit.
        drop(sender);

        Ok(Self {
            receiver,
            producers,
        })
    }

    pub fn num_workers(&self) -> usize {
        self.producers.len()
    }

    /// The shared output channel, for callers that want to `select!` on it.
    pub const fn receiver(&self) -> &Receiver<Id> {
        &self.receiver
    }

    /// Blocks until the next identifier is available.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelError`] if every producer has exited.
    pub fn recv(&self) -> Result<Id> {
        self.receiver.recv().map_err(|_| Error::ChannelError {
            context: "all producers exited".into(),
        })
    }

    /// Receives exactly `n` identifiers, in receipt order.
    ///
    /// Receipt order is whichever producer delivered first, not creation
    /// order; see [`sort_by_creation_time`](crate::sort_by_creation_time).
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] if `n` identifiers do not fit in memory.
    /// - [`Error::ChannelError`] if every producer exits before `n`
    ///   identifiers were received.
    pub fn take(&self, n: usize) -> Result<Vec<Id>> {
        let mut ids = reserve_ids(n)?;
        self.receive_into(&mut ids, n)?;
        Ok(ids)
    }

    pub(crate) fn receive_into(&self, ids: &mut Vec<Id>, n: usize) -> Result<()> {
        for received in 0..n {
            let id = self.receiver.recv().map_err(|_| Error::ChannelError {
                context: format!("all producers exited after {received} of {n} ids"),
            })?;
            ids.push(id);
        }
        Ok(())
    }

    /// Stops every producer and waits for their threads to exit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerPanicked`] for the first producer found to have
    /// panicked. All producers are joined regardless.
    pub fn shutdown(mut self) -> Result<()> {
        let mut producers = core::mem::take(&mut self.producers);

        #[cfg(feature = "tracing")]
        tracing::debug!("Stopping {} producers", producers.len());

        for producer in &mut producers {
            producer.signal_stop();
        }

        let mut result = Ok(());
        for mut producer in producers {
            if let Err(e) = producer.join() {
                #[cfg(feature = "tracing")]
                tracing::error!("Failed to join producer: {e}");

                if result.is_ok() {
                    result = Err(e);
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Producer pool shutdown complete");

        result
    }
}

/// Allocates room for `n` identifiers up front, failing instead of aborting.
pub(crate) fn reserve_ids(n: usize) -> Result<Vec<Id>> {
    let mut ids = Vec::new();
    ids.try_reserve_exact(n).map_err(|e| Error::InvalidConfig {
        reason: format!("batch of {n} ids does not fit in memory: {e}"),
    })?;
    Ok(ids)
}

impl Drop for ProducerPool {
    fn drop(&mut self) {
        for producer in &mut self.producers {
            producer.signal_stop();
        }
    }
}
