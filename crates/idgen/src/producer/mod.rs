//! Per-worker identifier producer.
//!
//! A [`Producer`] owns a private 28-byte entropy buffer that is zeroed and
//! refilled on every iteration:
//!
//! ```text
//!  0        8          14                    28
//! +--------+----------+-----------+---------+
//! | nanos  | hw addr  | worker ix | zeroes  |
//! | i64 LE | 6 bytes  | usize LE  |         |
//! +--------+----------+-----------+---------+
//! ```
//!
//! The whole buffer is hashed into a 64-bit digest and the identifier is the
//! timestamp followed by that digest. The buffer never leaves the producer;
//! each identifier is a fresh value moved into the output channel.
//!
//! Uniqueness within one worker relies on the clock advancing between
//! iterations. If two iterations of the same worker read the same nanosecond
//! they emit identical identifiers. No counter is mixed in to hide this.


use crate::{
    DefaultEntropyHasher, Error, HardwareAddress, Id, Result, SystemClock, TimeSource,
    id::TIMESTAMP_LEN, node::HARDWARE_ADDRESS_LEN,
};
use core::hash::{BuildHasher, Hasher};
use crossbeam_channel::{Receiver, Sender, TryRecvError, select};
use std::thread::{self, JoinHandle};

/// Size of the per-worker entropy buffer in bytes.
pub const ENTROPY_LEN: usize = 28;

const HW_OFFSET: usize = TIMESTAMP_LEN;
const WORKER_OFFSET: usize = HW_OFFSET + HARDWARE_ADDRESS_LEN;
const WORKER_LEN: usize = size_of::<usize>();

const _: () = assert!(WORKER_OFFSET + WORKER_LEN <= ENTROPY_LEN);

/// Generates identifiers for one worker.
///
/// Use [`Producer::next_id`] to generate synchronously, or
/// [`Producer::spawn`] to run it on a background thread feeding a channel.
///
/// # Example
///
/// ```
/// use idgen::{HardwareAddress, Producer};
///
/// let mut producer = Producer::with_defaults(HardwareAddress::new([2, 0, 0, 0, 0, 1]), 0);
/// let id = producer.next_id();
/// assert_eq!(id.as_bytes().len(), 16);
/// ```
#[derive(Debug)]
pub struct Producer<T = SystemClock, S = DefaultEntropyHasher> {
    hardware_address: HardwareAddress,
    worker_index: usize,
    time: T,
    hasher: S,
    entropy: [u8; ENTROPY_LEN],
}

impl Producer {
    /// Creates a producer reading the system clock and hashing with xxHash64.
    pub fn with_defaults(hardware_address: HardwareAddress, worker_index: usize) -> Self {
        Self::new(
            hardware_address,
            worker_index,
            SystemClock,
            DefaultEntropyHasher::default(),
        )
    }
}

impl<T, S> Producer<T, S>
where
    T: TimeSource,
    S: BuildHasher,
{
    /// Creates a producer.
    ///
    /// # Parameters
    ///
    /// - `hardware_address`: node entropy, identical for every producer of a
    ///   batch.
    /// - `worker_index`: distinguishes sibling producers reading the same
    ///   nanosecond.
    /// - `time`: source of the embedded timestamp.
    /// - `hasher`: digest function; must be the same for every producer of a
    ///   run.
    pub fn new(hardware_address: HardwareAddress, worker_index: usize, time: T, hasher: S) -> Self {
        Self {
            hardware_address,
            worker_index,
            time,
            hasher,
            entropy: [0; ENTROPY_LEN],
        }
    }

    pub const fn worker_index(&self) -> usize {
        self.worker_index
    }

    pub const fn hardware_address(&self) -> HardwareAddress {
        self.hardware_address
    }

    /// Runs one iteration and returns the identifier.
    pub fn next_id(&mut self) -> Id {
        let timestamp = self.time.current_nanos();
        let digest = self.digest(timestamp);
        Id::from_parts(timestamp, digest)
    }

    fn digest(&mut self, timestamp: i64) -> u64 {
        self.entropy = [0; ENTROPY_LEN];
        self.entropy[..HW_OFFSET].copy_from_slice(&timestamp.to_le_bytes());
        self.entropy[HW_OFFSET..WORKER_OFFSET].copy_from_slice(&self.hardware_address.octets());
        self.entropy[WORKER_OFFSET..WORKER_OFFSET + WORKER_LEN]
            .copy_from_slice(&self.worker_index.to_le_bytes());

        let mut hasher = self.hasher.build_hasher();
        hasher.write(&self.entropy);
        hasher.finish()
    }
}

impl<T, S> Producer<T, S>
where
    T: TimeSource,
    S: BuildHasher + Send + 'static,
{
    /// Moves the producer onto a background thread that sends identifiers to
    /// `out` until stopped.
    ///
    /// Sends block while `out` is full (or, for a zero-capacity channel, until
    /// a receiver takes the identifier). The thread exits when the returned
    /// handle is stopped or dropped, or when every receiver of `out` is gone.
    pub fn spawn(self, out: Sender<Id>) -> ProducerHandle {
        let worker_index = self.worker_index;
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);
        let thread = thread::spawn(move || self.run(out, stop_rx));

        ProducerHandle {
            worker_index,
            stop: Some(stop_tx),
            thread: Some(thread),
        }
    }

    fn run(mut self, out: Sender<Id>, stop: Receiver<()>) {
        #[cfg(feature = "tracing")]
        tracing::trace!("Producer {} started", self.worker_index);

        loop {
            // Disconnection is the stop signal.
            if !matches!(stop.try_recv(), Err(TryRecvError::Empty)) {
                break;
            }

            let id = self.next_id();

            select! {
                send(out, id) -> sent => {
                    if sent.is_err() {
                        #[cfg(feature = "tracing")]
                        tracing::trace!("Producer {} output disconnected", self.worker_index);
                        break;
                    }
                }
                recv(stop) -> _ => break,
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!("Producer {} stopped", self.worker_index);
    }
}

/// Starts a producer with the system clock and default digest on a background
/// thread.
///
/// Returns immediately; the producer runs until the handle is stopped or
/// dropped, or until `out` has no receivers left.
pub fn spawn_producer(
    hardware_address: HardwareAddress,
    worker_index: usize,
    out: Sender<Id>,
) -> ProducerHandle {
    Producer::with_defaults(hardware_address, worker_index).spawn(out)
}

/// Owner of a running producer thread.
///
/// Dropping the handle signals the producer to stop without waiting for it.
/// Use [`ProducerHandle::stop`] to also join the thread.
#[derive(Debug)]
pub struct ProducerHandle {
    worker_index: usize,
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl ProducerHandle {
    pub const fn worker_index(&self) -> usize {
        self.worker_index
    }

    /// Returns `true` once the producer thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Signals the producer to stop without waiting for it. Idempotent.
    pub fn signal_stop(&mut self) {
        self.stop.take();
    }

    /// Signals the producer to stop and waits for its thread to exit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerPanicked`] if the producer thread panicked.
    pub fn stop(mut self) -> Result<()> {
        self.signal_stop();
        self.join()
    }

    pub(crate) fn join(&mut self) -> Result<()> {
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| Error::WorkerPanicked {
                worker_index: self.worker_index,
            }),
            None => Ok(()),
        }
    }
}

impl Drop for ProducerHandle {
    fn drop(&mut self) {
        self.signal_stop();
    }
}
