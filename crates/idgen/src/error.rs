//! Error types for identifier generation.
//!
//! ## Error Cases
//! - `NoSuitableInterface`: the host has no usable hardware address.
//! - `MalformedIdentifier`: decode input is not a 16-byte identifier.
//! - `InvalidConfig`: a [`PoolConfig`](crate::PoolConfig) failed validation.
//! - `ChannelError`: the output channel disconnected before a batch was full.
//! - `WorkerPanicked`: a producer thread panicked before it was joined.

/// A result type defaulting to the crate [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `idgen` can produce.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Interface enumeration failed, or no non-loopback interface with a
    /// 6-byte hardware address exists.
    #[error("Could not find a MAC address to use in unique IDs: {reason}")]
    NoSuitableInterface { reason: String },

    /// The input is not exactly [`ID_LEN`](crate::ID_LEN) bytes. Inputs are
    /// never truncated or padded.
    #[error("Malformed identifier: expected 16 bytes, got {len}")]
    MalformedIdentifier { len: usize },

    /// The pool configuration is unusable.
    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// Internal channel failure (every producer went away mid-batch).
    #[error("Channel error: {context}")]
    ChannelError { context: String },

    /// A producer thread panicked.
    #[error("Producer {worker_index} panicked")]
    WorkerPanicked { worker_index: usize },
}
