//! The 16-byte identifier and its codec.
//!
//! Byte layout (little-endian throughout):
//!
//! ```text
//!  0               8               16
//! +---------------+---------------+
//! | unix nanos    | 64-bit digest |
//! | (i64)         | (u64)         |
//! +---------------+---------------+
//! ```
//!
//! The layout is fixed for interoperability with stored identifiers. Ordering
//! by creation time only looks at the first eight bytes; identifiers sharing a
//! timestamp have no defined relative order beyond what a stable sort
//! preserves. The digest is deliberately not used as a tie-break.

use crate::{Error, Result};
use core::{cmp::Ordering, fmt};

/// Size of an encoded identifier in bytes.
pub const ID_LEN: usize = 16;

/// Size of the embedded timestamp in bytes.
pub const TIMESTAMP_LEN: usize = 8;

/// A 128-bit identifier: nanosecond creation timestamp followed by a hash
/// digest.
///
/// `Id` is a plain `Copy` value. Every identifier handed out by a
/// [`Producer`](crate::Producer) is a distinct value, so two identifiers can
/// never share storage.
///
/// `Id` intentionally does not implement [`Ord`]: byte order is not creation
/// order. Use [`compare_by_creation_time`] or [`sort_by_creation_time`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Id([u8; ID_LEN]);

impl Id {
    /// Encodes a timestamp and digest into an identifier.
    pub fn from_parts(timestamp: i64, digest: u64) -> Self {
        let mut bytes = [0_u8; ID_LEN];
        bytes[..TIMESTAMP_LEN].copy_from_slice(&timestamp.to_le_bytes());
        bytes[TIMESTAMP_LEN..].copy_from_slice(&digest.to_le_bytes());
        Self(bytes)
    }

    /// Wraps already-encoded identifier bytes.
    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Borrows the raw encoded bytes.
    pub const fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Returns the raw encoded bytes.
    pub const fn to_bytes(self) -> [u8; ID_LEN] {
        self.0
    }

    /// Nanoseconds since the UNIX epoch at which the identifier was created.
    pub fn timestamp(&self) -> i64 {
        let mut ts = [0_u8; TIMESTAMP_LEN];
        ts.copy_from_slice(&self.0[..TIMESTAMP_LEN]);
        i64::from_le_bytes(ts)
    }

    /// The hash digest half of the identifier.
    pub fn digest(&self) -> u64 {
        let mut digest = [0_u8; ID_LEN - TIMESTAMP_LEN];
        digest.copy_from_slice(&self.0[TIMESTAMP_LEN..]);
        u64::from_le_bytes(digest)
    }
}

impl From<[u8; ID_LEN]> for Id {
    fn from(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<Id> for [u8; ID_LEN] {
    fn from(id: Id) -> Self {
        id.0
    }
}

impl TryFrom<&[u8]> for Id {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        <[u8; ID_LEN]>::try_from(bytes)
            .map(Self)
            .map_err(|_| Error::MalformedIdentifier { len: bytes.len() })
    }
}

impl AsRef<[u8]> for Id {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Id {
    /// Lowercase hex of the stored bytes, in storage order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Id")
            .field("timestamp", &self.timestamp())
            .field("digest", &format_args!("{:#018x}", self.digest()))
            .finish()
    }
}

/// Reads the creation timestamp from raw identifier bytes.
///
/// # Errors
///
/// Returns [`Error::MalformedIdentifier`] unless `bytes` is exactly
/// [`ID_LEN`] long.
///
/// # Example
///
/// ```
/// let id = b"\x7e\x58\xdc\xce\x28\xda\xbd\x14\x9b\x89\xd1\x2b\xc5\x8c\xa5\xe0";
/// assert_eq!(idgen::extract_timestamp(id).unwrap(), 1_494_590_520_160_966_782);
/// ```
pub fn extract_timestamp(bytes: &[u8]) -> Result<i64> {
    Id::try_from(bytes).map(|id| id.timestamp())
}

/// Orders two identifiers by their embedded creation time.
///
/// Equal timestamps compare [`Ordering::Equal`] even when the digests differ.
pub fn compare_by_creation_time(a: &Id, b: &Id) -> Ordering {
    a.timestamp().cmp(&b.timestamp())
}

/// Like [`compare_by_creation_time`], for callers holding raw bytes.
///
/// # Errors
///
/// Returns [`Error::MalformedIdentifier`] if either input is not exactly
/// [`ID_LEN`] bytes.
pub fn compare_bytes_by_creation_time(a: &[u8], b: &[u8]) -> Result<Ordering> {
    Ok(extract_timestamp(a)?.cmp(&extract_timestamp(b)?))
}

/// Sorts identifiers in ascending creation time.
///
/// The sort is stable, so identifiers with equal timestamps keep their input
/// order.
pub fn sort_by_creation_time(ids: &mut [Id]) {
    ids.sort_by_key(Id::timestamp);
}
