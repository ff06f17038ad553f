use core::hash::BuildHasherDefault;
use twox_hash::XxHash64;

/// Digest used when none is specified: xxHash64 with seed 0.
///
/// Any [`BuildHasher`](core::hash::BuildHasher) can be plugged into a
/// [`Producer`](crate::Producer); every producer of a run must use the same
/// one so digests are comparable. For a seeded xxHash64 use
/// [`twox_hash::xxhash64::State`].
pub type DefaultEntropyHasher = BuildHasherDefault<XxHash64>;
