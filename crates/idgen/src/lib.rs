//! Node-unique 128-bit identifiers generated in parallel.
//!
//! An identifier ([`Id`]) is 16 little-endian bytes: the creation time in
//! nanoseconds since the UNIX epoch, followed by a 64-bit digest of that
//! timestamp, the host's hardware address and the producing worker's index.
//!
//! ```
//! use idgen::{HardwareAddress, generate_batch, sort_by_creation_time};
//!
//! // Usually `idgen::resolve_hardware_address()?`.
//! let hw = HardwareAddress::new([0x02, 0x42, 0xac, 0x11, 0x00, 0x02]);
//!
//! let mut ids = generate_batch(hw, 1_000)?;
//! sort_by_creation_time(&mut ids);
//! assert!(ids.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()));
//! # Ok::<(), idgen::Error>(())
//! ```
//!
//! ## Features
//!
//! - `tracing`: emit producer and pool lifecycle events through `tracing`.
//! - `serde`: derive `Serialize`/`Deserialize` for [`Id`] and
//!   [`HardwareAddress`] as raw byte arrays.

mod batch;
mod config;
mod error;
mod hash;
mod id;
mod node;
mod pool;
mod producer;
mod time;

pub use crate::batch::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::hash::*;
pub use crate::id::*;
pub use crate::node::*;
pub use crate::pool::*;
pub use crate::producer::*;
pub use crate::time::*;
