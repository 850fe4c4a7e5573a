//! Packed argument buffers for the callgate bridge
//!
//! - [`ArgPacker`] lays typed values out in the packed format
//! - [`unpack`] reads them back by expected types
//! - [`ArgArena`] owns buffers behind `u64` handles and is the bridge's
//!   default [`ArgumentDecoder`](callgate_sdk::ArgumentDecoder)

#![warn(missing_docs)]

pub mod arena;
pub mod pack;

pub use arena::ArgArena;
pub use pack::{unpack, ArgPacker, PackError};
