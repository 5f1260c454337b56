//! Small helpers shared across the crate: hex formatting for frame traces
//! and the default channel timeouts.

pub mod hex;
pub mod timeout;

pub use hex::*;
pub use timeout::*;
