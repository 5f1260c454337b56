// libnpscard/src/lib.rs

//! libnpscard
//!
//! Provisioning, writing and reading of patient-summary cards on MIFARE
//! DESFire EV1/EV2/EV3, in three on-card layouts (Pure, Dual and Nato),
//! over any channel that can exchange raw command frames with the card.
#![warn(missing_docs)]

pub mod card;
pub mod constants;
pub mod error;
pub mod layout;
pub mod ndef;
pub mod prelude;
pub mod protocol;
pub mod session;
pub mod test_support;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export common types at crate root so `crate::Error`, `crate::Result`,
// and the newtypes in `types` are available for consumers and for
// convenient `prelude` re-exports.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
