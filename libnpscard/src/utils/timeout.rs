//! Channel timeout defaults.
//!
//! The core never sleeps or measures time itself; the value is handed to
//! [`crate::transport::CardChannel::transceive`] and enforced there.

/// Per-exchange timeout used when the layout configuration does not set one.
pub const DEFAULT_TRANSCEIVE_TIMEOUT_MS: u32 = 1000;

/// Lower bound for Format PICC, which erases the whole EEPROM in one
/// exchange.
pub const FORMAT_TIMEOUT_MS: u32 = 5000;
