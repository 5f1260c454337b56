// libnpscard/src/prelude.rs

//! Commonly used types.
//!
//! ```
//! use libnpscard::prelude::*;
//! ```

pub use crate::card::PatientCard;
pub use crate::layout::{
    CardPayloads, Layout, LayoutConfig, LayoutVariant, Payload, PayloadUpdate, ReadOutcome,
};
pub use crate::ndef::{IsoType4Writer, Type4NdefWriter};
pub use crate::session::{Session, SessionState};
pub use crate::transport::CardChannel;
pub use crate::{
    AccessRights, Aid, CardError, ChannelError, CommMode, DesKey, Error, ErrorCategory, FileNumber,
    IsoFileId, ParseError, Result,
};

// Re-export small utilities for convenience
pub use crate::utils::{bytes_to_hex_spaced, hex_preview};
