// libnpscard/src/protocol/mod.rs

//! DESFire native protocol: commands, framing and response decoding.

pub mod codec;
pub mod commands;
pub mod frame;
pub mod parser;
pub mod responses;
pub mod status;

pub use commands::Command;
pub use frame::{Frame, ResponseFrame};
pub use responses::*;
pub use status::DesfireStatus;
