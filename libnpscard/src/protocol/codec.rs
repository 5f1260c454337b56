// libnpscard/src/protocol/codec.rs

//! Glue between [`Command`](super::Command) and the wire frame.

use crate::Result;

use super::commands::Command;
use super::frame::{Frame, ResponseFrame};

/// Encode a Command into a full ISO-wrapped frame.
pub fn encode_command_frame(cmd: &Command) -> Result<Vec<u8>> {
    let body = cmd.encode()?;
    Frame::encode(cmd.ins(), &body)
}

/// Decode a raw card response into payload and status.
pub fn decode_response_frame(frame: &[u8]) -> Result<ResponseFrame> {
    Frame::decode(frame)
}
