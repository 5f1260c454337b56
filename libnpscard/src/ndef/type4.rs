// libnpscard/src/ndef/type4.rs

//! NLEN-prefixed Type-4 NDEF file envelope.

use crate::constants::NLEN_SIZE;
use crate::protocol::parser;
use crate::{EncodingError, ParseError, Result};

/// Bytes a message of `message_len` occupies inside a Type-4 NDEF file.
pub fn type4_file_len(message_len: usize) -> usize {
    NLEN_SIZE + message_len
}

/// Lay out an NDEF message as Type-4 file content:
/// `NLEN (u16 BE) || message || zero padding` up to `capacity`.
pub fn wrap_type4_file(capacity: usize, message: &[u8]) -> Result<Vec<u8>> {
    let required = type4_file_len(message.len());
    if required > capacity || message.len() > u16::MAX as usize {
        return Err(EncodingError::ContentTooLarge { required, capacity }.into());
    }

    let mut out = Vec::with_capacity(capacity);
    out.extend_from_slice(&(message.len() as u16).to_be_bytes());
    out.extend_from_slice(message);
    out.resize(capacity, 0x00);
    Ok(out)
}

/// Extract the NDEF message from Type-4 file content.
///
/// An NLEN of zero (no message) or one pointing past the end of the
/// file is rejected.
pub fn unwrap_type4_file(file: &[u8]) -> Result<&[u8]> {
    let nlen = parser::be_u16_at(file, 0)? as usize;
    let available = file.len() - NLEN_SIZE;
    if nlen == 0 || nlen > available {
        return Err(ParseError::InvalidLength { nlen, available }.into());
    }
    Ok(&file[NLEN_SIZE..NLEN_SIZE + nlen])
}
