// libnpscard/src/protocol/commands/read.rs

//! READ DATA command body.

use crate::constants::MAX_U24;
use crate::protocol::parser::le_u24;
use crate::types::FileNumber;
use crate::{EncodingError, Result};

/// Encode ReadData command body (DESFire command code 0xBD)
/// Layout: file_no(1) + offset(3, LE) + length(3, LE)
/// A length of zero asks for everything from `offset` to the end of file.
pub fn encode_read(file: FileNumber, offset: u32, length: u32) -> Result<Vec<u8>> {
    if offset > MAX_U24 {
        return Err(EncodingError::OffsetOutOfRange {
            offset: offset as usize,
        }
        .into());
    }
    if length > MAX_U24 {
        return Err(EncodingError::PayloadTooLong {
            len: length as usize,
        }
        .into());
    }

    let mut buf = Vec::with_capacity(7);
    buf.push(file.as_u8());
    buf.extend_from_slice(&le_u24(offset));
    buf.extend_from_slice(&le_u24(length));
    Ok(buf)
}
