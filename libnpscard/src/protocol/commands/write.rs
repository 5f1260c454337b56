// libnpscard/src/protocol/commands/write.rs

//! WRITE DATA command body.

use crate::constants::{MAX_COMMAND_BODY_LEN, MAX_U24};
use crate::protocol::parser::le_u24;
use crate::types::FileNumber;
use crate::{EncodingError, Result};

/// Header bytes preceding the data of a WriteData command.
pub const WRITE_HEADER_LEN: usize = 7;

/// Encode WriteData command body (DESFire command code 0x3D)
/// Layout: file_no(1) + offset(3, LE) + length(3, LE) + data(N)
///
/// The whole body has to fit a single frame; callers split larger
/// content into several writes at increasing offsets.
pub fn encode_write(file: FileNumber, offset: u32, data: &[u8]) -> Result<Vec<u8>> {
    let end = (offset as usize).saturating_add(data.len());
    if offset > MAX_U24 || end > MAX_U24 as usize {
        return Err(EncodingError::OffsetOutOfRange {
            offset: offset as usize,
        }
        .into());
    }
    if WRITE_HEADER_LEN + data.len() > MAX_COMMAND_BODY_LEN {
        return Err(EncodingError::BodyTooLong {
            len: WRITE_HEADER_LEN + data.len(),
            max: MAX_COMMAND_BODY_LEN,
        }
        .into());
    }

    let mut buf = Vec::with_capacity(WRITE_HEADER_LEN + data.len());
    buf.push(file.as_u8());
    buf.extend_from_slice(&le_u24(offset));
    buf.extend_from_slice(&le_u24(data.len() as u32));
    buf.extend_from_slice(data);
    Ok(buf)
}
