// libnpscard/src/protocol/responses/picc.rs

//! Card-level responses.

use crate::protocol::parser;
use crate::types::{Aid, FileNumber};
use crate::{ProtocolError, Result};

/// Decode FreeMemory response payload: `free_bytes(3, LE)`
pub fn decode_free_memory(data: &[u8]) -> Result<u32> {
    if data.len() != 3 {
        return Err(ProtocolError::UnexpectedLength {
            expected: 3,
            actual: data.len(),
        }
        .into());
    }
    parser::le_u24_at(data, 0)
}

/// Decode the concatenated GetApplicationIds payload: `aid(3, LE) * N`
pub fn decode_application_ids(data: &[u8]) -> Result<Vec<Aid>> {
    if data.len() % 3 != 0 {
        return Err(ProtocolError::UnexpectedLength {
            expected: data.len() - data.len() % 3,
            actual: data.len(),
        }
        .into());
    }
    Ok(data
        .chunks_exact(3)
        .map(|c| Aid::from_le_bytes([c[0], c[1], c[2]]))
        .collect())
}

/// Decode GetFileIds payload: one byte per file number.
pub fn decode_file_ids(data: &[u8]) -> Result<Vec<FileNumber>> {
    data.iter().map(|&b| FileNumber::try_from(b)).collect()
}
