// libnpscard/src/protocol/responses/settings.rs

//! File settings response.

use crate::protocol::parser;
use crate::types::{AccessRights, CommMode, FileSettings, FileType};
use crate::{ProtocolError, Result};

/// Decode GetFileSettings response payload for data files.
/// Layout: file_type(1) + comm_mode(1) + access_rights(2) + file_size(3, LE)
pub fn decode_file_settings(data: &[u8]) -> Result<FileSettings> {
    const MIN_LEN: usize = 1 + 1 + 2 + 3;
    if data.len() < MIN_LEN {
        return Err(ProtocolError::UnexpectedLength {
            expected: MIN_LEN,
            actual: data.len(),
        }
        .into());
    }

    let file_type = FileType::from_byte(data[0]).ok_or(ProtocolError::UnknownFileType(data[0]))?;
    let comm_mode = CommMode::from_byte(data[1]);
    let access_rights = AccessRights::from_le_bytes([data[2], data[3]]);
    let size = parser::le_u24_at(data, 4)?;

    Ok(FileSettings {
        file_type,
        comm_mode,
        access_rights,
        size,
    })
}
