// libnpscard/src/protocol/commands/file.rs

//! File creation and file settings command bodies.

use crate::constants::MAX_U24;
use crate::protocol::parser::le_u24;
use crate::types::{AccessRights, CommMode, FileNumber, IsoFileId};
use crate::{EncodingError, Result};

/// CreateStdDataFile (0xCD)
/// Layout: file_no(1) [+ iso_fid(2, LE)] + comm_mode(1) + access_rights(2)
///         + file_size(3, LE)
pub fn encode_create_std_data_file(
    file: FileNumber,
    iso_file_id: Option<IsoFileId>,
    comm_mode: CommMode,
    access_rights: AccessRights,
    size: u32,
) -> Result<Vec<u8>> {
    if size > MAX_U24 {
        return Err(EncodingError::ContentTooLarge {
            required: size as usize,
            capacity: MAX_U24 as usize,
        }
        .into());
    }

    let mut buf = Vec::with_capacity(9);
    buf.push(file.as_u8());
    if let Some(fid) = iso_file_id {
        buf.extend_from_slice(&fid.to_le_bytes());
    }
    buf.push(comm_mode as u8);
    buf.extend_from_slice(&access_rights.to_le_bytes());
    buf.extend_from_slice(&le_u24(size));
    Ok(buf)
}

/// GetFileSettings (0xF5): `file_no(1)`
pub fn encode_get_file_settings(file: FileNumber) -> Vec<u8> {
    vec![file.as_u8()]
}
