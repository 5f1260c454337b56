// libnpscard/src/protocol/commands/application.rs

//! Application-level command bodies.

use crate::types::{Aid, AppSettings, IsoDf, KeySettings};
use crate::{EncodingError, Result};

/// Longest ISO DF name accepted by CreateApplication.
const MAX_DF_NAME_LEN: usize = 16;

/// SelectApplication (0x5A): `aid(3, LE)`
pub fn encode_select_application(aid: Aid) -> Vec<u8> {
    aid.to_le_bytes().to_vec()
}

/// CreateApplication (0xCA)
/// Layout: aid(3, LE) + key_settings(1) + (app_settings | key_count)(1)
///         [+ iso_fid(2, LE) + df_name(1..16)]
pub fn encode_create_application(
    aid: Aid,
    key_settings: KeySettings,
    app_settings: AppSettings,
    key_count: u8,
    iso_df: Option<&IsoDf>,
) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(5 + 2 + MAX_DF_NAME_LEN);
    buf.extend_from_slice(&aid.to_le_bytes());
    buf.push(key_settings.as_u8());

    match iso_df {
        Some(df) => {
            if df.name.is_empty() || df.name.len() > MAX_DF_NAME_LEN {
                return Err(EncodingError::BodyTooLong {
                    len: df.name.len(),
                    max: MAX_DF_NAME_LEN,
                }
                .into());
            }
            let settings = AppSettings {
                iso_file_ids: true,
                ..app_settings
            };
            buf.push(settings.encode(key_count));
            buf.extend_from_slice(&df.fid.to_le_bytes());
            buf.extend_from_slice(&df.name);
        }
        None => buf.push(app_settings.encode(key_count)),
    }

    Ok(buf)
}
