// libnpscard/src/protocol/commands/mod.rs

//! Native DESFire commands and their body encoders.

pub mod application;
pub mod file;
pub mod read;
pub mod write;

pub use application::{encode_create_application, encode_select_application};
pub use file::{encode_create_std_data_file, encode_get_file_settings};
pub use read::encode_read;
pub use write::encode_write;

use crate::constants::ins;
use crate::types::{
    AccessRights, Aid, AppSettings, CommMode, FileNumber, IsoDf, IsoFileId, KeySettings,
};
use crate::Result;

/// High-level native DESFire command. New commands should be added here and
/// their body encoder placed in `protocol::commands::<name>.rs`.
#[derive(Debug, Clone)]
pub enum Command {
    /// Select the PICC or an application.
    SelectApplication {
        /// Application to select; [`Aid::PICC`] for the card level.
        aid: Aid,
    },
    /// Legacy (native DES) authentication, first pass.
    Authenticate {
        /// Key to authenticate with.
        key_number: u8,
    },
    /// Continuation frame (0xAF) carrying optional data.
    AdditionalFrame {
        /// Data of this frame.
        data: Vec<u8>,
    },
    /// Create an application under the PICC.
    CreateApplication {
        /// New application.
        aid: Aid,
        /// Master key settings.
        key_settings: KeySettings,
        /// Key cipher and ISO file identifier support.
        app_settings: AppSettings,
        /// Number of application keys.
        key_count: u8,
        /// ISO DF identity, for applications reachable by ISO SELECT.
        iso_df: Option<IsoDf>,
    },
    /// List the applications on the card.
    GetApplicationIds,
    /// List the files of the selected application.
    GetFileIds,
    /// Create a standard data file in the selected application.
    CreateStdDataFile {
        /// File number.
        file: FileNumber,
        /// ISO file identifier, when the application uses them.
        iso_file_id: Option<IsoFileId>,
        /// Communication mode.
        comm_mode: CommMode,
        /// Access rights.
        access_rights: AccessRights,
        /// Size in bytes.
        size: u32,
    },
    /// Query the settings of a file.
    GetFileSettings {
        /// File to query.
        file: FileNumber,
    },
    /// Read from a data file.
    ReadData {
        /// File to read.
        file: FileNumber,
        /// First byte.
        offset: u32,
        /// Bytes to read; zero reads to the end of the file.
        length: u32,
    },
    /// Write to a data file.
    WriteData {
        /// File to write.
        file: FileNumber,
        /// First byte.
        offset: u32,
        /// Bytes to write.
        data: Vec<u8>,
    },
    /// Delete every application on the card.
    FormatPicc,
    /// Query the free EEPROM.
    FreeMemory,
}

impl Command {
    /// Return the native instruction byte.
    pub fn ins(&self) -> u8 {
        match self {
            Self::SelectApplication { .. } => ins::SELECT_APPLICATION,
            Self::Authenticate { .. } => ins::AUTHENTICATE_LEGACY,
            Self::AdditionalFrame { .. } => ins::ADDITIONAL_FRAME,
            Self::CreateApplication { .. } => ins::CREATE_APPLICATION,
            Self::GetApplicationIds => ins::GET_APPLICATION_IDS,
            Self::GetFileIds => ins::GET_FILE_IDS,
            Self::CreateStdDataFile { .. } => ins::CREATE_STD_DATA_FILE,
            Self::GetFileSettings { .. } => ins::GET_FILE_SETTINGS,
            Self::ReadData { .. } => ins::READ_DATA,
            Self::WriteData { .. } => ins::WRITE_DATA,
            Self::FormatPicc => ins::FORMAT_PICC,
            Self::FreeMemory => ins::FREE_MEMORY,
        }
    }

    /// Whether a `0xDE` (duplicate) status counts as success.
    pub fn tolerates_duplicate(&self) -> bool {
        matches!(
            self,
            Self::CreateApplication { .. } | Self::CreateStdDataFile { .. }
        )
    }

    /// Encode the command body (everything after Lc).
    pub fn encode(&self) -> Result<Vec<u8>> {
        match self {
            Self::SelectApplication { aid } => Ok(encode_select_application(*aid)),
            Self::Authenticate { key_number } => Ok(vec![*key_number]),
            Self::AdditionalFrame { data } => Ok(data.clone()),
            Self::CreateApplication {
                aid,
                key_settings,
                app_settings,
                key_count,
                iso_df,
            } => encode_create_application(
                *aid,
                *key_settings,
                *app_settings,
                *key_count,
                iso_df.as_ref(),
            ),
            Self::GetApplicationIds | Self::GetFileIds | Self::FormatPicc | Self::FreeMemory => {
                Ok(Vec::new())
            }
            Self::CreateStdDataFile {
                file,
                iso_file_id,
                comm_mode,
                access_rights,
                size,
            } => encode_create_std_data_file(*file, *iso_file_id, *comm_mode, *access_rights, *size),
            Self::GetFileSettings { file } => Ok(encode_get_file_settings(*file)),
            Self::ReadData {
                file,
                offset,
                length,
            } => encode_read(*file, *offset, *length),
            Self::WriteData { file, offset, data } => encode_write(*file, *offset, data),
        }
    }
}
