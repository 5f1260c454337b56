// libnpscard/src/layout/config.rs

//! Layout configuration: keys, file definitions and sizing policy.

use crate::constants::{
    CAPACITY_ALIGNMENT, CAPACITY_HEADROOM, FID_CC, FID_NDEF_EXTRA, FID_NDEF_NPS, MIN_FILE_CAPACITY,
};
use crate::types::{AccessRights, CommMode, DesKey, FileNumber, IsoFileId, KeySettings};
use crate::utils::DEFAULT_TRANSCEIVE_TIMEOUT_MS;

/// Media type used for NDEF records when a payload carries none.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// How one standard data file of a layout is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileSpec {
    /// DESFire file number.
    pub number: FileNumber,
    /// ISO file identifier, for files in an ISO-enabled application.
    pub iso_file_id: Option<IsoFileId>,
    /// Communication mode.
    pub comm_mode: CommMode,
    /// Access rights given at creation.
    pub access_rights: AccessRights,
}

impl FileSpec {
    /// A plain-communication file.
    pub const fn plain(number: u8, iso_file_id: Option<IsoFileId>, access_rights: AccessRights) -> Self {
        Self {
            number: FileNumber::fixed(number),
            iso_file_id,
            comm_mode: CommMode::Plain,
            access_rights,
        }
    }
}

/// Files of the Pure layout (application 665544, raw bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PureFiles {
    /// File 0: the patient summary.
    pub historic: FileSpec,
    /// File 1: the extra payload.
    pub current: FileSpec,
}

/// Files of the Dual layout: CC and NDEF file in the NDEF application,
/// the bare-record file in the private application.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DualFiles {
    /// Capability container.
    pub cc: FileSpec,
    /// NDEF file with the patient summary.
    pub ndef: FileSpec,
    /// Bare MIME record with the extra payload.
    pub private: FileSpec,
}

/// Files of the Nato layout, all in the NDEF application.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NatoFiles {
    /// Capability container listing both NDEF files.
    pub cc: FileSpec,
    /// NDEF file with the patient summary.
    pub nps: FileSpec,
    /// NDEF file with the extra payload.
    pub extra: FileSpec,
}

/// Runtime configuration shared by all layouts.
///
/// The DESFire access rights of every file are part of the configuration.
/// Defaults keep payload files freely readable and writable and protect
/// the capability container with the application master key.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutConfig {
    /// PICC master key.
    pub picc_key: DesKey,
    /// Master key given to created applications.
    pub app_key: DesKey,
    /// Key settings of created applications.
    pub key_settings: KeySettings,
    /// Per-exchange timeout.
    pub timeout_ms: u32,
    /// Bytes added on top of the content when sizing a new file.
    pub headroom: u32,
    /// New file sizes are rounded up to a multiple of this.
    pub alignment: u32,
    /// Smallest file that is ever created.
    pub min_capacity: u32,
    /// Media type for payloads that carry none.
    pub default_mime_type: String,
    /// Pure layout files.
    pub pure: PureFiles,
    /// Dual layout files.
    pub dual: DualFiles,
    /// Nato layout files.
    pub nato: NatoFiles,
}

impl LayoutConfig {
    /// The media type to record for `mime_type`.
    pub fn mime_type<'a>(&'a self, mime_type: Option<&'a str>) -> &'a str {
        mime_type.unwrap_or(&self.default_mime_type)
    }
}

const CC_RIGHTS: AccessRights = AccessRights::new(AccessRights::KEY_FREE, 0x0, 0x0, 0x0);

impl Default for LayoutConfig {
    fn default() -> Self {
        let free = AccessRights::free();
        Self {
            picc_key: DesKey::DEFAULT,
            app_key: DesKey::DEFAULT,
            key_settings: KeySettings::DEFAULT,
            timeout_ms: DEFAULT_TRANSCEIVE_TIMEOUT_MS,
            headroom: CAPACITY_HEADROOM,
            alignment: CAPACITY_ALIGNMENT,
            min_capacity: MIN_FILE_CAPACITY,
            default_mime_type: DEFAULT_MIME_TYPE.to_string(),
            pure: PureFiles {
                historic: FileSpec::plain(1, None, free),
                current: FileSpec::plain(2, None, free),
            },
            dual: DualFiles {
                cc: FileSpec::plain(1, Some(IsoFileId::new(FID_CC)), CC_RIGHTS),
                ndef: FileSpec::plain(2, Some(IsoFileId::new(FID_NDEF_NPS)), free),
                private: FileSpec::plain(1, None, free),
            },
            nato: NatoFiles {
                cc: FileSpec::plain(1, Some(IsoFileId::new(FID_CC)), CC_RIGHTS),
                nps: FileSpec::plain(2, Some(IsoFileId::new(FID_NDEF_NPS)), free),
                extra: FileSpec::plain(3, Some(IsoFileId::new(FID_NDEF_EXTRA)), free),
            },
        }
    }
}
