// libnpscard/src/types.rs

//! Identifier and settings newtypes shared by the codecs and the session.

use crate::constants;
use crate::{EncodingError, Error, ParseError};
use derive_more::{Display, From, Into};

/// Application identifier (24 bit). Sent little-endian on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, Into)]
#[display(fmt = "{:06X}", _0)]
pub struct Aid(u32);

impl Aid {
    /// The card level (000000).
    pub const PICC: Self = Self(constants::AID_PICC);
    /// NFC Forum Type-4 NDEF application (000001).
    pub const NDEF: Self = Self(constants::AID_NDEF);
    /// Private patient-summary application (665544).
    pub const PRIVATE: Self = Self(constants::AID_PRIVATE);

    /// Build an AID, masking to the low 24 bits.
    pub const fn new(value: u32) -> Self {
        Self(value & constants::MAX_U24)
    }

    /// Numeric value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Whether this addresses the PICC rather than an application.
    pub fn is_picc(&self) -> bool {
        self.0 == constants::AID_PICC
    }

    /// Three-byte wire form.
    pub fn to_le_bytes(&self) -> [u8; 3] {
        let b = self.0.to_le_bytes();
        [b[0], b[1], b[2]]
    }

    /// Parse the three-byte wire form.
    pub fn from_le_bytes(bytes: [u8; 3]) -> Self {
        Self(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]))
    }
}

/// ISO 7816-4 file identifier (e.g. E103 for the capability container).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, Into)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[display(fmt = "{:04X}", _0)]
pub struct IsoFileId(u16);

impl IsoFileId {
    /// Capability container file.
    pub const CC: Self = Self(constants::FID_CC);
    /// NDEF file holding the patient summary.
    pub const NDEF_NPS: Self = Self(constants::FID_NDEF_NPS);
    /// Second NDEF file of the Nato layout.
    pub const NDEF_EXTRA: Self = Self(constants::FID_NDEF_EXTRA);

    /// Wrap a raw file identifier.
    pub const fn new(fid: u16) -> Self {
        Self(fid)
    }

    /// Numeric value.
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Big-endian form, as used inside the CC and by ISO SELECT.
    pub fn to_be_bytes(&self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    /// Little-endian form, as used by native DESFire create commands.
    pub fn to_le_bytes(&self) -> [u8; 2] {
        self.0.to_le_bytes()
    }

    /// Parse the big-endian form.
    pub fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }
}

/// File number within the selected application (0..=14).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Into)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[display(fmt = "{}", _0)]
pub struct FileNumber(u8);

impl FileNumber {
    /// Const constructor for the fixed layout file numbers; values above 14
    /// are rejected by [`FileNumber::try_from`] instead.
    pub(crate) const fn fixed(n: u8) -> Self {
        Self(n)
    }

    /// Numeric value.
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for FileNumber {
    type Error = Error;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        if n > constants::MAX_FILE_NUMBER {
            return Err(EncodingError::InvalidFileNumber(n).into());
        }
        Ok(Self(n))
    }
}

/// Communication mode of a file.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommMode {
    /// No protection.
    #[display(fmt = "plain")]
    Plain = 0x00,
    /// Plain data with a MAC.
    #[display(fmt = "maced")]
    Maced = 0x01,
    /// Fully enciphered.
    #[display(fmt = "enciphered")]
    Enciphered = 0x03,
}

impl CommMode {
    /// Decode the low two bits of a settings byte; `0x02` reads as plain.
    pub fn from_byte(b: u8) -> Self {
        match b & 0x03 {
            0x01 => Self::Maced,
            0x03 => Self::Enciphered,
            _ => Self::Plain,
        }
    }
}

/// DESFire access rights: one key number per access condition.
///
/// `0x0..=0xD` names a key, [`AccessRights::KEY_FREE`] grants access
/// without authentication and [`AccessRights::KEY_NEVER`] denies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessRights {
    /// Key for reading.
    pub read: u8,
    /// Key for writing.
    pub write: u8,
    /// Key that grants both reading and writing.
    pub read_write: u8,
    /// Key for changing these rights.
    pub change: u8,
}

impl AccessRights {
    /// Access without authentication.
    pub const KEY_FREE: u8 = 0xE;
    /// No access.
    pub const KEY_NEVER: u8 = 0xF;

    /// Rights from four key numbers; only the low nibble of each is kept.
    pub const fn new(read: u8, write: u8, read_write: u8, change: u8) -> Self {
        Self {
            read: read & 0x0F,
            write: write & 0x0F,
            read_write: read_write & 0x0F,
            change: change & 0x0F,
        }
    }

    /// Everything free except changing the access rights (key 0).
    pub const fn free() -> Self {
        Self::new(Self::KEY_FREE, Self::KEY_FREE, Self::KEY_FREE, 0x0)
    }

    /// Wire form: `[(RW << 4) | Change, (Read << 4) | Write]`.
    pub fn to_le_bytes(&self) -> [u8; 2] {
        [
            (self.read_write << 4) | self.change,
            (self.read << 4) | self.write,
        ]
    }

    /// Parse the wire form produced by [`AccessRights::to_le_bytes`].
    pub fn from_le_bytes(bytes: [u8; 2]) -> Self {
        Self::new(bytes[1] >> 4, bytes[1] & 0x0F, bytes[0] >> 4, bytes[0] & 0x0F)
    }

    /// Whether reading is allowed for `key` (`None` = unauthenticated).
    pub fn allows_read(&self, key: Option<u8>) -> bool {
        Self::grants(self.read, key) || Self::grants(self.read_write, key)
    }

    /// Whether writing is allowed for `key`.
    pub fn allows_write(&self, key: Option<u8>) -> bool {
        Self::grants(self.write, key) || Self::grants(self.read_write, key)
    }

    fn grants(slot: u8, key: Option<u8>) -> bool {
        match slot {
            Self::KEY_FREE => true,
            Self::KEY_NEVER => false,
            k => key == Some(k),
        }
    }
}

/// Application master key settings byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, From, Into)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeySettings(u8);

impl KeySettings {
    /// Master key changeable, free directory listing, free create/delete,
    /// configuration changeable.
    pub const DEFAULT: Self = Self(0x0F);

    /// Raw settings byte.
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

/// Crypto method and ISO flag combined with the key count in the second
/// key-settings byte of CreateApplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AppSettings {
    /// Files of the application carry ISO file identifiers.
    pub iso_file_ids: bool,
    /// Cipher of the application keys.
    pub crypto: KeyCrypto,
}

impl AppSettings {
    /// DES keys, no ISO file identifiers.
    pub const fn des() -> Self {
        Self {
            iso_file_ids: false,
            crypto: KeyCrypto::Des,
        }
    }

    /// DES keys with ISO file identifiers, as the NDEF application needs.
    pub const fn des_iso() -> Self {
        Self {
            iso_file_ids: true,
            crypto: KeyCrypto::Des,
        }
    }

    /// Second key-settings byte for `key_count` keys.
    pub fn encode(&self, key_count: u8) -> u8 {
        let mut b = (self.crypto as u8) | (key_count & 0x0F);
        if self.iso_file_ids {
            b |= 0x20;
        }
        b
    }
}

/// Cipher of an application's keys.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyCrypto {
    /// DES or 2K3DES.
    Des = 0x00,
    /// 3K3DES.
    TripleDes3K = 0x40,
    /// AES-128.
    Aes = 0x80,
}

/// ISO DF identification attached to an application at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoDf {
    /// File identifier of the DF.
    pub fid: IsoFileId,
    /// DF name used by ISO SELECT by name.
    pub name: Vec<u8>,
}

impl IsoDf {
    /// The NFC Forum Type-4 NDEF application DF (E110, D2760000850101).
    pub fn ndef() -> Self {
        Self {
            fid: IsoFileId::new(constants::NDEF_DF_FID),
            name: constants::NDEF_DF_NAME.to_vec(),
        }
    }
}

/// 8-byte single-DES key.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DesKey([u8; 8]);

impl DesKey {
    /// The factory default all-zero key.
    pub const DEFAULT: Self = Self([0u8; 8]);

    /// Key from its eight bytes.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl std::fmt::Debug for DesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DesKey(..)")
    }
}

impl TryFrom<&[u8]> for DesKey {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 8] = bytes.try_into().map_err(|_| ParseError::Truncated {
            expected: 8,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }
}

/// DESFire file type as reported by GetFileSettings.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Standard data file.
    StandardData = 0x00,
    /// Backup data file.
    BackupData = 0x01,
    /// Value file.
    Value = 0x02,
    /// Linear record file.
    LinearRecord = 0x03,
    /// Cyclic record file.
    CyclicRecord = 0x04,
}

impl FileType {
    /// Decode a file type byte.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x00 => Some(Self::StandardData),
            0x01 => Some(Self::BackupData),
            0x02 => Some(Self::Value),
            0x03 => Some(Self::LinearRecord),
            0x04 => Some(Self::CyclicRecord),
            _ => None,
        }
    }
}

/// Settings of a data file as returned by GetFileSettings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSettings {
    /// Kind of file.
    pub file_type: FileType,
    /// Communication mode.
    pub comm_mode: CommMode,
    /// Access rights.
    pub access_rights: AccessRights,
    /// Declared size in bytes.
    pub size: u32,
}
