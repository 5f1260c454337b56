// libnpscard/src/constants.rs
//! Protocol constants shared across the crate: DESFire native command
//! codes, ISO 7816-4 wrapping bytes, well-known application/file
//! identifiers and the NFC Forum Type-4 capability container values.

/// CLA byte used when wrapping native DESFire commands in ISO 7816-4 APDUs.
pub const DESFIRE_CLA: u8 = 0x90;

/// SW1 returned by the card for every ISO-wrapped native command.
pub const DESFIRE_SW1: u8 = 0x91;

/// Maximum length of a command body (Lc is a single byte).
pub const MAX_COMMAND_BODY_LEN: usize = 255;

/// DESFire native instruction codes.
pub mod ins {
    /// Legacy DES authentication.
    pub const AUTHENTICATE_LEGACY: u8 = 0x0A;
    /// SELECT APPLICATION.
    pub const SELECT_APPLICATION: u8 = 0x5A;
    /// CREATE APPLICATION.
    pub const CREATE_APPLICATION: u8 = 0xCA;
    /// GET APPLICATION IDS.
    pub const GET_APPLICATION_IDS: u8 = 0x6A;
    /// GET FILE IDS.
    pub const GET_FILE_IDS: u8 = 0x6F;
    /// GET FILE SETTINGS.
    pub const GET_FILE_SETTINGS: u8 = 0xF5;
    /// CREATE STANDARD DATA FILE.
    pub const CREATE_STD_DATA_FILE: u8 = 0xCD;
    /// READ DATA.
    pub const READ_DATA: u8 = 0xBD;
    /// WRITE DATA.
    pub const WRITE_DATA: u8 = 0x3D;
    /// FORMAT PICC. Deletes every application.
    pub const FORMAT_PICC: u8 = 0xFC;
    /// FREE MEMORY.
    pub const FREE_MEMORY: u8 = 0x6E;
    /// Continue a multi-frame exchange.
    pub const ADDITIONAL_FRAME: u8 = 0xAF;
}

/// ISO 7816-4 instructions used by the Type-4 NDEF writer.
pub mod iso {
    /// Interindustry class byte.
    pub const CLA: u8 = 0x00;
    /// SELECT.
    pub const SELECT: u8 = 0xA4;
    /// READ BINARY.
    pub const READ_BINARY: u8 = 0xB0;
    /// UPDATE BINARY.
    pub const UPDATE_BINARY: u8 = 0xD6;

    /// P1 for SELECT by DF name.
    pub const SELECT_BY_NAME: u8 = 0x04;
    /// P1 for SELECT by file identifier.
    pub const SELECT_BY_FID: u8 = 0x00;
    /// P2: first or only occurrence, no FCI returned.
    pub const SELECT_NO_FCI: u8 = 0x0C;

    /// Normal completion.
    pub const SW_OK: (u8, u8) = (0x90, 0x00);
}

/// PICC master application. AIDs are sent little-endian on the wire.
pub const AID_PICC: u32 = 0x00_0000;

/// NFC Forum NDEF application.
pub const AID_NDEF: u32 = 0x00_0001;

/// Private patient-summary application.
pub const AID_PRIVATE: u32 = 0x66_5544;

/// ISO DF name of the NFC Forum Type-4 NDEF application.
pub const NDEF_DF_NAME: [u8; 7] = [0xD2, 0x76, 0x00, 0x00, 0x85, 0x01, 0x01];

/// ISO FID of the NDEF application DF.
pub const NDEF_DF_FID: u16 = 0xE110;

/// ISO FID of the capability container file.
pub const FID_CC: u16 = 0xE103;
/// ISO FID of the NDEF file holding the patient summary.
pub const FID_NDEF_NPS: u16 = 0xE104;
/// ISO FID of the second NDEF file (Nato layout).
pub const FID_NDEF_EXTRA: u16 = 0xE105;

/// Type-4 mapping version 2.0.
pub const CC_MAPPING_VERSION: u8 = 0x20;
/// Maximum R-APDU data size announced in the CC.
pub const CC_MLE: u16 = 0x003B;
/// Maximum C-APDU data size announced in the CC.
pub const CC_MLC: u16 = 0x0034;
/// CCLEN, mapping version, MLe and MLc.
pub const CC_HEADER_LEN: usize = 7;
/// One NDEF file control TLV, tag and length included.
pub const CC_TLV_LEN: usize = 8;
/// Tag of an NDEF file control TLV.
pub const CC_TLV_TAG_NDEF_FILE: u8 = 0x04;
/// Value length of an NDEF file control TLV.
pub const CC_TLV_VALUE_LEN: u8 = 0x06;

/// Card-side size of the CC file with one file control TLV.
pub const CC_FILE_SIZE_ONE_TLV: u32 = 23;
/// Card-side size of the CC file with two file control TLVs.
pub const CC_FILE_SIZE_TWO_TLV: u32 = 32;

/// Type-4 access byte meaning "no restriction".
pub const CC_ACCESS_FREE: u8 = 0x00;
/// Type-4 access byte meaning "no access" (read-only when used for write).
pub const CC_ACCESS_NONE: u8 = 0xFF;

/// NDEF TNF for RFC 2046 media types.
pub const TNF_MEDIA_TYPE: u8 = 0x02;

/// Length of the big-endian NLEN prefix of a Type-4 NDEF file.
pub const NLEN_SIZE: usize = 2;

/// Length of the little-endian length prefix of a raw (Pure layout) file.
pub const RAW_LENGTH_SIZE: usize = 3;

/// Bytes of data per WriteData command; keeps each frame within the
/// 64-byte PICC buffer once the 7-byte header and wrapping are added.
pub const WRITE_CHUNK_SIZE: usize = 52;

/// Headroom added to a required NDEF file size before alignment.
pub const CAPACITY_HEADROOM: u32 = 16;

/// Alignment applied to planned file capacities.
pub const CAPACITY_ALIGNMENT: u32 = 64;

/// Smallest capacity the planner will ever request for a data file.
pub const MIN_FILE_CAPACITY: u32 = 128;

/// Largest value of a 3-byte little-endian DESFire size/offset field.
pub const MAX_U24: u32 = 0x00FF_FFFF;

/// Highest file number of a standard DESFire application.
pub const MAX_FILE_NUMBER: u8 = 14;

/// DESFire legacy authentication works on 8-byte challenges.
pub const DES_BLOCK_LEN: usize = 8;
