// libnpscard/src/ndef/cc.rs

//! NFC Forum Type-4 capability container.

use crate::constants::{
    CC_ACCESS_FREE, CC_HEADER_LEN, CC_MAPPING_VERSION, CC_MLC, CC_MLE, CC_TLV_LEN,
    CC_TLV_TAG_NDEF_FILE, CC_TLV_VALUE_LEN,
};
use crate::protocol::parser;
use crate::types::IsoFileId;
use crate::{EncodingError, ParseError, Result};

/// NDEF File Control TLV (`T=04 L=06`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcFileControlTlv {
    /// File described by this TLV.
    pub iso_file_id: IsoFileId,
    /// Size of the file, NLEN included.
    pub max_ndef_size: u16,
    /// Read access condition; `0x00` is free.
    pub read_access: u8,
    /// Write access condition; `0x00` is free.
    pub write_access: u8,
}

impl CcFileControlTlv {
    /// Freely readable and writable NDEF file.
    pub fn open(iso_file_id: IsoFileId, max_ndef_size: u16) -> Self {
        Self {
            iso_file_id,
            max_ndef_size,
            read_access: CC_ACCESS_FREE,
            write_access: CC_ACCESS_FREE,
        }
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(CC_TLV_TAG_NDEF_FILE);
        out.push(CC_TLV_VALUE_LEN);
        out.extend_from_slice(&self.iso_file_id.to_be_bytes());
        out.extend_from_slice(&self.max_ndef_size.to_be_bytes());
        out.push(self.read_access);
        out.push(self.write_access);
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let tag = parser::byte_at(bytes, 0)?;
        let length = parser::byte_at(bytes, 1)?;
        if tag != CC_TLV_TAG_NDEF_FILE || length != CC_TLV_VALUE_LEN {
            return Err(ParseError::InvalidTlv { tag, length }.into());
        }
        Ok(Self {
            iso_file_id: IsoFileId::new(parser::be_u16_at(bytes, 2)?),
            max_ndef_size: parser::be_u16_at(bytes, 4)?,
            read_access: parser::byte_at(bytes, 6)?,
            write_access: parser::byte_at(bytes, 7)?,
        })
    }
}

/// Type-4 Capability Container with one or two NDEF file TLVs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityContainer {
    /// Type-4 mapping version.
    pub mapping_version: u8,
    /// Maximum R-APDU data size.
    pub mle: u16,
    /// Maximum C-APDU data size.
    pub mlc: u16,
    /// NDEF file control TLVs, in card order.
    pub tlvs: Vec<CcFileControlTlv>,
}

impl CapabilityContainer {
    /// CC with the fixed header values this crate writes.
    pub fn new(tlvs: Vec<CcFileControlTlv>) -> Self {
        Self {
            mapping_version: CC_MAPPING_VERSION,
            mle: CC_MLE,
            mlc: CC_MLC,
            tlvs,
        }
    }

    /// CCLEN for `tlv_count` TLVs.
    pub fn encoded_len(tlv_count: usize) -> usize {
        CC_HEADER_LEN + CC_TLV_LEN * tlv_count
    }

    /// TLV describing `fid`.
    pub fn tlv_for(&self, fid: IsoFileId) -> Option<&CcFileControlTlv> {
        self.tlvs.iter().find(|t| t.iso_file_id == fid)
    }

    /// Serialize, CCLEN first. Fails unless there are one or two TLVs.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let n = self.tlvs.len();
        if !(1..=2).contains(&n) {
            return Err(EncodingError::TlvCount(n).into());
        }
        let cclen = Self::encoded_len(n);
        let mut out = Vec::with_capacity(cclen);
        out.extend_from_slice(&(cclen as u16).to_be_bytes());
        out.push(self.mapping_version);
        out.extend_from_slice(&self.mle.to_be_bytes());
        out.extend_from_slice(&self.mlc.to_be_bytes());
        for tlv in &self.tlvs {
            tlv.encode_into(&mut out);
        }
        Ok(out)
    }

    /// Encode and zero-pad to the size of the CC file.
    pub fn encode_padded(&self, file_size: usize) -> Result<Vec<u8>> {
        let mut out = self.encode()?;
        if out.len() > file_size {
            return Err(EncodingError::ContentTooLarge {
                required: out.len(),
                capacity: file_size,
            }
            .into());
        }
        out.resize(file_size, 0x00);
        Ok(out)
    }

    /// Decode a CC; bytes after CCLEN (file padding) are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let cclen = parser::be_u16_at(bytes, 0)? as usize;
        if cclen < Self::encoded_len(1)
            || cclen > bytes.len()
            || (cclen - CC_HEADER_LEN) % CC_TLV_LEN != 0
        {
            return Err(ParseError::InvalidCcLength {
                cclen,
                available: bytes.len(),
            }
            .into());
        }

        let count = (cclen - CC_HEADER_LEN) / CC_TLV_LEN;
        if count > 2 {
            return Err(ParseError::UnsupportedTlvCount(count).into());
        }

        let tlvs = bytes[CC_HEADER_LEN..cclen]
            .chunks_exact(CC_TLV_LEN)
            .map(CcFileControlTlv::decode)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            mapping_version: bytes[2],
            mle: parser::be_u16_at(bytes, 3)?,
            mlc: parser::be_u16_at(bytes, 5)?,
            tlvs,
        })
    }
}
