// libnpscard/src/ndef/record.rs

//! Single MIME media records.

use crate::constants::TNF_MEDIA_TYPE;
use crate::protocol::parser;
use crate::{EncodingError, ParseError, Result};

const FLAG_MB: u8 = 0x80;
const FLAG_ME: u8 = 0x40;
const FLAG_CF: u8 = 0x20;
const FLAG_SR: u8 = 0x10;
const FLAG_IL: u8 = 0x08;
const TNF_MASK: u8 = 0x07;

/// Payloads shorter than this are encoded as short records.
pub const SHORT_RECORD_LIMIT: usize = 256;

/// A decoded NDEF record borrowing type and payload from the source bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NdefRecord<'a> {
    /// MB flag.
    pub message_begin: bool,
    /// ME flag.
    pub message_end: bool,
    /// SR flag.
    pub short_record: bool,
    /// TNF, the low three bits of the header.
    pub type_name_format: u8,
    /// Record type.
    pub type_field: &'a [u8],
    /// Record payload.
    pub payload: &'a [u8],
}

impl<'a> NdefRecord<'a> {
    /// Media type as text. The type field of a TNF 0x02 record is ASCII.
    pub fn mime_type(&self) -> Result<&'a str> {
        if !self.type_field.is_ascii() {
            return Err(ParseError::InvalidMimeType.into());
        }
        std::str::from_utf8(self.type_field).map_err(|_| ParseError::InvalidMimeType.into())
    }

    /// Encoded size of this record as produced by [`encode_mime_record`].
    pub fn encoded_len(&self) -> usize {
        encoded_mime_record_len(self.type_field.len(), self.payload.len())
    }
}

/// Size of a single MIME record with the given type and payload lengths.
pub fn encoded_mime_record_len(type_len: usize, payload_len: usize) -> usize {
    let length_field = if payload_len < SHORT_RECORD_LIMIT { 1 } else { 4 };
    1 + 1 + length_field + type_len + payload_len
}

/// Build a single-record NDEF message (MB=1, ME=1, TNF=media type).
///
/// Payloads below 256 bytes use the short form with a one-byte length,
/// larger ones the normal form with a four-byte big-endian length. No ID
/// field is emitted.
pub fn encode_mime_record(mime_type: &str, payload: &[u8]) -> Result<Vec<u8>> {
    if !mime_type.is_ascii() {
        return Err(ParseError::InvalidMimeType.into());
    }
    let type_field = mime_type.as_bytes();
    if type_field.len() > u8::MAX as usize {
        return Err(EncodingError::TypeTooLong {
            len: type_field.len(),
        }
        .into());
    }
    if payload.len() > u32::MAX as usize {
        return Err(EncodingError::PayloadTooLong { len: payload.len() }.into());
    }

    let short = payload.len() < SHORT_RECORD_LIMIT;
    let mut header = FLAG_MB | FLAG_ME | TNF_MEDIA_TYPE;
    if short {
        header |= FLAG_SR;
    }

    let mut out = Vec::with_capacity(encoded_mime_record_len(type_field.len(), payload.len()));
    out.push(header);
    out.push(type_field.len() as u8);
    if short {
        out.push(payload.len() as u8);
    } else {
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    }
    out.extend_from_slice(type_field);
    out.extend_from_slice(payload);
    Ok(out)
}

/// Decode the first record of an NDEF message, which must be a media-type
/// record starting the message. Bytes after the first record are ignored.
pub fn decode_mime_record(bytes: &[u8]) -> Result<NdefRecord<'_>> {
    let header = parser::byte_at(bytes, 0)?;
    let tnf = header & TNF_MASK;
    if tnf != TNF_MEDIA_TYPE {
        return Err(ParseError::WrongTnf { tnf }.into());
    }
    if header & FLAG_CF != 0 {
        return Err(ParseError::ChunkedRecord.into());
    }
    if header & FLAG_MB == 0 {
        return Err(ParseError::NotSingleRecord.into());
    }

    let short = header & FLAG_SR != 0;
    let has_id = header & FLAG_IL != 0;
    let type_len = parser::byte_at(bytes, 1)? as usize;

    let (payload_len, mut idx) = if short {
        (parser::byte_at(bytes, 2)? as usize, 3)
    } else {
        let len = parser::be_u32_at(bytes, 2)? as usize;
        if len < SHORT_RECORD_LIMIT {
            // Payloads this small are always written in short form.
            return Err(ParseError::NotShortRecord.into());
        }
        (len, 6)
    };

    let id_len = if has_id {
        let l = parser::byte_at(bytes, idx)? as usize;
        idx += 1;
        l
    } else {
        0
    };

    let type_field = parser::slice_at(bytes, idx, type_len)?;
    idx += type_len + id_len;
    let payload = parser::slice_at(bytes, idx, payload_len)?;

    Ok(NdefRecord {
        message_begin: true,
        message_end: header & FLAG_ME != 0,
        short_record: short,
        type_name_format: tnf,
        type_field,
        payload,
    })
}
