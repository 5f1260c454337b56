// libnpscard/src/ndef/writer.rs

//! Writing NDEF messages into Type-4 tags.

use crate::constants::{NDEF_DF_NAME, NLEN_SIZE, WRITE_CHUNK_SIZE, iso};
use crate::transport::CardChannel;
use crate::types::IsoFileId;
use crate::utils::{DEFAULT_TRANSCEIVE_TIMEOUT_MS, bytes_to_hex_spaced};
use crate::{CardError, EncodingError, ProtocolError, Result};
use log::trace;

/// Largest offset UPDATE BINARY can address with P1/P2.
const MAX_ISO_OFFSET: usize = 0x7FFF;

/// Writes one NDEF message into the Type-4 NDEF file of a tag.
///
/// Hosts with their own NDEF stack implement this on top of it; the crate
/// ships [`IsoType4Writer`], which talks ISO 7816-4 over the card channel.
pub trait Type4NdefWriter {
    /// Replace the content of the NDEF file with `message`.
    fn write_ndef_message(&mut self, channel: &mut dyn CardChannel, message: &[u8]) -> Result<()>;
}

/// Type-4 writer using SELECT and UPDATE BINARY.
///
/// NLEN is cleared before the message body is written and set last, so an
/// interrupted write leaves an empty (NLEN = 0) file rather than a torn
/// message.
#[derive(Debug, Clone)]
pub struct IsoType4Writer {
    file_id: IsoFileId,
    df_name: Vec<u8>,
    timeout_ms: u32,
}

impl Default for IsoType4Writer {
    fn default() -> Self {
        Self::new(IsoFileId::NDEF_NPS)
    }
}

impl IsoType4Writer {
    /// Writer for the NDEF file `file_id` of the NFC Forum application.
    pub fn new(file_id: IsoFileId) -> Self {
        Self {
            file_id,
            df_name: NDEF_DF_NAME.to_vec(),
            timeout_ms: DEFAULT_TRANSCEIVE_TIMEOUT_MS,
        }
    }

    /// Set the timeout of each APDU.
    pub fn with_timeout(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn transmit(&self, channel: &mut dyn CardChannel, apdu: &[u8]) -> Result<()> {
        trace!("iso > {}", bytes_to_hex_spaced(apdu));
        let resp = channel.transceive(apdu, self.timeout_ms)?;
        trace!("iso < {}", bytes_to_hex_spaced(&resp));
        match resp.as_slice() {
            [] => Err(ProtocolError::EmptyResponse.into()),
            [.., sw1, sw2] if (*sw1, *sw2) == iso::SW_OK => Ok(()),
            [.., sw1, sw2] => Err(CardError::IsoStatus {
                sw1: *sw1,
                sw2: *sw2,
            }
            .into()),
            [_] => Err(ProtocolError::UnexpectedLength {
                expected: 2,
                actual: 1,
            }
            .into()),
        }
    }

    fn update_binary(&self, channel: &mut dyn CardChannel, offset: usize, data: &[u8]) -> Result<()> {
        if offset > MAX_ISO_OFFSET {
            return Err(EncodingError::OffsetOutOfRange { offset }.into());
        }
        let mut apdu = Vec::with_capacity(5 + data.len());
        apdu.extend_from_slice(&[
            iso::CLA,
            iso::UPDATE_BINARY,
            (offset >> 8) as u8,
            offset as u8,
            data.len() as u8,
        ]);
        apdu.extend_from_slice(data);
        self.transmit(channel, &apdu)
    }
}

impl Type4NdefWriter for IsoType4Writer {
    fn write_ndef_message(&mut self, channel: &mut dyn CardChannel, message: &[u8]) -> Result<()> {
        if message.len() > u16::MAX as usize {
            return Err(EncodingError::PayloadTooLong { len: message.len() }.into());
        }

        let mut select_df = vec![
            iso::CLA,
            iso::SELECT,
            iso::SELECT_BY_NAME,
            0x00,
            self.df_name.len() as u8,
        ];
        select_df.extend_from_slice(&self.df_name);
        select_df.push(0x00);
        self.transmit(channel, &select_df)?;

        let mut select_ef = vec![iso::CLA, iso::SELECT, iso::SELECT_BY_FID, iso::SELECT_NO_FCI, 0x02];
        select_ef.extend_from_slice(&self.file_id.to_be_bytes());
        self.transmit(channel, &select_ef)?;

        self.update_binary(channel, 0, &[0x00, 0x00])?;
        for (i, chunk) in message.chunks(WRITE_CHUNK_SIZE).enumerate() {
            self.update_binary(channel, NLEN_SIZE + i * WRITE_CHUNK_SIZE, chunk)?;
        }
        self.update_binary(channel, 0, &(message.len() as u16).to_be_bytes())
    }
}
