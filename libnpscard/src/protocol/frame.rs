// libnpscard/src/protocol/frame.rs

//! ISO 7816-4 wrapping of native commands and unwrapping of their responses.

use crate::constants::{DESFIRE_CLA, DESFIRE_SW1, MAX_COMMAND_BODY_LEN};
use crate::protocol::status::DesfireStatus;
use crate::{CardError, EncodingError, ProtocolError, Result};

/// ISO 7816-4 wrapping of native DESFire commands.
///
/// Command: `[0x90] [INS] [0x00] [0x00] [Lc] [body..] [Le=0x00]`.
/// Lc is always present, so a command without data is sent as
/// `90 INS 00 00 00 00`.
/// Response: `[payload..] [0x91] [status]`
pub struct Frame;

/// Decoded response: payload without the trailing status word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFrame {
    /// Response data.
    pub payload: Vec<u8>,
    /// SW2, the DESFire status.
    pub status: u8,
}

impl ResponseFrame {
    /// Decoded status.
    pub fn status(&self) -> DesfireStatus {
        DesfireStatus::from_code(self.status)
    }

    /// Status `0x00`.
    pub fn is_ok(&self) -> bool {
        self.status == DesfireStatus::Ok.code()
    }

    /// Status `0xAF`: the card has more data to send.
    pub fn has_more(&self) -> bool {
        self.status == DesfireStatus::AdditionalFrame.code()
    }
}

impl Frame {
    /// Encode a native instruction and its body into a wrapped command.
    pub fn encode(ins: u8, body: &[u8]) -> Result<Vec<u8>> {
        if body.len() > MAX_COMMAND_BODY_LEN {
            return Err(EncodingError::BodyTooLong {
                len: body.len(),
                max: MAX_COMMAND_BODY_LEN,
            }
            .into());
        }

        let mut out = Vec::with_capacity(4 + 1 + body.len() + 1);
        out.extend_from_slice(&[DESFIRE_CLA, ins, 0x00, 0x00, body.len() as u8]);
        out.extend_from_slice(body);
        out.push(0x00);
        Ok(out)
    }

    /// Split a response into payload and DESFire status.
    ///
    /// A single byte is accepted as a bare native status. Longer responses
    /// must end with `91 xx`; any other status word is an ISO-level
    /// rejection (for example a card that is not a DESFire PICC).
    pub fn decode(response: &[u8]) -> Result<ResponseFrame> {
        let (&last, rest) = response
            .split_last()
            .ok_or(ProtocolError::EmptyResponse)?;

        let Some((&sw1, payload)) = rest.split_last() else {
            return Ok(ResponseFrame {
                payload: Vec::new(),
                status: last,
            });
        };

        if sw1 != DESFIRE_SW1 {
            return Err(CardError::IsoStatus { sw1, sw2: last }.into());
        }

        Ok(ResponseFrame {
            payload: payload.to_vec(),
            status: last,
        })
    }
}
