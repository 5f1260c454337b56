// libnpscard/src/session/mod.rs

//! Tap-scoped DESFire session.
//!
//! [`Session`] owns the card channel for the duration of one tap and
//! sequences native commands over it. The selection and authentication
//! state the card keeps implicitly is mirrored in [`SessionState`], and
//! every operation checks it first, so a sequence the card would reject
//! (or silently misapply) fails with [`Error::InvalidState`] instead.

pub(crate) mod auth;

use std::collections::HashMap;

use crate::ndef::Type4NdefWriter;
use crate::protocol::{Command, DesfireStatus, ResponseFrame, codec, responses};
use crate::transport::CardChannel;
use crate::types::{
    AccessRights, Aid, AppSettings, CommMode, DesKey, FileNumber, FileSettings, IsoDf, IsoFileId,
    KeySettings,
};
use crate::utils::{DEFAULT_TRANSCEIVE_TIMEOUT_MS, FORMAT_TIMEOUT_MS, TRACE_PREVIEW_LEN, hex_preview};
use crate::{CardError, Error, ProtocolError, Result};
use derive_more::Display;
use log::{debug, info, trace, warn};

/// Upper bound on continuation frames followed for one command.
const MAX_CHAINED_FRAMES: usize = 1024;

/// Where the card's selection and authentication currently stand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SessionState {
    /// Nothing selected yet in this tap, or the selection is unknown.
    #[display(fmt = "disconnected")]
    Disconnected,
    /// The PICC is selected.
    #[display(fmt = "PICC selected")]
    SelectedPicc,
    /// Authenticated with the PICC master key.
    #[display(fmt = "PICC authenticated")]
    AuthenticatedPicc,
    /// An application is selected.
    #[display(fmt = "application {} selected", _0)]
    SelectedApp(Aid),
    /// Authenticated with a key of the selected application.
    #[display(fmt = "application {} authenticated", _0)]
    AuthenticatedApp(Aid),
}

impl SessionState {
    /// Whether the PICC is selected.
    pub fn is_picc_level(&self) -> bool {
        matches!(self, Self::SelectedPicc | Self::AuthenticatedPicc)
    }

    /// The selected application, if an application (not the PICC) is
    /// selected.
    pub fn application(&self) -> Option<Aid> {
        match self {
            Self::SelectedApp(aid) | Self::AuthenticatedApp(aid) => Some(*aid),
            _ => None,
        }
    }
}

/// One tap's exclusive use of a card channel.
pub struct Session<C: CardChannel> {
    channel: C,
    state: SessionState,
    authenticated_key: Option<u8>,
    timeout_ms: u32,
    /// Declared file sizes seen in the selected application.
    file_sizes: HashMap<FileNumber, u32>,
}

impl<C: CardChannel> Session<C> {
    /// Session with the default exchange timeout.
    pub fn new(channel: C) -> Self {
        Self::with_timeout(channel, DEFAULT_TRANSCEIVE_TIMEOUT_MS)
    }

    /// Session with a custom exchange timeout.
    pub fn with_timeout(channel: C, timeout_ms: u32) -> Self {
        Self {
            channel,
            state: SessionState::Disconnected,
            authenticated_key: None,
            timeout_ms,
            file_sizes: HashMap::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Key number of the current authentication, if any.
    pub fn authenticated_key(&self) -> Option<u8> {
        self.authenticated_key
    }

    /// Timeout used for each exchange.
    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// End the tap and hand the channel back.
    pub fn close(self) -> C {
        debug!("session closed in state {}", self.state);
        self.channel
    }

    fn set_state(&mut self, state: SessionState) {
        if state != self.state {
            debug!("session: {} -> {}", self.state, state);
        }
        if state.application() != self.state.application() {
            self.file_sizes.clear();
        }
        if !matches!(
            state,
            SessionState::AuthenticatedPicc | SessionState::AuthenticatedApp(_)
        ) {
            self.authenticated_key = None;
        }
        self.state = state;
    }

    fn require(&self, operation: &'static str, allowed: bool) -> Result<()> {
        if allowed {
            Ok(())
        } else {
            Err(Error::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn require_picc(&self, operation: &'static str) -> Result<()> {
        self.require(operation, self.state.is_picc_level())
    }

    fn require_app(&self, operation: &'static str) -> Result<()> {
        self.require(operation, self.state.application().is_some())
    }

    /// Send one command frame and decode its response frame.
    fn exchange(&mut self, cmd: &Command, timeout_ms: u32) -> Result<ResponseFrame> {
        let frame = codec::encode_command_frame(cmd)?;
        trace!("> {}", hex_preview(&frame, TRACE_PREVIEW_LEN));
        let resp = self.channel.transceive(&frame, timeout_ms)?;
        trace!("< {}", hex_preview(&resp, TRACE_PREVIEW_LEN));
        codec::decode_response_frame(&resp)
    }

    /// Send a command and follow `0xAF` continuations, concatenating the
    /// payloads of all frames.
    fn execute(&mut self, cmd: &Command) -> Result<ResponseFrame> {
        self.execute_with_timeout(cmd, self.timeout_ms)
    }

    fn execute_with_timeout(&mut self, cmd: &Command, timeout_ms: u32) -> Result<ResponseFrame> {
        let mut resp = self.exchange(cmd, timeout_ms)?;
        let mut frames = 1;
        while resp.has_more() {
            if frames >= MAX_CHAINED_FRAMES {
                return Err(ProtocolError::UnexpectedAdditionalFrame.into());
            }
            let next = self.exchange(&Command::AdditionalFrame { data: Vec::new() }, timeout_ms)?;
            resp.payload.extend_from_slice(&next.payload);
            resp.status = next.status;
            frames += 1;
        }
        Ok(resp)
    }

    /// Check the status of a create command, absorbing `0xDE`.
    fn accept_create(&self, cmd: &Command, resp: &ResponseFrame, what: &str) -> Result<()> {
        let status = resp.status();
        if !status.is_success(cmd.tolerates_duplicate()) {
            return Err(CardError::Status {
                command: cmd.ins(),
                status: resp.status,
            }
            .into());
        }
        if !resp.is_ok() {
            warn!("{} already exists, continuing", what);
        }
        Ok(())
    }

    fn expect_ok(&self, cmd: &Command, resp: &ResponseFrame) -> Result<()> {
        if resp.is_ok() {
            Ok(())
        } else {
            Err(CardError::Status {
                command: cmd.ins(),
                status: resp.status,
            }
            .into())
        }
    }

    /// Select the PICC (`Aid::PICC`) or an application. Any previous
    /// authentication is dropped by the card.
    pub fn select_application(&mut self, aid: Aid) -> Result<()> {
        let resp = self.execute(&Command::SelectApplication { aid })?;
        if !resp.is_ok() {
            self.set_state(SessionState::Disconnected);
            return Err(CardError::AppNotFound {
                aid,
                status: resp.status,
            }
            .into());
        }
        self.set_state(if aid.is_picc() {
            SessionState::SelectedPicc
        } else {
            SessionState::SelectedApp(aid)
        });
        Ok(())
    }

    /// Legacy DES authentication against the selected PICC or application.
    pub fn authenticate(&mut self, key: &DesKey, key_number: u8) -> Result<()> {
        let selected = match self.state {
            SessionState::SelectedPicc | SessionState::AuthenticatedPicc => SessionState::SelectedPicc,
            SessionState::SelectedApp(aid) | SessionState::AuthenticatedApp(aid) => {
                SessionState::SelectedApp(aid)
            }
            SessionState::Disconnected => {
                return Err(Error::InvalidState {
                    operation: "authenticate",
                    state: self.state,
                });
            }
        };
        // The card forgets earlier authentication as soon as a new one starts.
        self.set_state(selected);

        let flow = auth::LegacyAuth::new(*key, rand::random());
        let challenge = self.exchange(&Command::Authenticate { key_number }, self.timeout_ms)?;
        if !challenge.has_more() {
            return Err(CardError::AuthFailed {
                key_number,
                status: challenge.status,
            }
            .into());
        }
        let answer = flow.answer_challenge(&challenge.payload)?;
        let proof = self.exchange(
            &Command::AdditionalFrame {
                data: answer.to_vec(),
            },
            self.timeout_ms,
        )?;
        if !proof.is_ok() {
            return Err(CardError::AuthFailed {
                key_number,
                status: proof.status,
            }
            .into());
        }
        if !flow.verify(&proof.payload)? {
            // The card answered, but not with our RndA: it holds another key.
            return Err(CardError::AuthFailed {
                key_number,
                status: DesfireStatus::AuthenticationError.code(),
            }
            .into());
        }

        self.set_state(match selected {
            SessionState::SelectedApp(aid) => SessionState::AuthenticatedApp(aid),
            _ => SessionState::AuthenticatedPicc,
        });
        self.authenticated_key = Some(key_number);
        Ok(())
    }

    /// Create an application; an existing one with the same AID is accepted.
    pub fn create_application(
        &mut self,
        aid: Aid,
        key_settings: KeySettings,
        app_settings: AppSettings,
        key_count: u8,
        iso_df: Option<&IsoDf>,
    ) -> Result<()> {
        self.require_picc("create application")?;
        let cmd = Command::CreateApplication {
            aid,
            key_settings,
            app_settings,
            key_count,
            iso_df: iso_df.cloned(),
        };
        let resp = self.execute(&cmd)?;
        self.accept_create(&cmd, &resp, &format!("application {}", aid))?;
        debug!("application {} ready", aid);
        Ok(())
    }

    /// Create a standard data file in the selected application; an existing
    /// file with the same number is accepted as is (its size is not
    /// changed).
    ///
    /// Returns `true` when the file was created by this call.
    pub fn create_standard_file(
        &mut self,
        file: FileNumber,
        iso_file_id: Option<IsoFileId>,
        comm_mode: CommMode,
        access_rights: AccessRights,
        capacity: u32,
    ) -> Result<bool> {
        self.require_app("create file")?;
        let cmd = Command::CreateStdDataFile {
            file,
            iso_file_id,
            comm_mode,
            access_rights,
            size: capacity,
        };
        let resp = self.execute(&cmd)?;
        self.accept_create(&cmd, &resp, &format!("file {}", file))?;
        let created = resp.is_ok();
        if created {
            self.file_sizes.insert(file, capacity);
        }
        debug!("file {} ready ({} bytes requested)", file, capacity);
        Ok(created)
    }

    /// Settings of `file` in the selected application.
    pub fn file_settings(&mut self, file: FileNumber) -> Result<FileSettings> {
        self.require_app("get file settings")?;
        let cmd = Command::GetFileSettings { file };
        let resp = self.execute(&cmd)?;
        if !resp.is_ok() {
            return Err(CardError::ReadFailed {
                file,
                status: resp.status,
            }
            .into());
        }
        let settings = responses::decode_file_settings(&resp.payload)?;
        self.file_sizes.insert(file, settings.size);
        Ok(settings)
    }

    /// Read `length` bytes at `offset`; a length of zero reads to the end of
    /// the file.
    pub fn read_file(&mut self, file: FileNumber, offset: u32, length: u32) -> Result<Vec<u8>> {
        self.require_app("read file")?;
        let resp = self.execute(&Command::ReadData {
            file,
            offset,
            length,
        })?;
        if !resp.is_ok() {
            return Err(CardError::ReadFailed {
                file,
                status: resp.status,
            }
            .into());
        }
        if length != 0 && resp.payload.len() != length as usize {
            return Err(ProtocolError::UnexpectedLength {
                expected: length as usize,
                actual: resp.payload.len(),
            }
            .into());
        }
        Ok(resp.payload)
    }

    /// Write one frame of data at `offset`.
    ///
    /// Content that would run past the file's declared size is rejected
    /// with [`CardError::PayloadTooLarge`] before anything is sent; the size
    /// is looked up with GetFileSettings unless already known in this
    /// selection.
    pub fn write_file(&mut self, file: FileNumber, offset: u32, data: &[u8]) -> Result<()> {
        self.require_app("write file")?;
        let capacity = match self.file_sizes.get(&file) {
            Some(&size) => size,
            None => self.file_settings(file)?.size,
        };
        let required = offset as u64 + data.len() as u64;
        if required > capacity as u64 {
            return Err(CardError::PayloadTooLarge {
                file,
                required: required.min(u32::MAX as u64) as u32,
                capacity,
            }
            .into());
        }

        let resp = self.execute(&Command::WriteData {
            file,
            offset,
            data: data.to_vec(),
        })?;
        if !resp.is_ok() {
            return Err(CardError::WriteFailed {
                file,
                status: resp.status,
            }
            .into());
        }
        Ok(())
    }

    /// Erase all applications and files. Requires PICC authentication.
    pub fn format_picc(&mut self) -> Result<()> {
        self.require("format PICC", self.state == SessionState::AuthenticatedPicc)?;
        info!("formatting PICC, all applications will be erased");
        let cmd = Command::FormatPicc;
        let resp = self.execute_with_timeout(&cmd, self.timeout_ms.max(FORMAT_TIMEOUT_MS))?;
        self.expect_ok(&cmd, &resp)
    }

    /// Free EEPROM in bytes. Requires the PICC to be selected.
    pub fn free_memory(&mut self) -> Result<u32> {
        self.require_picc("free memory")?;
        let cmd = Command::FreeMemory;
        let resp = self.execute(&cmd)?;
        self.expect_ok(&cmd, &resp)?;
        responses::decode_free_memory(&resp.payload)
    }

    /// Applications on the card.
    pub fn application_ids(&mut self) -> Result<Vec<Aid>> {
        self.require_picc("list applications")?;
        let cmd = Command::GetApplicationIds;
        let resp = self.execute(&cmd)?;
        self.expect_ok(&cmd, &resp)?;
        responses::decode_application_ids(&resp.payload)
    }

    /// Files of the selected application.
    pub fn file_ids(&mut self) -> Result<Vec<FileNumber>> {
        self.require_app("list files")?;
        let cmd = Command::GetFileIds;
        let resp = self.execute(&cmd)?;
        self.expect_ok(&cmd, &resp)?;
        responses::decode_file_ids(&resp.payload)
    }

    /// Hand the channel to a Type-4 NDEF writer. The ISO SELECTs it issues
    /// change the card's selection, so the session is back to
    /// [`SessionState::Disconnected`] afterwards.
    pub fn write_type4_message(
        &mut self,
        writer: &mut dyn Type4NdefWriter,
        message: &[u8],
    ) -> Result<()> {
        debug!("writing {} byte NDEF message through Type-4 writer", message.len());
        let res = writer.write_ndef_message(&mut self.channel, message);
        self.set_state(SessionState::Disconnected);
        res
    }
}
