// libnpscard/src/transport/sim.rs

//! In-memory DESFire PICC behind the [`CardChannel`] trait.
//!
//! Covers the native command subset this crate issues plus the ISO 7816-4
//! SELECT / READ BINARY / UPDATE BINARY commands a Type-4 NDEF writer uses.
//! Authentication uses real DES, access rights are enforced against the
//! authenticated key, and EEPROM is accounted in 32-byte blocks.

use crate::constants::{DESFIRE_CLA, DESFIRE_SW1, MAX_FILE_NUMBER, ins, iso};
use crate::protocol::parser::{le_u24, le_u24_at};
use crate::protocol::status::DesfireStatus;
use crate::session::auth::{self, Block};
use crate::transport::traits::CardChannel;
use crate::types::{AccessRights, Aid, CommMode, DesKey, IsoFileId};
use crate::{ChannelError, Result};
use std::collections::BTreeMap;

/// Free EEPROM of a blank 4K card.
pub const DEFAULT_TOTAL_MEMORY: u32 = 4096;
/// Allocation granularity for files and applications.
pub const ALLOCATION_BLOCK: u32 = 32;
/// Largest data field accepted or returned in one native frame.
pub const MAX_FRAME_DATA: usize = 59;

const ISO_OK: [u8; 2] = [0x90, 0x00];
const ISO_WRONG_LENGTH: [u8; 2] = [0x67, 0x00];
const ISO_SECURITY_STATUS: [u8; 2] = [0x69, 0x82];
const ISO_NO_CURRENT_EF: [u8; 2] = [0x69, 0x86];
const ISO_NOT_FOUND: [u8; 2] = [0x6A, 0x82];
const ISO_WRONG_P1P2: [u8; 2] = [0x6B, 0x00];
const ISO_INS_NOT_SUPPORTED: [u8; 2] = [0x6D, 0x00];
const ISO_CLA_NOT_SUPPORTED: [u8; 2] = [0x6E, 0x00];

#[derive(Debug, Clone)]
struct SimFile {
    iso_file_id: Option<IsoFileId>,
    comm_mode: CommMode,
    access_rights: AccessRights,
    data: Vec<u8>,
}

#[derive(Debug, Clone)]
struct SimApp {
    key_settings: u8,
    keys: Vec<DesKey>,
    iso_file_id: Option<IsoFileId>,
    df_name: Option<Vec<u8>>,
    files: BTreeMap<u8, SimFile>,
}

impl SimApp {
    fn allocated(&self) -> u32 {
        ALLOCATION_BLOCK
            + self
                .files
                .values()
                .map(|f| round_to_block(f.data.len() as u32))
                .sum::<u32>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selected {
    Picc,
    App(u32),
}

#[derive(Debug, Clone)]
enum Pending {
    Idle,
    Auth { key_number: u8, rnd_b: Block },
    Chain(Vec<u8>),
}

fn round_to_block(size: u32) -> u32 {
    size.div_ceil(ALLOCATION_BLOCK) * ALLOCATION_BLOCK
}

fn native(payload: &[u8], status: DesfireStatus) -> Vec<u8> {
    let mut out = payload.to_vec();
    out.extend_from_slice(&[DESFIRE_SW1, status.code()]);
    out
}

fn native_status(status: DesfireStatus) -> Vec<u8> {
    native(&[], status)
}

/// Simulated DESFire EV1 card.
#[derive(Debug, Clone)]
pub struct SimulatedCard {
    picc_key: DesKey,
    apps: BTreeMap<u32, SimApp>,
    total_memory: u32,
    selected: Selected,
    authenticated: Option<u8>,
    pending: Pending,
    iso_file: Option<u8>,
    present: bool,
    remove_after: Option<usize>,
    /// Every command received, in order.
    pub log: Vec<Vec<u8>>,
}

impl Default for SimulatedCard {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedCard {
    /// Blank card with the default PICC master key.
    pub fn new() -> Self {
        Self {
            picc_key: DesKey::DEFAULT,
            apps: BTreeMap::new(),
            total_memory: DEFAULT_TOTAL_MEMORY,
            selected: Selected::Picc,
            authenticated: None,
            pending: Pending::Idle,
            iso_file: None,
            present: true,
            remove_after: None,
            log: Vec::new(),
        }
    }

    /// Set the EEPROM size.
    pub fn with_memory(mut self, total_memory: u32) -> Self {
        self.total_memory = total_memory;
        self
    }

    /// Set the PICC master key.
    pub fn with_picc_key(mut self, key: DesKey) -> Self {
        self.picc_key = key;
        self
    }

    /// Start a new tap: volatile selection and authentication state is
    /// lost and the card is back in the field.
    pub fn new_tap(&mut self) {
        self.selected = Selected::Picc;
        self.authenticated = None;
        self.pending = Pending::Idle;
        self.iso_file = None;
        self.present = true;
        self.remove_after = None;
    }

    /// The card leaves the field after `exchanges` more commands.
    pub fn remove_after(&mut self, exchanges: usize) {
        self.remove_after = Some(exchanges);
    }

    /// Erase everything as some other tool would between taps.
    pub fn external_reformat(&mut self) {
        self.apps.clear();
        self.new_tap();
    }

    /// Delete an application; `false` if it did not exist.
    pub fn remove_application(&mut self, aid: Aid) -> bool {
        self.apps.remove(&aid.as_u32()).is_some()
    }

    /// Applications on the card.
    pub fn application_ids(&self) -> Vec<Aid> {
        self.apps.keys().map(|&a| Aid::new(a)).collect()
    }

    /// Unallocated EEPROM in bytes.
    pub fn free_memory(&self) -> u32 {
        let used: u32 = self.apps.values().map(SimApp::allocated).sum();
        self.total_memory.saturating_sub(used)
    }

    /// Raw content of a file, including padding.
    pub fn file_data(&self, aid: Aid, file: u8) -> Option<&[u8]> {
        self.apps
            .get(&aid.as_u32())
            .and_then(|a| a.files.get(&file))
            .map(|f| f.data.as_slice())
    }

    /// Size of a file.
    pub fn file_capacity(&self, aid: Aid, file: u8) -> Option<u32> {
        self.file_data(aid, file).map(|d| d.len() as u32)
    }

    /// Access rights of a file.
    pub fn file_access_rights(&self, aid: Aid, file: u8) -> Option<AccessRights> {
        self.apps
            .get(&aid.as_u32())
            .and_then(|a| a.files.get(&file))
            .map(|f| f.access_rights)
    }

    /// Overwrite the start of a file with `bytes`, bypassing access rights.
    /// Returns `false` when the file does not exist or is too small.
    pub fn overwrite_file(&mut self, aid: Aid, file: u8, bytes: &[u8]) -> bool {
        match self
            .apps
            .get_mut(&aid.as_u32())
            .and_then(|a| a.files.get_mut(&file))
        {
            Some(f) if bytes.len() <= f.data.len() => {
                f.data[..bytes.len()].copy_from_slice(bytes);
                true
            }
            _ => false,
        }
    }

    fn process(&mut self, command: &[u8]) -> Vec<u8> {
        if command.len() < 4 {
            return ISO_WRONG_LENGTH.to_vec();
        }
        match command[0] {
            DESFIRE_CLA => match split_native(command) {
                Some(body) => self.native_command(command[1], body),
                None => native_status(DesfireStatus::LengthError),
            },
            iso::CLA => self.iso_command(command),
            _ => ISO_CLA_NOT_SUPPORTED.to_vec(),
        }
    }

    fn selected_app(&self) -> Option<&SimApp> {
        match self.selected {
            Selected::App(aid) => self.apps.get(&aid),
            Selected::Picc => None,
        }
    }

    fn selected_app_mut(&mut self) -> Option<&mut SimApp> {
        match self.selected {
            Selected::App(aid) => self.apps.get_mut(&aid),
            Selected::Picc => None,
        }
    }

    fn key(&self, key_number: u8) -> Option<DesKey> {
        match self.selected {
            Selected::Picc => (key_number == 0).then_some(self.picc_key),
            Selected::App(_) => self
                .selected_app()
                .and_then(|a| a.keys.get(key_number as usize).copied()),
        }
    }

    fn native_command(&mut self, code: u8, body: &[u8]) -> Vec<u8> {
        let pending = std::mem::replace(&mut self.pending, Pending::Idle);
        if code == ins::ADDITIONAL_FRAME {
            return match pending {
                Pending::Auth { key_number, rnd_b } => self.finish_auth(key_number, &rnd_b, body),
                Pending::Chain(rest) => self.reply_chained(rest),
                Pending::Idle => native_status(DesfireStatus::IllegalCommand),
            };
        }
        if body.len() > MAX_FRAME_DATA {
            return native_status(DesfireStatus::LengthError);
        }

        match code {
            ins::SELECT_APPLICATION => self.select_application(body),
            ins::AUTHENTICATE_LEGACY => self.authenticate(body),
            ins::CREATE_APPLICATION => self.create_application(body),
            ins::GET_APPLICATION_IDS => {
                if self.selected != Selected::Picc {
                    return native_status(DesfireStatus::PermissionDenied);
                }
                let ids: Vec<u8> = self
                    .apps
                    .keys()
                    .flat_map(|&a| Aid::new(a).to_le_bytes())
                    .collect();
                self.reply_chained(ids)
            }
            ins::FORMAT_PICC => {
                if self.selected != Selected::Picc || self.authenticated != Some(0) {
                    return native_status(DesfireStatus::AuthenticationError);
                }
                self.apps.clear();
                native_status(DesfireStatus::Ok)
            }
            ins::FREE_MEMORY => native(&le_u24(self.free_memory()), DesfireStatus::Ok),
            ins::GET_FILE_IDS => match self.selected_app() {
                Some(app) => {
                    let ids: Vec<u8> = app.files.keys().copied().collect();
                    native(&ids, DesfireStatus::Ok)
                }
                None => native_status(DesfireStatus::PermissionDenied),
            },
            ins::CREATE_STD_DATA_FILE => self.create_std_data_file(body),
            ins::GET_FILE_SETTINGS => self.file_settings(body),
            ins::READ_DATA => self.read_data(body),
            ins::WRITE_DATA => self.write_data(body),
            _ => native_status(DesfireStatus::IllegalCommand),
        }
    }

    fn reply_chained(&mut self, mut data: Vec<u8>) -> Vec<u8> {
        if data.len() > MAX_FRAME_DATA {
            let rest = data.split_off(MAX_FRAME_DATA);
            self.pending = Pending::Chain(rest);
            return native(&data, DesfireStatus::AdditionalFrame);
        }
        native(&data, DesfireStatus::Ok)
    }

    fn select_application(&mut self, body: &[u8]) -> Vec<u8> {
        let Ok(bytes) = <[u8; 3]>::try_from(body) else {
            return native_status(DesfireStatus::LengthError);
        };
        self.authenticated = None;
        self.iso_file = None;
        let aid = Aid::from_le_bytes(bytes).as_u32();
        if aid == 0 {
            self.selected = Selected::Picc;
        } else if self.apps.contains_key(&aid) {
            self.selected = Selected::App(aid);
        } else {
            return native_status(DesfireStatus::ApplicationNotFound);
        }
        native_status(DesfireStatus::Ok)
    }

    fn authenticate(&mut self, body: &[u8]) -> Vec<u8> {
        let [key_number] = body else {
            return native_status(DesfireStatus::LengthError);
        };
        self.authenticated = None;
        let Some(key) = self.key(*key_number) else {
            return native_status(DesfireStatus::NoSuchKey);
        };
        let rnd_b: Block = rand::random();
        self.pending = Pending::Auth {
            key_number: *key_number,
            rnd_b,
        };
        native(&auth::des_encrypt(&key, &rnd_b), DesfireStatus::AdditionalFrame)
    }

    fn finish_auth(&mut self, key_number: u8, rnd_b: &Block, answer: &[u8]) -> Vec<u8> {
        let proof = self
            .key(key_number)
            .and_then(|key| auth::card_verify_answer(&key, rnd_b, answer));
        match proof {
            Some(proof) => {
                self.authenticated = Some(key_number);
                native(&proof, DesfireStatus::Ok)
            }
            None => native_status(DesfireStatus::AuthenticationError),
        }
    }

    fn create_application(&mut self, body: &[u8]) -> Vec<u8> {
        if self.selected != Selected::Picc {
            return native_status(DesfireStatus::PermissionDenied);
        }
        if body.len() < 5 {
            return native_status(DesfireStatus::LengthError);
        }
        let aid = Aid::from_le_bytes([body[0], body[1], body[2]]).as_u32();
        let key_settings = body[3];
        let app_settings = body[4];
        let key_count = (app_settings & 0x0F) as usize;
        if aid == 0 || key_count == 0 || key_count > 14 {
            return native_status(DesfireStatus::ParameterError);
        }

        let (iso_file_id, df_name) = if app_settings & 0x20 != 0 {
            if body.len() < 7 {
                return native_status(DesfireStatus::LengthError);
            }
            let fid = IsoFileId::new(u16::from_le_bytes([body[5], body[6]]));
            let name = &body[7..];
            if name.len() > 16 {
                return native_status(DesfireStatus::LengthError);
            }
            (Some(fid), (!name.is_empty()).then(|| name.to_vec()))
        } else {
            if body.len() != 5 {
                return native_status(DesfireStatus::LengthError);
            }
            (None, None)
        };

        if self.apps.contains_key(&aid) {
            return native_status(DesfireStatus::Duplicate);
        }
        let clash = self.apps.values().any(|a| {
            (iso_file_id.is_some() && a.iso_file_id == iso_file_id)
                || (df_name.is_some() && a.df_name == df_name)
        });
        if clash {
            return native_status(DesfireStatus::Duplicate);
        }
        if self.free_memory() < ALLOCATION_BLOCK {
            return native_status(DesfireStatus::OutOfEeprom);
        }

        self.apps.insert(
            aid,
            SimApp {
                key_settings,
                keys: vec![DesKey::DEFAULT; key_count],
                iso_file_id,
                df_name,
                files: BTreeMap::new(),
            },
        );
        native_status(DesfireStatus::Ok)
    }

    fn create_std_data_file(&mut self, body: &[u8]) -> Vec<u8> {
        let free = self.free_memory();
        let authenticated = self.authenticated;
        let Some(app) = self.selected_app_mut() else {
            return native_status(DesfireStatus::PermissionDenied);
        };
        // Key settings bit 2: create/delete without master key.
        if app.key_settings & 0x04 == 0 && authenticated != Some(0) {
            return native_status(DesfireStatus::PermissionDenied);
        }

        let with_fid = app.iso_file_id.is_some();
        let expected = if with_fid { 9 } else { 7 };
        if body.len() != expected {
            return native_status(DesfireStatus::LengthError);
        }
        let file_no = body[0];
        let mut idx = 1;
        let iso_file_id = if with_fid {
            idx = 3;
            Some(IsoFileId::new(u16::from_le_bytes([body[1], body[2]])))
        } else {
            None
        };
        let comm_mode = CommMode::from_byte(body[idx]);
        let access_rights = AccessRights::from_le_bytes([body[idx + 1], body[idx + 2]]);
        let Ok(size) = le_u24_at(body, idx + 3) else {
            return native_status(DesfireStatus::LengthError);
        };

        if file_no > MAX_FILE_NUMBER {
            return native_status(DesfireStatus::ParameterError);
        }
        if app.files.contains_key(&file_no)
            || (iso_file_id.is_some()
                && app.files.values().any(|f| f.iso_file_id == iso_file_id))
        {
            return native_status(DesfireStatus::Duplicate);
        }
        if round_to_block(size) > free {
            return native_status(DesfireStatus::OutOfEeprom);
        }

        app.files.insert(
            file_no,
            SimFile {
                iso_file_id,
                comm_mode,
                access_rights,
                data: vec![0u8; size as usize],
            },
        );
        native_status(DesfireStatus::Ok)
    }

    fn file_settings(&self, body: &[u8]) -> Vec<u8> {
        let [file_no] = body else {
            return native_status(DesfireStatus::LengthError);
        };
        let Some(file) = self.selected_app().and_then(|a| a.files.get(file_no)) else {
            return native_status(DesfireStatus::FileNotFound);
        };
        let mut out = vec![0x00, file.comm_mode as u8];
        out.extend_from_slice(&file.access_rights.to_le_bytes());
        out.extend_from_slice(&le_u24(file.data.len() as u32));
        native(&out, DesfireStatus::Ok)
    }

    fn read_data(&mut self, body: &[u8]) -> Vec<u8> {
        if body.len() != 7 {
            return native_status(DesfireStatus::LengthError);
        }
        let key = self.authenticated;
        let Some(file) = self.selected_app().and_then(|a| a.files.get(&body[0])) else {
            return native_status(DesfireStatus::FileNotFound);
        };
        if !file.access_rights.allows_read(key) {
            return native_status(DesfireStatus::PermissionDenied);
        }

        let size = file.data.len();
        let (Ok(offset), Ok(length)) = (le_u24_at(body, 1), le_u24_at(body, 4)) else {
            return native_status(DesfireStatus::LengthError);
        };
        let offset = offset as usize;
        if offset > size {
            return native_status(DesfireStatus::BoundaryError);
        }
        let length = if length == 0 {
            size - offset
        } else {
            length as usize
        };
        if offset + length > size {
            return native_status(DesfireStatus::BoundaryError);
        }
        let data = file.data[offset..offset + length].to_vec();
        self.reply_chained(data)
    }

    fn write_data(&mut self, body: &[u8]) -> Vec<u8> {
        if body.len() < 7 {
            return native_status(DesfireStatus::LengthError);
        }
        let key = self.authenticated;
        let Some(file) = self
            .selected_app_mut()
            .and_then(|a| a.files.get_mut(&body[0]))
        else {
            return native_status(DesfireStatus::FileNotFound);
        };
        if !file.access_rights.allows_write(key) {
            return native_status(DesfireStatus::PermissionDenied);
        }

        let (Ok(offset), Ok(length)) = (le_u24_at(body, 1), le_u24_at(body, 4)) else {
            return native_status(DesfireStatus::LengthError);
        };
        let (offset, length) = (offset as usize, length as usize);
        let data = &body[7..];
        if data.len() != length {
            return native_status(DesfireStatus::LengthError);
        }
        if offset + length > file.data.len() {
            return native_status(DesfireStatus::BoundaryError);
        }
        file.data[offset..offset + length].copy_from_slice(data);
        native_status(DesfireStatus::Ok)
    }

    fn iso_command(&mut self, command: &[u8]) -> Vec<u8> {
        self.pending = Pending::Idle;
        let (p1, p2) = (command[2], command[3]);
        match command[1] {
            iso::SELECT => {
                let Some(data) = iso_data(command) else {
                    return ISO_WRONG_LENGTH.to_vec();
                };
                self.iso_select(p1, data)
            }
            iso::READ_BINARY => {
                let Some(file_no) = self.iso_file else {
                    return ISO_NO_CURRENT_EF.to_vec();
                };
                let le = match command.get(4) {
                    Some(0) | None => 256,
                    Some(&n) => n as usize,
                };
                let offset = (((p1 & 0x7F) as usize) << 8) | p2 as usize;
                let Some(file) = self.selected_app().and_then(|a| a.files.get(&file_no)) else {
                    return ISO_NO_CURRENT_EF.to_vec();
                };
                if !file.access_rights.allows_read(None) {
                    return ISO_SECURITY_STATUS.to_vec();
                }
                if offset > file.data.len() {
                    return ISO_WRONG_P1P2.to_vec();
                }
                let end = (offset + le).min(file.data.len());
                let mut out = file.data[offset..end].to_vec();
                out.extend_from_slice(&ISO_OK);
                out
            }
            iso::UPDATE_BINARY => {
                let Some(file_no) = self.iso_file else {
                    return ISO_NO_CURRENT_EF.to_vec();
                };
                let Some(data) = iso_data(command) else {
                    return ISO_WRONG_LENGTH.to_vec();
                };
                let data = data.to_vec();
                let offset = (((p1 & 0x7F) as usize) << 8) | p2 as usize;
                let Some(file) = self
                    .selected_app_mut()
                    .and_then(|a| a.files.get_mut(&file_no))
                else {
                    return ISO_NO_CURRENT_EF.to_vec();
                };
                if !file.access_rights.allows_write(None) {
                    return ISO_SECURITY_STATUS.to_vec();
                }
                if offset + data.len() > file.data.len() {
                    return ISO_WRONG_P1P2.to_vec();
                }
                file.data[offset..offset + data.len()].copy_from_slice(&data);
                ISO_OK.to_vec()
            }
            _ => ISO_INS_NOT_SUPPORTED.to_vec(),
        }
    }

    fn iso_select(&mut self, p1: u8, data: &[u8]) -> Vec<u8> {
        match p1 {
            iso::SELECT_BY_NAME => {
                let found = self
                    .apps
                    .iter()
                    .find(|(_, a)| a.df_name.as_deref() == Some(data))
                    .map(|(&aid, _)| aid);
                match found {
                    Some(aid) => {
                        self.selected = Selected::App(aid);
                        self.authenticated = None;
                        self.iso_file = None;
                        ISO_OK.to_vec()
                    }
                    None => ISO_NOT_FOUND.to_vec(),
                }
            }
            iso::SELECT_BY_FID => {
                let Ok(fid) = <[u8; 2]>::try_from(data) else {
                    return ISO_WRONG_LENGTH.to_vec();
                };
                let fid = IsoFileId::from_be_bytes(fid);
                let file = self.selected_app().and_then(|a| {
                    a.files
                        .iter()
                        .find(|(_, f)| f.iso_file_id == Some(fid))
                        .map(|(&n, _)| n)
                });
                if let Some(n) = file {
                    self.iso_file = Some(n);
                    return ISO_OK.to_vec();
                }
                let app = self
                    .apps
                    .iter()
                    .find(|(_, a)| a.iso_file_id == Some(fid))
                    .map(|(&aid, _)| aid);
                match app {
                    Some(aid) => {
                        self.selected = Selected::App(aid);
                        self.authenticated = None;
                        self.iso_file = None;
                        ISO_OK.to_vec()
                    }
                    None => ISO_NOT_FOUND.to_vec(),
                }
            }
            _ => ISO_WRONG_P1P2.to_vec(),
        }
    }
}

/// Body of a wrapped native command, `None` when Lc disagrees with the
/// frame length.
fn split_native(command: &[u8]) -> Option<&[u8]> {
    match command.len() {
        5 => Some(&[]),
        n if n > 5 => {
            let lc = command[4] as usize;
            (n == 5 + lc + 1).then(|| &command[5..5 + lc])
        }
        _ => None,
    }
}

/// Command data field of a short ISO APDU with Lc.
fn iso_data(command: &[u8]) -> Option<&[u8]> {
    let lc = *command.get(4)? as usize;
    command.get(5..5 + lc)
}

impl CardChannel for SimulatedCard {
    fn transceive(&mut self, command: &[u8], _timeout_ms: u32) -> Result<Vec<u8>> {
        if let Some(n) = self.remove_after {
            if n == 0 {
                self.present = false;
            } else {
                self.remove_after = Some(n - 1);
            }
        }
        if !self.present {
            return Err(ChannelError::Disconnected.into());
        }
        self.log.push(command.to_vec());
        Ok(self.process(command))
    }
}
