// libnpscard/src/layout/mod.rs

//! The three on-card layouts and the policy they share.
//!
//! Every layout provisions its applications and files with
//! [`Layout::format`], updates payloads with [`Layout::write`] and reads
//! them back with [`Layout::read`]. Writes go in place while the existing
//! files are large enough; otherwise the card is formatted and the layout
//! recreated at the new capacities, carrying over the payload that was not
//! part of the update.

pub mod config;
pub mod dual;
pub mod nato;
pub mod plan;
pub mod pure;

pub use config::{DualFiles, FileSpec, LayoutConfig, NatoFiles, PureFiles};
pub use dual::DualLayout;
pub use nato::NatoLayout;
pub use plan::CapacityPlanner;
pub use pure::PureLayout;

use crate::constants::{NLEN_SIZE, WRITE_CHUNK_SIZE};
use crate::ndef::{
    CapabilityContainer, decode_mime_record, encode_mime_record, unwrap_type4_file, wrap_type4_file,
};
use crate::session::{Session, SessionState};
use crate::transport::CardChannel;
use crate::types::{AccessRights, Aid};
use crate::{Error, Result};
use derive_more::Display;
use log::{debug, info, warn};

/// One payload slot of a card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Payload {
    /// Media type; `None` for raw bytes.
    pub mime_type: Option<String>,
    /// Payload bytes.
    pub data: Vec<u8>,
}

impl Payload {
    /// Payload with a media type.
    pub fn new(mime_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            mime_type: Some(mime_type.into()),
            data: data.into(),
        }
    }

    /// Payload without a media type.
    pub fn raw(data: impl Into<Vec<u8>>) -> Self {
        Self {
            mime_type: None,
            data: data.into(),
        }
    }
}

/// Both payloads of a card: the patient summary and the extra data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardPayloads {
    /// Patient summary.
    pub nps: Payload,
    /// Extra data.
    pub extra: Payload,
}

impl CardPayloads {
    /// Pair two payloads.
    pub fn new(nps: Payload, extra: Payload) -> Self {
        Self { nps, extra }
    }
}

/// Payloads to write; a slot left `None` keeps its current content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PayloadUpdate {
    /// New patient summary.
    pub nps: Option<Payload>,
    /// New extra data.
    pub extra: Option<Payload>,
}

impl PayloadUpdate {
    /// Update only the patient summary.
    pub fn nps(payload: Payload) -> Self {
        Self {
            nps: Some(payload),
            extra: None,
        }
    }

    /// Update only the extra data.
    pub fn extra(payload: Payload) -> Self {
        Self {
            nps: None,
            extra: Some(payload),
        }
    }

    /// Neither slot is set.
    pub fn is_empty(&self) -> bool {
        self.nps.is_none() && self.extra.is_none()
    }

    /// Fill the slots this update leaves out from `current`, or with empty
    /// payloads when the current content is unknown.
    pub fn merged_with(&self, current: Option<CardPayloads>) -> CardPayloads {
        let current = current.unwrap_or_default();
        CardPayloads {
            nps: self.nps.clone().unwrap_or(current.nps),
            extra: self.extra.clone().unwrap_or(current.extra),
        }
    }
}

impl From<CardPayloads> for PayloadUpdate {
    fn from(p: CardPayloads) -> Self {
        Self {
            nps: Some(p.nps),
            extra: Some(p.extra),
        }
    }
}

/// Result of reading a card with a given layout.
///
/// `NotThisLayout` carries the card or parse error that showed the card is
/// not provisioned this way. Channel failures are not folded in here; they
/// stay `Err`.
#[derive(Debug)]
pub enum ReadOutcome<T> {
    /// The card uses this layout.
    Found(T),
    /// The card is not provisioned this way.
    NotThisLayout(Error),
}

impl<T> ReadOutcome<T> {
    /// Whether the layout was found.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The value, if found.
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(v) => Some(v),
            Self::NotThisLayout(_) => None,
        }
    }
}

/// Which on-card layout a card uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayoutVariant {
    /// Raw files in the private application.
    #[display(fmt = "pure")]
    Pure,
    /// NDEF file plus a bare record in the private application.
    #[display(fmt = "dual")]
    Dual,
    /// Two NDEF files in the NDEF application.
    #[display(fmt = "nato")]
    Nato,
}

impl LayoutVariant {
    /// Order in which layouts are tried when detecting a card's layout.
    pub const DETECTION_ORDER: [LayoutVariant; 3] = [Self::Nato, Self::Dual, Self::Pure];

    /// Number of standard files the layout creates.
    pub fn file_count(&self) -> usize {
        match self {
            Self::Pure => 2,
            Self::Dual => 3,
            Self::Nato => 3,
        }
    }
}

/// A card layout driven over a session.
pub trait Layout {
    /// Which layout this is.
    fn variant(&self) -> LayoutVariant;

    /// Format the card and provision this layout seeded with `seed`.
    fn format<C: CardChannel>(&mut self, session: &mut Session<C>, seed: &CardPayloads) -> Result<()>;

    /// Update the slots present in `update`, reformatting when a file is
    /// too small for its new content.
    fn write<C: CardChannel>(&mut self, session: &mut Session<C>, update: &PayloadUpdate) -> Result<()>;

    /// Read both payloads. Card and parse failures mean the card is not
    /// provisioned this way and come back as [`ReadOutcome::NotThisLayout`].
    fn read<C: CardChannel>(&mut self, session: &mut Session<C>) -> Result<ReadOutcome<CardPayloads>>;
}

/// Map errors that mean "not provisioned like this" to `NotThisLayout`.
pub(crate) fn classify_read<T>(variant: LayoutVariant, res: Result<T>) -> Result<ReadOutcome<T>> {
    match res {
        Ok(v) => Ok(ReadOutcome::Found(v)),
        Err(e @ (Error::Card(_) | Error::Parse(_) | Error::Protocol(_))) => {
            warn!("card is not in {} layout: {}", variant, e);
            Ok(ReadOutcome::NotThisLayout(e))
        }
        Err(e) => Err(e),
    }
}

/// Select the PICC, authenticate with the PICC master key and erase the
/// card.
pub(crate) fn format_card<C: CardChannel>(session: &mut Session<C>, config: &LayoutConfig) -> Result<()> {
    session.select_application(Aid::PICC)?;
    session.authenticate(&config.picc_key, 0)?;
    session.format_picc()
}

/// Key that unlocks `slot` (an access condition), falling back to the
/// read-write key.
fn unlocking_key(slot: u8, read_write: u8) -> Option<u8> {
    [slot, read_write]
        .into_iter()
        .find(|&k| k < AccessRights::KEY_FREE)
}

fn ensure_key<C: CardChannel>(session: &mut Session<C>, config: &LayoutConfig, key: Option<u8>) -> Result<()> {
    let Some(key) = key else {
        // Never accessible; let the card refuse.
        return Ok(());
    };
    let authenticated =
        matches!(session.state(), SessionState::AuthenticatedApp(_)) && session.authenticated_key() == Some(key);
    if !authenticated {
        debug!("authenticating with application key {}", key);
        session.authenticate(&config.app_key, key)?;
    }
    Ok(())
}

/// Authenticate in the selected application if `spec` is not freely
/// writable.
pub(crate) fn unlock_write<C: CardChannel>(
    session: &mut Session<C>,
    config: &LayoutConfig,
    spec: &FileSpec,
) -> Result<()> {
    let ar = spec.access_rights;
    if ar.allows_write(None) {
        return Ok(());
    }
    ensure_key(session, config, unlocking_key(ar.write, ar.read_write))
}

pub(crate) fn unlock_read<C: CardChannel>(
    session: &mut Session<C>,
    config: &LayoutConfig,
    spec: &FileSpec,
) -> Result<()> {
    let ar = spec.access_rights;
    if ar.allows_read(None) {
        return Ok(());
    }
    ensure_key(session, config, unlocking_key(ar.read, ar.read_write))
}

/// Create the file described by `spec`; `true` when it did not exist yet.
pub(crate) fn create_file<C: CardChannel>(session: &mut Session<C>, spec: &FileSpec, capacity: u32) -> Result<bool> {
    session.create_standard_file(
        spec.number,
        spec.iso_file_id,
        spec.comm_mode,
        spec.access_rights,
        capacity,
    )
}

/// Write `content` from offset 0 in frames of at most `WRITE_CHUNK_SIZE`.
pub(crate) fn write_chunked<C: CardChannel>(
    session: &mut Session<C>,
    config: &LayoutConfig,
    spec: &FileSpec,
    offset: u32,
    content: &[u8],
) -> Result<()> {
    unlock_write(session, config, spec)?;
    for (i, chunk) in content.chunks(WRITE_CHUNK_SIZE).enumerate() {
        let at = offset + (i * WRITE_CHUNK_SIZE) as u32;
        session.write_file(spec.number, at, chunk)?;
    }
    Ok(())
}

/// Read a file completely, asking the card for its size first.
pub(crate) fn read_whole<C: CardChannel>(
    session: &mut Session<C>,
    config: &LayoutConfig,
    spec: &FileSpec,
) -> Result<Vec<u8>> {
    unlock_read(session, config, spec)?;
    let size = session.file_settings(spec.number)?.size;
    if size == 0 {
        return Ok(Vec::new());
    }
    session.read_file(spec.number, 0, size)
}

/// Declared capacity of a file in the selected application.
pub(crate) fn capacity_of<C: CardChannel>(session: &mut Session<C>, spec: &FileSpec) -> Result<u32> {
    Ok(session.file_settings(spec.number)?.size)
}

/// Write a Type-4 NDEF file natively: NLEN cleared, message and padding
/// written, NLEN set last.
pub(crate) fn write_type4_native<C: CardChannel>(
    session: &mut Session<C>,
    config: &LayoutConfig,
    spec: &FileSpec,
    capacity: u32,
    message: &[u8],
) -> Result<()> {
    let file = wrap_type4_file(capacity as usize, message)?;
    let (nlen, body) = file.split_at(NLEN_SIZE);

    write_chunked(session, config, spec, 0, &[0x00; NLEN_SIZE])?;
    write_chunked(session, config, spec, NLEN_SIZE as u32, body)?;
    write_chunked(session, config, spec, 0, nlen)
}

/// Read a Type-4 NDEF file and decode its MIME record.
pub(crate) fn read_type4_payload<C: CardChannel>(
    session: &mut Session<C>,
    config: &LayoutConfig,
    spec: &FileSpec,
) -> Result<Payload> {
    let file = read_whole(session, config, spec)?;
    let message = unwrap_type4_file(&file)?;
    record_to_payload(message)
}

pub(crate) fn record_to_payload(bytes: &[u8]) -> Result<Payload> {
    let record = decode_mime_record(bytes)?;
    Ok(Payload::new(record.mime_type()?, record.payload))
}

pub(crate) fn payload_to_record(config: &LayoutConfig, payload: &Payload) -> Result<Vec<u8>> {
    encode_mime_record(config.mime_type(payload.mime_type.as_deref()), &payload.data)
}

/// Give a slot the update leaves out an empty record when its file was
/// only just created, so the card reads back after the write.
pub(crate) fn seed_fresh_slot(config: &LayoutConfig, record: &mut Option<Vec<u8>>, fresh: bool) -> Result<()> {
    if record.is_none() && fresh {
        debug!("seeding newly created slot with an empty record");
        *record = Some(payload_to_record(config, &Payload::default())?);
    }
    Ok(())
}

/// Write the CC file if its current content differs from `cc`.
pub(crate) fn sync_capability_container<C: CardChannel>(
    session: &mut Session<C>,
    config: &LayoutConfig,
    spec: &FileSpec,
    cc: &CapabilityContainer,
) -> Result<()> {
    let current = read_whole(session, config, spec)?;
    let wanted = cc.encode_padded(current.len())?;
    if current == wanted {
        return Ok(());
    }
    debug!("updating capability container ({} TLVs)", cc.tlvs.len());
    write_chunked(session, config, spec, 0, &wanted)
}

/// Destructive fallback of `write`: read what is on the card, merge the
/// update into it and provision the layout from scratch.
pub(crate) fn reformat_with<L: Layout, C: CardChannel>(
    layout: &mut L,
    session: &mut Session<C>,
    update: &PayloadUpdate,
) -> Result<()> {
    let current = if update.nps.is_some() && update.extra.is_some() {
        None
    } else {
        match layout.read(session)? {
            ReadOutcome::Found(p) => Some(p),
            ReadOutcome::NotThisLayout(e) => {
                warn!("content not preserved across reformat: {}", e);
                None
            }
        }
    };
    info!("files too small for new content, reformatting {} layout", layout.variant());
    let merged = update.merged_with(current);
    layout.format(session, &merged)
}
