// libnpscard/src/error.rs

//! Error types, grouped by the layer that produced them.

use crate::protocol::status::describe;
use crate::types::{Aid, FileNumber, IsoFileId};
use thiserror::Error;

/// Crate-wide error. Every variant belongs to exactly one
/// [`ErrorCategory`] so callers can reduce failures to pass/fail without
/// losing which layer produced them.
#[derive(Error, Debug)]
pub enum Error {
    /// The channel failed.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// The card answered with an error status.
    #[error(transparent)]
    Card(#[from] CardError),

    /// Data read from the card is malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Data handed in by the caller cannot be encoded.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// A response broke the framing rules.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An operation was attempted in a session state that forbids it.
    #[error("{operation} is not valid in session state {state}")]
    InvalidState {
        /// Name of the rejected operation.
        operation: &'static str,
        /// State the session was in.
        state: crate::session::SessionState,
    },
}

/// Coarse classification of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// [`Error::Channel`].
    Channel,
    /// [`Error::Card`].
    Card,
    /// [`Error::Parse`].
    Parse,
    /// [`Error::Encoding`].
    Encoding,
    /// [`Error::Protocol`].
    Protocol,
    /// [`Error::InvalidState`].
    State,
}

impl Error {
    /// Which layer produced this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Channel(_) => ErrorCategory::Channel,
            Error::Card(_) => ErrorCategory::Card,
            Error::Parse(_) => ErrorCategory::Parse,
            Error::Encoding(_) => ErrorCategory::Encoding,
            Error::Protocol(_) => ErrorCategory::Protocol,
            Error::InvalidState { .. } => ErrorCategory::State,
        }
    }

    /// Raw DESFire status code carried by card rejections, if any.
    pub fn card_status(&self) -> Option<u8> {
        match self {
            Error::Card(e) => e.status(),
            _ => None,
        }
    }
}

/// Transport-level failures reported by the card channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// No answer within the exchange timeout.
    #[error("channel timed out after {timeout_ms} ms")]
    Timeout {
        /// Timeout that elapsed.
        timeout_ms: u32,
    },

    /// The card left the field.
    #[error("card disconnected")]
    Disconnected,

    /// Any other reader failure.
    #[error("channel error: {0}")]
    Io(String),
}

/// The card rejected a command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CardError {
    /// SELECT APPLICATION failed.
    #[error("application {aid} not found (status {status:#04x})")]
    AppNotFound {
        /// Application that was selected.
        aid: Aid,
        /// Card status.
        status: u8,
    },

    /// Authentication was refused, or the card proved a different key.
    #[error("authentication with key {key_number} failed (status {status:#04x})")]
    AuthFailed {
        /// Key used.
        key_number: u8,
        /// Card status; `0xAE` when the card's proof did not match.
        status: u8,
    },

    /// READ DATA failed.
    #[error("read of file {file} failed: {}", describe(.status))]
    ReadFailed {
        /// File read.
        file: FileNumber,
        /// Card status.
        status: u8,
    },

    /// WRITE DATA failed.
    #[error("write to file {file} failed: {}", describe(.status))]
    WriteFailed {
        /// File written.
        file: FileNumber,
        /// Card status.
        status: u8,
    },

    /// An existing file is too small for the data.
    #[error("{required} bytes do not fit file {file} of {capacity} bytes")]
    PayloadTooLarge {
        /// File that was too small.
        file: FileNumber,
        /// Bytes needed.
        required: u32,
        /// Size of the file.
        capacity: u32,
    },

    /// Not enough free EEPROM to create the files.
    #[error("card has {available} bytes free, {required} needed")]
    InsufficientMemory {
        /// Bytes needed.
        required: u32,
        /// Bytes the card reported free.
        available: u32,
    },

    /// Any other rejected DESFire command.
    #[error("command {command:#04x} rejected: {}", describe(.status))]
    Status {
        /// Instruction byte of the command.
        command: u8,
        /// Card status.
        status: u8,
    },

    /// An ISO 7816-4 command ended with a status word other than `9000`.
    #[error("iso status {sw1:#04x}{sw2:02x}")]
    IsoStatus {
        /// First status byte.
        sw1: u8,
        /// Second status byte.
        sw2: u8,
    },
}

impl CardError {
    /// Status code of the rejection; for ISO failures this is SW2.
    pub fn status(&self) -> Option<u8> {
        match self {
            CardError::AppNotFound { status, .. }
            | CardError::AuthFailed { status, .. }
            | CardError::ReadFailed { status, .. }
            | CardError::WriteFailed { status, .. }
            | CardError::Status { status, .. } => Some(*status),
            CardError::IsoStatus { sw2, .. } => Some(*sw2),
            CardError::PayloadTooLarge { .. } | CardError::InsufficientMemory { .. } => None,
        }
    }
}

/// Malformed NDEF/CC/NLEN data found on a card.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The SR flag is clear.
    #[error("record is not in short form")]
    NotShortRecord,

    /// The record is not a MIME record.
    #[error("unexpected type name format {tnf:#04x}")]
    WrongTnf {
        /// TNF found.
        tnf: u8,
    },

    /// MB and ME are not both set.
    #[error("message does not consist of a single record")]
    NotSingleRecord,

    /// The CF flag is set.
    #[error("chunked records are not supported")]
    ChunkedRecord,

    /// Input ended early.
    #[error("truncated data: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes needed.
        expected: usize,
        /// Bytes present.
        actual: usize,
    },

    /// NLEN is zero or points past the file.
    #[error("invalid NLEN {nlen} for {available} bytes of file data")]
    InvalidLength {
        /// NLEN found.
        nlen: usize,
        /// Bytes after the NLEN field.
        available: usize,
    },

    /// The length prefix of a raw file points past the file.
    #[error("raw data length {length} exceeds {available} bytes of file data")]
    InvalidDataLength {
        /// Length found.
        length: usize,
        /// Bytes after the prefix.
        available: usize,
    },

    /// CCLEN does not match the capability container.
    #[error("invalid CCLEN {cclen} for {available} bytes")]
    InvalidCcLength {
        /// CCLEN found.
        cclen: usize,
        /// Bytes present.
        available: usize,
    },

    /// A file control TLV has the wrong tag or length.
    #[error("invalid file control TLV (T={tag:#04x}, L={length:#04x})")]
    InvalidTlv {
        /// Tag found.
        tag: u8,
        /// Length found.
        length: u8,
    },

    /// The capability container holds a TLV count the layout does not use.
    #[error("unsupported number of file control TLVs: {0}")]
    UnsupportedTlvCount(usize),

    /// The record type is not ASCII.
    #[error("mime type is not ASCII")]
    InvalidMimeType,

    /// The capability container does not describe a required file.
    #[error("capability container has no TLV for file {fid}")]
    MissingFileControl {
        /// File that was looked up.
        fid: IsoFileId,
    },
}

/// A caller handed a codec data that violates its preconditions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// A command body does not fit one frame.
    #[error("command body of {len} bytes exceeds {max}")]
    BodyTooLong {
        /// Body length.
        len: usize,
        /// Largest body allowed.
        max: usize,
    },

    /// Encoded content is larger than its file.
    #[error("{required} bytes do not fit a capacity of {capacity}")]
    ContentTooLarge {
        /// Bytes needed.
        required: usize,
        /// Bytes available.
        capacity: usize,
    },

    /// A record type longer than 255 bytes.
    #[error("type field of {len} bytes is too long")]
    TypeTooLong {
        /// Type length.
        len: usize,
    },

    /// A short-record payload longer than 255 bytes.
    #[error("payload of {len} bytes is too long")]
    PayloadTooLong {
        /// Payload length.
        len: usize,
    },

    /// File numbers run from 0 to 31.
    #[error("file number {0} out of range")]
    InvalidFileNumber(u8),

    /// An offset that does not fit 24 bits.
    #[error("offset {offset} out of range")]
    OffsetOutOfRange {
        /// Offending offset.
        offset: usize,
    },

    /// A capability container must hold one or two TLVs.
    #[error("{0} capability container TLVs cannot be encoded")]
    TlvCount(usize),
}

/// Responses that do not follow the DESFire framing rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The card sent nothing.
    #[error("empty response")]
    EmptyResponse,

    /// A response had the wrong size.
    #[error("unexpected response length: expected {expected}, got {actual}")]
    UnexpectedLength {
        /// Bytes expected.
        expected: usize,
        /// Bytes received.
        actual: usize,
    },

    /// `AF` where the command is complete in one frame.
    #[error("card requested an additional frame unexpectedly")]
    UnexpectedAdditionalFrame,

    /// GET FILE SETTINGS reported an unknown file type.
    #[error("unknown file type {0:#04x}")]
    UnknownFileType(u8),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
