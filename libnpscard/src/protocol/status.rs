// libnpscard/src/protocol/status.rs

//! DESFire status codes and their descriptions.

use derive_more::Display;

/// DESFire native status codes (SW2 of an ISO-wrapped response).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DesfireStatus {
    /// `0x00`
    #[display(fmt = "operation ok")]
    Ok,
    /// `0x0C`
    #[display(fmt = "no changes")]
    NoChanges,
    /// `0x0E`
    #[display(fmt = "out of EEPROM")]
    OutOfEeprom,
    /// `0x1C`
    #[display(fmt = "illegal command code")]
    IllegalCommand,
    /// `0x1E`
    #[display(fmt = "integrity error")]
    IntegrityError,
    /// `0x40`
    #[display(fmt = "no such key")]
    NoSuchKey,
    /// `0x7E`
    #[display(fmt = "length error")]
    LengthError,
    /// `0x9D`
    #[display(fmt = "permission denied")]
    PermissionDenied,
    /// `0x9E`
    #[display(fmt = "parameter error")]
    ParameterError,
    /// `0xA0`
    #[display(fmt = "application not found")]
    ApplicationNotFound,
    /// `0xA1`
    #[display(fmt = "application integrity error")]
    ApplicationIntegrityError,
    /// `0xAE`
    #[display(fmt = "authentication error")]
    AuthenticationError,
    /// `0xAF`
    #[display(fmt = "additional frame")]
    AdditionalFrame,
    /// `0xBE`
    #[display(fmt = "boundary error")]
    BoundaryError,
    /// `0xC1`
    #[display(fmt = "PICC integrity error")]
    PiccIntegrityError,
    /// `0xCA`
    #[display(fmt = "command aborted")]
    CommandAborted,
    /// `0xCD`
    #[display(fmt = "PICC disabled")]
    PiccDisabled,
    /// `0xCE`
    #[display(fmt = "count error")]
    CountError,
    /// `0xDE`
    #[display(fmt = "duplicate")]
    Duplicate,
    /// `0xEE`
    #[display(fmt = "EEPROM error")]
    EepromError,
    /// `0xF0`
    #[display(fmt = "file not found")]
    FileNotFound,
    /// `0xF1`
    #[display(fmt = "file integrity error")]
    FileIntegrityError,
    /// Any code not listed above.
    #[display(fmt = "unknown status {:#04x}", _0)]
    Unknown(u8),
}

impl DesfireStatus {
    /// Decode a status byte.
    pub fn from_code(code: u8) -> Self {
        match code {
            0x00 => Self::Ok,
            0x0C => Self::NoChanges,
            0x0E => Self::OutOfEeprom,
            0x1C => Self::IllegalCommand,
            0x1E => Self::IntegrityError,
            0x40 => Self::NoSuchKey,
            0x7E => Self::LengthError,
            0x9D => Self::PermissionDenied,
            0x9E => Self::ParameterError,
            0xA0 => Self::ApplicationNotFound,
            0xA1 => Self::ApplicationIntegrityError,
            0xAE => Self::AuthenticationError,
            0xAF => Self::AdditionalFrame,
            0xBE => Self::BoundaryError,
            0xC1 => Self::PiccIntegrityError,
            0xCA => Self::CommandAborted,
            0xCD => Self::PiccDisabled,
            0xCE => Self::CountError,
            0xDE => Self::Duplicate,
            0xEE => Self::EepromError,
            0xF0 => Self::FileNotFound,
            0xF1 => Self::FileIntegrityError,
            x => Self::Unknown(x),
        }
    }

    /// The status byte.
    pub fn code(&self) -> u8 {
        match self {
            Self::Ok => 0x00,
            Self::NoChanges => 0x0C,
            Self::OutOfEeprom => 0x0E,
            Self::IllegalCommand => 0x1C,
            Self::IntegrityError => 0x1E,
            Self::NoSuchKey => 0x40,
            Self::LengthError => 0x7E,
            Self::PermissionDenied => 0x9D,
            Self::ParameterError => 0x9E,
            Self::ApplicationNotFound => 0xA0,
            Self::ApplicationIntegrityError => 0xA1,
            Self::AuthenticationError => 0xAE,
            Self::AdditionalFrame => 0xAF,
            Self::BoundaryError => 0xBE,
            Self::PiccIntegrityError => 0xC1,
            Self::CommandAborted => 0xCA,
            Self::PiccDisabled => 0xCD,
            Self::CountError => 0xCE,
            Self::Duplicate => 0xDE,
            Self::EepromError => 0xEE,
            Self::FileNotFound => 0xF0,
            Self::FileIntegrityError => 0xF1,
            Self::Unknown(x) => *x,
        }
    }

    /// `0x00`, or `0xDE` for create operations that tolerate duplicates.
    pub fn is_success(&self, accept_duplicate: bool) -> bool {
        matches!(self, Self::Ok) || (accept_duplicate && matches!(self, Self::Duplicate))
    }
}

impl From<u8> for DesfireStatus {
    fn from(code: u8) -> Self {
        Self::from_code(code)
    }
}

/// Human-readable description of a raw status byte, for error messages.
pub fn describe(code: &u8) -> DesfireStatus {
    DesfireStatus::from_code(*code)
}
