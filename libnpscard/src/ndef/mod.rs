// libnpscard/src/ndef/mod.rs

//! NFC Forum structures stored on the card: single MIME records, the
//! NLEN-prefixed Type-4 file envelope and the capability container.

pub mod cc;
pub mod record;
pub mod type4;
pub mod writer;

pub use cc::{CapabilityContainer, CcFileControlTlv};
pub use record::{NdefRecord, decode_mime_record, encode_mime_record, encoded_mime_record_len};
pub use type4::{type4_file_len, unwrap_type4_file, wrap_type4_file};
pub use writer::{IsoType4Writer, Type4NdefWriter};
