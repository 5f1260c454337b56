// libnpscard/src/protocol/responses/mod.rs

//! Decoders for response payloads.

pub mod picc;
pub mod settings;

pub use picc::{decode_application_ids, decode_file_ids, decode_free_memory};
pub use settings::decode_file_settings;
