// fixtures.rs: provides commonly used payloads and raw frames

use libnpscard::prelude::*;

pub const NPS_MIME: &str = "application/x.nps+xml";
pub const EXTRA_MIME: &str = "text/plain";

pub fn nps(data: &[u8]) -> Payload {
    Payload::new(NPS_MIME, data.to_vec())
}

pub fn extra(data: &[u8]) -> Payload {
    Payload::new(EXTRA_MIME, data.to_vec())
}

/// Payloads as a layout reads them back: Pure keeps no media type.
pub fn payloads_for(variant: LayoutVariant, nps_data: &[u8], extra_data: &[u8]) -> CardPayloads {
    match variant {
        LayoutVariant::Pure => CardPayloads::new(Payload::raw(nps_data.to_vec()), Payload::raw(extra_data.to_vec())),
        _ => CardPayloads::new(nps(nps_data), extra(extra_data)),
    }
}

pub fn sample(variant: LayoutVariant) -> CardPayloads {
    payloads_for(variant, b"<nps><patient>Doe</patient></nps>", b"allergies: none")
}

/// Recognisable bytes, zero at every multiple of 251.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Native response `payload || 91 status`.
pub fn native(payload: &[u8], status: u8) -> Vec<u8> {
    let mut out = payload.to_vec();
    out.extend_from_slice(&[0x91, status]);
    out
}

pub fn ok() -> Vec<u8> {
    native(&[], 0x00)
}

/// GetFileSettings payload of a plain, freely accessible standard file.
pub fn std_file_settings(size: u32) -> Vec<u8> {
    let s = size.to_le_bytes();
    vec![0x00, 0x00, 0xE0, 0xEE, s[0], s[1], s[2]]
}
