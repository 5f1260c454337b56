//! Hex formatting for frame tracing.

use std::fmt::Write;

/// Frames longer than this are shortened in log output.
pub const TRACE_PREVIEW_LEN: usize = 64;

/// Format bytes as uppercase hex pairs separated by single spaces.
///
/// Example: `&[0x91, 0xAF]` -> `"91 AF"`
pub fn bytes_to_hex_spaced(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i != 0 {
            s.push(' ');
        }
        // writing to a String cannot fail
        let _ = write!(&mut s, "{:02X}", b);
    }
    s
}

/// Like [`bytes_to_hex_spaced`] but cut after `max` bytes, noting how many
/// were left out.
pub fn hex_preview(bytes: &[u8], max: usize) -> String {
    if bytes.len() <= max {
        return bytes_to_hex_spaced(bytes);
    }
    format!(
        "{} .. (+{} bytes)",
        bytes_to_hex_spaced(&bytes[..max]),
        bytes.len() - max
    )
}
