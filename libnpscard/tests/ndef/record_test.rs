#[path = "../common/mod.rs"]
mod common;

use libnpscard::ndef::{decode_mime_record, encode_mime_record, encoded_mime_record_len};
use libnpscard::{Error, ParseError};
use proptest::prelude::*;

#[test]
fn short_record_layout() {
    let rec = encode_mime_record("text/plain", b"hi").unwrap();
    assert_eq!(rec, hex::decode("D20A02746578742F706C61696E6869").unwrap());
}

#[test]
fn exactly_256_bytes_uses_long_form() {
    let rec = encode_mime_record("a/b", &[7u8; 256]).unwrap();
    assert_eq!(&rec[..6], &[0xC2, 0x03, 0x00, 0x00, 0x01, 0x00]);
    assert_eq!(rec.len(), encoded_mime_record_len(3, 256));

    let rec = encode_mime_record("a/b", &[7u8; 255]).unwrap();
    assert_eq!(&rec[..3], &[0xD2, 0x03, 0xFF]);
}

#[test]
fn padding_after_the_record_is_ignored() {
    let mut bytes = encode_mime_record("a/b", b"xyz").unwrap();
    bytes.extend_from_slice(&[0u8; 40]);
    let rec = decode_mime_record(&bytes).unwrap();
    assert_eq!(rec.mime_type().unwrap(), "a/b");
    assert_eq!(rec.payload, b"xyz");
    assert_eq!(rec.encoded_len(), 9);
}

#[test]
fn rejects_non_media_records() {
    // well-known "T" record
    let text = [0xD1, 0x01, 0x03, b'T', 0x02, b'e', b'n'];
    assert!(matches!(
        decode_mime_record(&text),
        Err(Error::Parse(ParseError::WrongTnf { tnf: 0x01 }))
    ));
    // zero padding of an empty file
    assert!(decode_mime_record(&[0u8; 16]).is_err());
}

#[test]
fn payload_length_past_end_is_truncated() {
    let bytes = [0xD2, 0x03, 0x20, b'a', b'/', b'b', 1, 2, 3];
    assert!(matches!(
        decode_mime_record(&bytes),
        Err(Error::Parse(ParseError::Truncated { .. }))
    ));
}

#[test]
fn non_ascii_mime_type_is_refused() {
    assert!(matches!(
        encode_mime_record("text/plän", b""),
        Err(Error::Parse(ParseError::InvalidMimeType))
    ));
}

proptest! {
    #[test]
    fn record_round_trip(mime in "[a-z]{1,12}/[a-z.+-]{1,20}", payload in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let bytes = encode_mime_record(&mime, &payload).unwrap();
        prop_assert_eq!(bytes[0] & 0x10 != 0, payload.len() < 256);
        let rec = decode_mime_record(&bytes).unwrap();
        prop_assert_eq!(rec.mime_type().unwrap(), mime.as_str());
        prop_assert_eq!(rec.payload, payload.as_slice());
    }

    #[test]
    fn decoding_arbitrary_bytes_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..300)) {
        let _ = decode_mime_record(&bytes);
    }
}
