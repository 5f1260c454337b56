#[path = "../common/mod.rs"]
mod common;

use libnpscard::ndef::{encode_mime_record, unwrap_type4_file, wrap_type4_file};
use libnpscard::{EncodingError, Error, ParseError};
use proptest::prelude::*;

#[test]
fn nlen_past_file_end_is_invalid() {
    let mut file = vec![0u8; 64];
    file[0] = 0xFF;
    file[1] = 0xFF;
    match unwrap_type4_file(&file) {
        Err(Error::Parse(ParseError::InvalidLength { nlen: 0xFFFF, available: 62 })) => {}
        other => panic!("expected InvalidLength, got {:?}", other),
    }
}

#[test]
fn empty_file_is_invalid() {
    assert!(unwrap_type4_file(&[0u8; 32]).is_err());
    assert!(unwrap_type4_file(&[0x00]).is_err());
}

#[test]
fn capacity_must_hold_nlen_and_message() {
    let rec = encode_mime_record("a/b", b"payload").unwrap();
    assert!(wrap_type4_file(rec.len() + 2, &rec).is_ok());
    assert!(matches!(
        wrap_type4_file(rec.len() + 1, &rec),
        Err(Error::Encoding(EncodingError::ContentTooLarge { .. }))
    ));
}

proptest! {
    #[test]
    fn envelope_round_trip(message in proptest::collection::vec(any::<u8>(), 1..600), slack in 0usize..100) {
        let file = wrap_type4_file(message.len() + 2 + slack, &message).unwrap();
        prop_assert_eq!(file.len(), message.len() + 2 + slack);
        prop_assert_eq!(unwrap_type4_file(&file).unwrap(), message.as_slice());
    }
}
