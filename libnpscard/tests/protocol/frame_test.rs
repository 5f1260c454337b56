#[path = "../common/mod.rs"]
mod common;

use libnpscard::protocol::{DesfireStatus, Frame};
use libnpscard::{CardError, EncodingError, Error, ProtocolError};

#[test]
fn wraps_native_commands() {
    let frame = Frame::encode(0x5A, &[0x44, 0x55, 0x66]).unwrap();
    assert_eq!(frame, hex::decode("905A00000344556600").unwrap());

    // Lc = 0 is still sent for an empty body
    let frame = Frame::encode(0x6E, &[]).unwrap();
    assert_eq!(frame, hex::decode("906E00000000").unwrap());
}

#[test]
fn body_longer_than_lc_is_rejected() {
    match Frame::encode(0x3D, &[0u8; 256]) {
        Err(Error::Encoding(EncodingError::BodyTooLong { len: 256, max: 255 })) => {}
        other => panic!("expected BodyTooLong, got {:?}", other),
    }
}

#[test]
fn splits_payload_and_status() {
    let resp = Frame::decode(&common::fixtures::native(&[0x01, 0x02], 0xAF)).unwrap();
    assert_eq!(resp.payload, vec![0x01, 0x02]);
    assert!(resp.has_more());
    assert_eq!(resp.status(), DesfireStatus::AdditionalFrame);

    let resp = Frame::decode(&[0xDE]).unwrap();
    assert!(resp.payload.is_empty());
    assert_eq!(resp.status(), DesfireStatus::Duplicate);
}

#[test]
fn iso_status_word_is_a_card_error() {
    match Frame::decode(&[0x6A, 0x82]) {
        Err(Error::Card(CardError::IsoStatus { sw1: 0x6A, sw2: 0x82 })) => {}
        other => panic!("expected IsoStatus, got {:?}", other),
    }
    assert!(matches!(
        Frame::decode(&[]),
        Err(Error::Protocol(ProtocolError::EmptyResponse))
    ));
}

#[test]
fn status_table_round_trips_codes() {
    for code in [0x00, 0x0C, 0x0E, 0x1C, 0x1E, 0x40, 0x7E, 0x9D, 0x9E, 0xA0, 0xAE, 0xAF, 0xBE, 0xDE, 0xF0] {
        assert_eq!(DesfireStatus::from_code(code).code(), code);
    }
    assert!(DesfireStatus::Duplicate.is_success(true));
    assert!(!DesfireStatus::Duplicate.is_success(false));
    assert_eq!(DesfireStatus::from_code(0x55), DesfireStatus::Unknown(0x55));
}
