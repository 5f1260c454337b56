#[path = "../common/mod.rs"]
mod common;

use libnpscard::protocol::{
    codec, decode_application_ids, decode_file_ids, decode_file_settings, decode_free_memory,
};
use libnpscard::types::{Aid, CommMode, FileNumber, FileType};
use libnpscard::{Error, ProtocolError};

#[test]
fn file_settings_of_standard_file() {
    let s = decode_file_settings(&common::fixtures::std_file_settings(448)).unwrap();
    assert_eq!(s.file_type, FileType::StandardData);
    assert_eq!(s.comm_mode, CommMode::Plain);
    assert_eq!(s.access_rights.to_le_bytes(), [0xE0, 0xEE]);
    assert_eq!(s.size, 448);
}

#[test]
fn short_file_settings_are_rejected() {
    match decode_file_settings(&[0x00, 0x00, 0xE0]) {
        Err(Error::Protocol(ProtocolError::UnexpectedLength { expected: 7, actual: 3 })) => {}
        other => panic!("expected UnexpectedLength, got {:?}", other),
    }
}

#[test]
fn application_ids_are_little_endian() {
    let ids = decode_application_ids(&[0x01, 0x00, 0x00, 0x44, 0x55, 0x66]).unwrap();
    assert_eq!(ids, vec![Aid::NDEF, Aid::PRIVATE]);
    assert!(decode_application_ids(&[0x01, 0x00]).is_err());
}

#[test]
fn picc_level_responses() {
    assert_eq!(decode_free_memory(&[0x00, 0x10, 0x00]).unwrap(), 4096);
    assert_eq!(
        decode_file_ids(&[1, 2, 3]).unwrap(),
        vec![FileNumber::try_from(1).unwrap(), FileNumber::try_from(2).unwrap(), FileNumber::try_from(3).unwrap()]
    );
    assert!(decode_file_ids(&[0x20]).is_err());
}

#[test]
fn codec_decodes_frames() {
    let resp = codec::decode_response_frame(&common::fixtures::native(&[0x00, 0x10, 0x00], 0x00)).unwrap();
    assert!(resp.is_ok());
    assert_eq!(decode_free_memory(&resp.payload).unwrap(), 4096);
}
