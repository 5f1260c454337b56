#[path = "../common/mod.rs"]
mod common;

use libnpscard::protocol::{Command, codec};
use libnpscard::types::{
    AccessRights, Aid, AppSettings, CommMode, FileNumber, IsoDf, IsoFileId, KeySettings,
};

#[test]
fn create_ndef_application_with_df_name() {
    let cmd = Command::CreateApplication {
        aid: Aid::NDEF,
        key_settings: KeySettings::DEFAULT,
        app_settings: AppSettings::des_iso(),
        key_count: 1,
        iso_df: Some(IsoDf::ndef()),
    };
    assert_eq!(cmd.ins(), 0xCA);
    assert!(cmd.tolerates_duplicate());
    assert_eq!(
        cmd.encode().unwrap(),
        hex::decode("0100000F2110E1D2760000850101").unwrap()
    );
}

#[test]
fn create_file_with_iso_fid() {
    let cmd = Command::CreateStdDataFile {
        file: FileNumber::try_from(2).unwrap(),
        iso_file_id: Some(IsoFileId::NDEF_NPS),
        comm_mode: CommMode::Plain,
        access_rights: AccessRights::free(),
        size: 0x0140,
    };
    // FID little-endian here, big-endian in the CC
    assert_eq!(
        cmd.encode().unwrap(),
        vec![0x02, 0x04, 0xE1, 0x00, 0xE0, 0xEE, 0x40, 0x01, 0x00]
    );
}

#[test]
fn read_and_write_offsets_are_three_byte_little_endian() {
    let read = Command::ReadData {
        file: FileNumber::try_from(1).unwrap(),
        offset: 0x000102,
        length: 0x34,
    };
    assert_eq!(read.encode().unwrap(), vec![0x01, 0x02, 0x01, 0x00, 0x34, 0x00, 0x00]);

    let write = Command::WriteData {
        file: FileNumber::try_from(3).unwrap(),
        offset: 52,
        data: vec![0xAA, 0xBB],
    };
    let frame = codec::encode_command_frame(&write).unwrap();
    assert_eq!(
        frame,
        vec![0x90, 0x3D, 0x00, 0x00, 0x09, 0x03, 0x34, 0x00, 0x00, 0x02, 0x00, 0x00, 0xAA, 0xBB, 0x00]
    );
}

#[test]
fn commands_without_body() {
    for (cmd, ins) in [
        (Command::FormatPicc, 0xFC),
        (Command::FreeMemory, 0x6E),
        (Command::GetApplicationIds, 0x6A),
        (Command::GetFileIds, 0x6F),
    ] {
        assert!(!cmd.tolerates_duplicate());
        assert_eq!(codec::encode_command_frame(&cmd).unwrap(), vec![0x90, ins, 0x00, 0x00, 0x00, 0x00]);
    }
}

#[test]
fn oversized_write_is_an_encoding_error() {
    let write = Command::WriteData {
        file: FileNumber::try_from(1).unwrap(),
        offset: 0,
        data: vec![0; 249],
    };
    assert!(write.encode().is_err());
}
