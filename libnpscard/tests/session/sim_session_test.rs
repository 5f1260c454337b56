#[path = "../common/mod.rs"]
mod common;

use libnpscard::prelude::*;
use libnpscard::transport::SimulatedCard;
use libnpscard::types::{AppSettings, KeySettings};

fn file(n: u8) -> FileNumber {
    FileNumber::try_from(n).unwrap()
}

fn app_with_protected_file(session: &mut Session<SimulatedCard>) {
    session.select_application(Aid::PICC).unwrap();
    session
        .create_application(Aid::PRIVATE, KeySettings::DEFAULT, AppSettings::des(), 1, None)
        .unwrap();
    session.select_application(Aid::PRIVATE).unwrap();
    // read free, everything else key 0
    session
        .create_standard_file(
            file(1),
            None,
            CommMode::Plain,
            AccessRights::new(AccessRights::KEY_FREE, 0x0, 0x0, 0x0),
            64,
        )
        .unwrap();
}

#[test]
fn protected_write_needs_authentication() {
    common::init_logger();
    let mut s = Session::new(SimulatedCard::new());
    app_with_protected_file(&mut s);

    assert_eq!(s.write_file(file(1), 0, b"abc").unwrap_err().card_status(), Some(0x9D));

    s.authenticate(&DesKey::DEFAULT, 0).unwrap();
    assert_eq!(s.state(), SessionState::AuthenticatedApp(Aid::PRIVATE));
    s.write_file(file(1), 0, b"abc").unwrap();
    assert_eq!(s.read_file(file(1), 0, 3).unwrap(), b"abc");
}

#[test]
fn selecting_again_drops_authentication() {
    let mut s = Session::new(SimulatedCard::new());
    app_with_protected_file(&mut s);
    s.authenticate(&DesKey::DEFAULT, 0).unwrap();
    s.select_application(Aid::PRIVATE).unwrap();
    assert_eq!(s.authenticated_key(), None);
    assert!(s.write_file(file(1), 0, b"x").is_err());
}

#[test]
fn create_is_idempotent() {
    let mut s = Session::new(SimulatedCard::new());
    app_with_protected_file(&mut s);
    app_with_protected_file(&mut s);
    assert_eq!(s.file_ids().unwrap(), vec![file(1)]);
    s.select_application(Aid::PICC).unwrap();
    assert_eq!(s.application_ids().unwrap(), vec![Aid::PRIVATE]);
}

#[test]
fn long_reads_are_reassembled() {
    let mut s = Session::new(SimulatedCard::new());
    app_with_protected_file(&mut s);
    s.authenticate(&DesKey::DEFAULT, 0).unwrap();
    let data = common::fixtures::pattern(52);
    s.write_file(file(1), 0, &data).unwrap();
    s.write_file(file(1), 52, &[0xEE; 12]).unwrap();
    let all = s.read_file(file(1), 0, 0).unwrap();
    assert_eq!(all.len(), 64);
    assert_eq!(&all[..52], data.as_slice());
}

#[test]
fn free_memory_shrinks_with_allocation() {
    let mut s = Session::new(SimulatedCard::new());
    s.select_application(Aid::PICC).unwrap();
    let before = s.free_memory().unwrap();
    app_with_protected_file(&mut s);
    s.select_application(Aid::PICC).unwrap();
    assert_eq!(s.free_memory().unwrap(), before - 32 - 64);
}

#[test]
fn format_wipes_applications() {
    let mut s = Session::new(SimulatedCard::new());
    app_with_protected_file(&mut s);
    s.select_application(Aid::PICC).unwrap();
    s.authenticate(&DesKey::DEFAULT, 0).unwrap();
    s.format_picc().unwrap();
    assert!(s.application_ids().unwrap().is_empty());
    assert!(s.select_application(Aid::PRIVATE).is_err());
}

#[test]
fn wrong_picc_key_cannot_format() {
    let card = SimulatedCard::new().with_picc_key(DesKey::from_bytes(*b"secret!!"));
    let mut s = Session::new(card);
    s.select_application(Aid::PICC).unwrap();
    assert!(s.authenticate(&DesKey::DEFAULT, 0).is_err());
    assert!(matches!(s.format_picc(), Err(Error::InvalidState { .. })));

    s.authenticate(&DesKey::from_bytes(*b"secret!!"), 0).unwrap();
    s.format_picc().unwrap();
}
