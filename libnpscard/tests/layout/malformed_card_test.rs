#[path = "../common/mod.rs"]
mod common;

use libnpscard::prelude::*;
use libnpscard::transport::SimulatedCard;

fn small_files() -> LayoutConfig {
    LayoutConfig {
        min_capacity: 64,
        ..LayoutConfig::default()
    }
}

#[test]
fn nlen_past_end_of_file_is_not_this_layout() {
    let seed = CardPayloads::new(Payload::new("a/b", "A"), Payload::new("a/b", "B"));
    let mut card = common::connect_with(SimulatedCard::new(), LayoutVariant::Nato, small_files());
    card.format(&seed).unwrap();
    let mut sim = common::end_tap(card);
    assert_eq!(sim.file_capacity(Aid::NDEF, 2), Some(64));
    assert!(sim.overwrite_file(Aid::NDEF, 2, &[0xFF, 0xFF]));

    let mut card = common::connect_with(sim, LayoutVariant::Nato, small_files());
    match card.read().unwrap() {
        ReadOutcome::NotThisLayout(Error::Parse(ParseError::InvalidLength { nlen: 0xFFFF, available: 62 })) => {}
        other => panic!("expected InvalidLength, got {:?}", other),
    }
}

#[test]
fn garbage_cc_is_not_this_layout() {
    let mut card = common::connect(SimulatedCard::new(), LayoutVariant::Dual);
    card.format(&common::fixtures::sample(LayoutVariant::Dual)).unwrap();
    let mut sim = common::end_tap(card);
    assert!(sim.overwrite_file(Aid::NDEF, 1, &[0x00, 0x03, 0x20]));

    let mut card = common::connect(sim, LayoutVariant::Dual);
    let outcome = card.read().unwrap();
    assert!(!outcome.is_found());
}

#[test]
fn foreign_record_in_private_file() {
    let mut card = common::connect(SimulatedCard::new(), LayoutVariant::Dual);
    card.format(&common::fixtures::sample(LayoutVariant::Dual)).unwrap();
    let mut sim = common::end_tap(card);
    // a URI record
    assert!(sim.overwrite_file(Aid::PRIVATE, 1, &[0xD1, 0x01, 0x02, b'U', 0x04, b'x']));

    let mut card = common::connect(sim, LayoutVariant::Dual);
    match card.read().unwrap() {
        ReadOutcome::NotThisLayout(Error::Parse(ParseError::WrongTnf { tnf: 0x01 })) => {}
        other => panic!("expected WrongTnf, got {:?}", other),
    }
}

#[test]
fn pure_card_read_as_nato() {
    let mut card = common::connect(SimulatedCard::new(), LayoutVariant::Pure);
    card.format(&common::fixtures::sample(LayoutVariant::Pure)).unwrap();
    card.set_variant(LayoutVariant::Nato);
    match card.read().unwrap() {
        ReadOutcome::NotThisLayout(Error::Card(CardError::AppNotFound { .. })) => {}
        other => panic!("expected AppNotFound, got {:?}", other),
    }
}
