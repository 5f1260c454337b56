#[path = "../common/mod.rs"]
mod common;

use common::fixtures::{payloads_for, sample};
use libnpscard::prelude::*;
use libnpscard::transport::SimulatedCard;

const ALL: [LayoutVariant; 3] = [LayoutVariant::Pure, LayoutVariant::Dual, LayoutVariant::Nato];

#[test]
fn format_then_write_twice_is_stable() {
    for variant in ALL {
        let seed = sample(variant);
        let mut card = common::connect(SimulatedCard::new(), variant);
        card.format(&seed).unwrap();

        let update = PayloadUpdate::from(payloads_for(variant, b"second version", b"more"));
        for _ in 0..2 {
            card.write(&update).unwrap();
            let read = card.read().unwrap().found().unwrap();
            assert_eq!(read, payloads_for(variant, b"second version", b"more"), "{}", variant);
        }
    }
}

#[test]
fn write_on_a_new_tap_reads_back() {
    for variant in ALL {
        let mut card = common::connect(SimulatedCard::new(), variant);
        card.format(&sample(variant)).unwrap();
        let sim = common::end_tap(card);

        let mut card = common::connect(sim, variant);
        card.write(&PayloadUpdate::from(payloads_for(variant, b"n", b"e"))).unwrap();
        let sim = common::end_tap(card);

        let mut card = common::connect(sim, variant);
        assert_eq!(card.read().unwrap().found().unwrap(), payloads_for(variant, b"n", b"e"));
    }
}

#[test]
fn write_provisions_a_blank_card() {
    for variant in ALL {
        let mut card = common::connect(SimulatedCard::new(), variant);
        let payloads = payloads_for(variant, b"fresh", b"card");
        card.write(&PayloadUpdate::from(payloads.clone())).unwrap();
        assert_eq!(card.read().unwrap().found().unwrap(), payloads, "{}", variant);
    }
}

#[test]
fn one_slot_write_on_a_blank_card_reads_back() {
    for variant in ALL {
        let written = payloads_for(variant, b"summary only", b"");
        let mut card = common::connect(SimulatedCard::new(), variant);
        card.write(&PayloadUpdate::nps(written.nps.clone())).unwrap();
        let read = card.read().unwrap().found().unwrap();
        assert_eq!(read.nps, written.nps, "{}", variant);
        assert!(read.extra.data.is_empty(), "{}", variant);

        let written = payloads_for(variant, b"", b"extra only");
        let mut card = common::connect(SimulatedCard::new(), variant);
        card.write(&PayloadUpdate::extra(written.extra.clone())).unwrap();
        let read = card.read().unwrap().found().unwrap();
        assert_eq!(read.extra, written.extra, "{}", variant);
        assert!(read.nps.data.is_empty(), "{}", variant);
    }
}

#[test]
fn one_slot_write_keeps_existing_content() {
    for variant in [LayoutVariant::Dual, LayoutVariant::Nato] {
        let mut card = common::connect(SimulatedCard::new(), variant);
        card.format(&sample(variant)).unwrap();
        let sim = common::end_tap(card);

        let mut card = common::connect(sim, variant);
        let written = payloads_for(variant, b"new summary", b"");
        card.write(&PayloadUpdate::nps(written.nps.clone())).unwrap();
        let read = card.read().unwrap().found().unwrap();
        assert_eq!(read.nps, written.nps, "{}", variant);
        assert_eq!(read.extra, sample(variant).extra, "{}", variant);
    }
}

#[test]
fn raw_payloads_ending_in_zero_round_trip() {
    // a gzip member ends in ISIZE, whose top byte is zero for small inputs
    let gzip_tail = [0x1F, 0x8B, 0x08, 0x00, 0x03, 0x00, 0x0C, 0x00, 0x00, 0x00];
    let payloads = payloads_for(LayoutVariant::Pure, &gzip_tail, &[0x00]);
    let mut card = common::connect(SimulatedCard::new(), LayoutVariant::Pure);
    card.format(&payloads).unwrap();
    let sim = common::end_tap(card);

    let mut card = common::connect(sim, LayoutVariant::Pure);
    assert_eq!(card.read().unwrap().found().unwrap(), payloads);
}

#[test]
fn file_counts_match_layout() {
    for variant in ALL {
        let mut card = common::connect(SimulatedCard::new(), variant);
        card.format(&sample(variant)).unwrap();
        let sim = card.close();
        let files: usize = sim
            .application_ids()
            .into_iter()
            .map(|aid| (1..=14).filter(|&n| sim.file_data(aid, n).is_some()).count())
            .sum();
        assert_eq!(files, variant.file_count(), "{}", variant);
    }
}

#[test]
fn missing_media_type_gets_the_default() {
    let mut card = common::connect(SimulatedCard::new(), LayoutVariant::Nato);
    card.format(&CardPayloads::new(Payload::raw(b"a".to_vec()), Payload::raw(b"b".to_vec())))
        .unwrap();
    let read = card.read().unwrap().found().unwrap();
    assert_eq!(read.nps.mime_type.as_deref(), Some("application/octet-stream"));
    assert_eq!(read.extra.data, b"b");
}

#[test]
fn cc_is_only_writable_with_the_application_key() {
    let mut card = common::connect(SimulatedCard::new(), LayoutVariant::Dual);
    card.format(&sample(LayoutVariant::Dual)).unwrap();
    let sim = card.close();
    let rights = sim.file_access_rights(Aid::NDEF, 1).unwrap();
    assert!(rights.allows_read(None));
    assert!(!rights.allows_write(None));
    assert!(rights.allows_write(Some(0)));
}

#[test]
fn custom_picc_key_is_used_for_format() {
    let key = DesKey::from_bytes([0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88]);
    let sim = SimulatedCard::new().with_picc_key(key);

    let mut card = common::connect(sim, LayoutVariant::Pure);
    let err = card.format(&sample(LayoutVariant::Pure)).unwrap_err();
    assert!(matches!(err, Error::Card(CardError::AuthFailed { key_number: 0, .. })));
    let sim = common::end_tap(card);

    let config = LayoutConfig {
        picc_key: key,
        ..LayoutConfig::default()
    };
    let mut card = common::connect_with(sim, LayoutVariant::Pure, config);
    card.format(&sample(LayoutVariant::Pure)).unwrap();
}
