#[path = "../common/mod.rs"]
mod common;

use common::fixtures::{extra, nps, pattern, payloads_for, sample};
use libnpscard::prelude::*;
use libnpscard::transport::SimulatedCard;

fn nps_file(variant: LayoutVariant) -> (Aid, u8) {
    match variant {
        LayoutVariant::Pure => (Aid::PRIVATE, 1),
        LayoutVariant::Dual | LayoutVariant::Nato => (Aid::NDEF, 2),
    }
}

#[test]
fn oversized_payload_grows_the_file() {
    for variant in [LayoutVariant::Pure, LayoutVariant::Dual, LayoutVariant::Nato] {
        let mut card = common::connect(SimulatedCard::new(), variant);
        card.format(&sample(variant)).unwrap();

        let big = payloads_for(variant, &pattern(1000), b"").nps;
        card.write(&PayloadUpdate::nps(big.clone())).unwrap();
        let read = card.read().unwrap().found().unwrap();
        assert_eq!(read.nps, big, "{}", variant);
        assert_eq!(read.extra, sample(variant).extra, "{}", variant);

        let (aid, file) = nps_file(variant);
        let sim = card.close();
        assert!(sim.file_capacity(aid, file).unwrap() >= 1000);
    }
}

#[test]
fn dual_extra_growth_keeps_the_summary() {
    let mut card = common::connect(SimulatedCard::new(), LayoutVariant::Dual);
    card.format(&sample(LayoutVariant::Dual)).unwrap();
    card.write(&PayloadUpdate::extra(extra(&pattern(300)))).unwrap();

    let read = card.read().unwrap().found().unwrap();
    assert_eq!(read.nps, sample(LayoutVariant::Dual).nps);
    assert_eq!(read.extra.data.len(), 300);

    let sim = card.close();
    // long-form record in the private file
    assert_eq!(sim.file_data(Aid::PRIVATE, 1).unwrap()[0], 0xC2);
}

#[test]
fn content_within_headroom_is_written_in_place() {
    let mut card = common::connect(SimulatedCard::new(), LayoutVariant::Nato);
    card.format(&sample(LayoutVariant::Nato)).unwrap();
    let mut sim = common::end_tap(card);
    sim.log.clear();

    let mut card = common::connect(sim, LayoutVariant::Nato);
    card.write(&PayloadUpdate::nps(nps(&pattern(60)))).unwrap();
    let sim = card.close();
    // no FormatPicc
    assert!(sim.log.iter().all(|frame| frame[1] != 0xFC));
}

#[test]
fn card_too_small_for_both_payloads() {
    let mut card = common::connect(SimulatedCard::new().with_memory(1024), LayoutVariant::Nato);
    card.format(&sample(LayoutVariant::Nato)).unwrap();
    match card.write(&PayloadUpdate::nps(nps(&pattern(2000)))) {
        Err(Error::Card(CardError::InsufficientMemory { available, .. })) => assert!(available <= 1024),
        other => panic!("expected InsufficientMemory, got {:?}", other),
    }
}
