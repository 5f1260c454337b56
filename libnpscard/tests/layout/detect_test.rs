#[path = "../common/mod.rs"]
mod common;

use common::fixtures::sample;
use libnpscard::prelude::*;
use libnpscard::test_support;
use libnpscard::transport::SimulatedCard;

#[test]
fn detects_and_switches_layout() {
    for variant in [LayoutVariant::Pure, LayoutVariant::Dual, LayoutVariant::Nato] {
        let sim = test_support::provisioned_card(variant, &sample(variant)).unwrap();
        let mut card = common::connect(sim, LayoutVariant::Nato);
        let (found, payloads) = card.detect_layout().unwrap().expect("layout detected");
        assert_eq!(found, variant);
        assert_eq!(payloads, sample(variant));

        // later writes use the detected layout
        card.write(&PayloadUpdate::extra(sample(variant).nps)).unwrap();
        assert_eq!(card.read().unwrap().found().unwrap().extra, sample(variant).nps);
    }
}

#[test]
fn externally_wiped_card_has_no_layout() {
    let mut sim = test_support::provisioned_card(LayoutVariant::Dual, &sample(LayoutVariant::Dual)).unwrap();
    sim.external_reformat();
    let mut card = common::connect(sim, LayoutVariant::Dual);
    assert!(card.detect_layout().unwrap().is_none());
    assert!(!card.read().unwrap().is_found());
}

#[test]
fn private_application_alone_is_not_pure() {
    let mut sim = test_support::provisioned_card(LayoutVariant::Dual, &sample(LayoutVariant::Dual)).unwrap();
    assert!(sim.remove_application(Aid::NDEF));
    let mut card = common::connect(sim, LayoutVariant::Dual);
    // Dual keeps a single file in the private application; Pure needs two
    assert!(card.detect_layout().unwrap().is_none());
}

#[test]
fn blank_card() {
    let mut card = common::connect(SimulatedCard::new(), LayoutVariant::Pure);
    assert!(card.detect_layout().unwrap().is_none());
}
