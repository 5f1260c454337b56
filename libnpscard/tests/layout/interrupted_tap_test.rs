#[path = "../common/mod.rs"]
mod common;

use common::fixtures::{pattern, sample};
use libnpscard::prelude::*;
use libnpscard::transport::SimulatedCard;

#[test]
fn card_removed_mid_write_is_a_channel_error() {
    let mut card = common::connect(SimulatedCard::new(), LayoutVariant::Nato);
    card.format(&sample(LayoutVariant::Nato)).unwrap();
    let mut sim = common::end_tap(card);
    sim.remove_after(12);

    let mut card = common::connect(sim, LayoutVariant::Nato);
    let err = card
        .write(&PayloadUpdate::nps(common::fixtures::nps(&pattern(80))))
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Channel);
    assert!(matches!(err, Error::Channel(ChannelError::Disconnected)));
}

#[test]
fn format_recovers_after_interrupted_format() {
    let mut sim = SimulatedCard::new();
    sim.remove_after(8);
    let mut card = common::connect(sim, LayoutVariant::Dual);
    assert!(card.format(&sample(LayoutVariant::Dual)).is_err());
    let sim = common::end_tap(card);

    let mut card = common::connect(sim, LayoutVariant::Dual);
    card.format(&sample(LayoutVariant::Dual)).unwrap();
    assert_eq!(card.read().unwrap().found().unwrap(), sample(LayoutVariant::Dual));
}

#[test]
fn read_fails_hard_when_card_leaves() {
    let mut card = common::connect(SimulatedCard::new(), LayoutVariant::Pure);
    card.format(&sample(LayoutVariant::Pure)).unwrap();
    let mut sim = common::end_tap(card);
    sim.remove_after(2);

    let mut card = common::connect(sim, LayoutVariant::Pure);
    // disconnection is never mistaken for a foreign layout
    assert!(card.read().is_err());
}
