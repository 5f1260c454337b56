// Shared helpers for integration tests. Each test file pulls this module in
// with `#[path = "../common/mod.rs"] mod common;`.
#![allow(dead_code)]

pub mod fixtures;

use libnpscard::prelude::*;
use libnpscard::transport::SimulatedCard;

/// Route library logs to the test harness; repeated calls are harmless.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Start a tap with the default configuration.
pub fn connect(card: SimulatedCard, variant: LayoutVariant) -> PatientCard<SimulatedCard> {
    connect_with(card, variant, LayoutConfig::default())
}

pub fn connect_with(
    card: SimulatedCard,
    variant: LayoutVariant,
    config: LayoutConfig,
) -> PatientCard<SimulatedCard> {
    init_logger();
    PatientCard::connect(card, variant, config).expect("connect to simulated card")
}

/// End the tap and bring the card back into the field for the next one.
pub fn end_tap(card: PatientCard<SimulatedCard>) -> SimulatedCard {
    let mut sim = card.close();
    sim.new_tap();
    sim
}
