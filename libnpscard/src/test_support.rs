//! Test support helpers intended for use by unit and integration tests.
//!
//! These helpers centralize common simulated-card and mock-channel setup
//! so tests across the crate and tests/ directory can reuse the same logic.
#![allow(dead_code)]

use crate::card::PatientCard;
use crate::layout::{CardPayloads, LayoutConfig, LayoutVariant, Payload};
use crate::transport::{MockChannel, SimulatedCard};
use crate::Result;

/// Payloads used by most scenarios: a small XML summary and a short text.
#[doc(hidden)]
pub fn sample_payloads() -> CardPayloads {
    CardPayloads::new(
        Payload::new("application/x.nps+xml", "<nps><patient>Doe</patient></nps>"),
        Payload::new("text/plain", "allergies: none"),
    )
}

/// A payload of `len` bytes with a recognisable, non-zero pattern.
#[doc(hidden)]
pub fn patterned_payload(mime_type: &str, len: usize) -> Payload {
    let data = (0..len).map(|i| (i % 251) as u8 + 1).collect::<Vec<u8>>();
    Payload::new(mime_type, data)
}

/// Format a fresh simulated card with `variant` and `seed` in one tap and
/// return it ready for the next tap.
#[doc(hidden)]
pub fn provisioned_card(variant: LayoutVariant, seed: &CardPayloads) -> Result<SimulatedCard> {
    let mut card = PatientCard::connect(SimulatedCard::new(), variant, LayoutConfig::default())?;
    card.format(seed)?;
    let mut sim = card.close();
    sim.new_tap();
    Ok(sim)
}

/// Build a MockChannel pre-seeded with the given raw responses.
#[doc(hidden)]
pub fn mock_with_responses(responses: Vec<Vec<u8>>) -> MockChannel {
    MockChannel::with_responses(responses)
}

/// Push native DESFire responses (`payload`, `91 status`) onto a mock.
#[doc(hidden)]
pub fn seed_native(mock: &mut MockChannel, frames: &[(&[u8], u8)]) {
    for (payload, status) in frames {
        mock.push_native(payload, *status);
    }
}
