// Provision, update and detect a patient card on the simulated DESFire card.
//
// Run with `RUST_LOG=debug cargo run --example simulated_tap` to follow the
// session; `trace` also prints every frame.

use anyhow::Context;
use libnpscard::prelude::*;
use libnpscard::transport::SimulatedCard;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let variant = match std::env::args().nth(1).as_deref() {
        Some("pure") => LayoutVariant::Pure,
        Some("dual") => LayoutVariant::Dual,
        _ => LayoutVariant::Nato,
    };

    let seed = CardPayloads::new(
        Payload::new("application/x.nps+xml", "<nps><patient>Doe</patient></nps>"),
        Payload::new("text/plain", "allergies: none"),
    );

    println!("Formatting simulated card with {} layout...", variant);
    let mut card = PatientCard::connect(SimulatedCard::new(), variant, LayoutConfig::default())
        .context("connecting to card")?;
    card.format(&seed).context("formatting card")?;
    let mut sim = card.close();
    sim.new_tap();

    println!("Writing a larger summary on a second tap...");
    let summary = format!("<nps>{}</nps>", "<entry/>".repeat(60));
    let mut card = PatientCard::connect(sim, variant, LayoutConfig::default())?;
    card.write(&PayloadUpdate::nps(Payload::new("application/x.nps+xml", summary)))
        .context("writing summary")?;
    let mut sim = card.close();
    sim.new_tap();

    println!("Detecting layout on a third tap...");
    let mut card = PatientCard::connect(sim, LayoutVariant::Pure, LayoutConfig::default())?;
    match card.detect_layout()? {
        Some((found, payloads)) => {
            println!("  layout: {}", found);
            for (name, p) in [("nps", &payloads.nps), ("extra", &payloads.extra)] {
                println!(
                    "  {}: {} bytes, type {}",
                    name,
                    p.data.len(),
                    p.mime_type.as_deref().unwrap_or("-")
                );
                println!("    {}", hex_preview(&p.data, 16));
            }
        }
        None => println!("  no patient-summary layout found"),
    }

    let sim = card.close();
    println!("Free memory left: {} bytes", sim.free_memory());
    Ok(())
}
