#[path = "../common/mod.rs"]
mod common;

use libnpscard::ndef::CapabilityContainer;
use libnpscard::prelude::*;
use libnpscard::transport::SimulatedCard;

#[test]
fn nps_a_extra_b() {
    let seed = CardPayloads::new(Payload::new("application/x.nps", "A"), Payload::new("application/x.extra", "B"));
    let mut card = common::connect(SimulatedCard::new(), LayoutVariant::Nato);
    card.format(&seed).unwrap();

    let read = card.read().unwrap().found().unwrap();
    assert_eq!(read.nps.data, b"A");
    assert_eq!(read.extra.data, b"B");

    let sim = card.close();
    let cc = CapabilityContainer::decode(sim.file_data(Aid::NDEF, 1).unwrap()).unwrap();
    assert_eq!(cc.tlvs.len(), 2);
    assert_eq!(cc.tlvs[0].iso_file_id, IsoFileId::NDEF_NPS);
    assert_eq!(cc.tlvs[0].write_access, 0xFF);
    assert_eq!(cc.tlvs[1].iso_file_id, IsoFileId::NDEF_EXTRA);
    assert_eq!(cc.tlvs[1].write_access, 0x00);
}

#[test]
fn cc_follows_file_growth() {
    let seed = CardPayloads::new(Payload::new("a/b", "A"), Payload::new("a/b", "B"));
    let mut card = common::connect(SimulatedCard::new(), LayoutVariant::Nato);
    card.format(&seed).unwrap();
    card.write(&PayloadUpdate::extra(Payload::new("a/b", vec![9u8; 500]))).unwrap();

    let sim = card.close();
    let cc = CapabilityContainer::decode(sim.file_data(Aid::NDEF, 1).unwrap()).unwrap();
    let extra = cc.tlv_for(IsoFileId::NDEF_EXTRA).unwrap();
    assert_eq!(extra.max_ndef_size as u32, sim.file_capacity(Aid::NDEF, 3).unwrap());
    assert!(extra.max_ndef_size >= 500);
}
