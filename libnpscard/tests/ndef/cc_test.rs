#[path = "../common/mod.rs"]
mod common;

use libnpscard::ndef::{CapabilityContainer, CcFileControlTlv};
use libnpscard::types::IsoFileId;
use libnpscard::{Error, ParseError};
use proptest::prelude::*;

fn nato_cc() -> CapabilityContainer {
    CapabilityContainer::new(vec![
        CcFileControlTlv {
            write_access: 0xFF,
            ..CcFileControlTlv::open(IsoFileId::NDEF_NPS, 0x0200)
        },
        CcFileControlTlv::open(IsoFileId::NDEF_EXTRA, 0x0080),
    ])
}

#[test]
fn two_tlv_container_bytes() {
    let bytes = nato_cc().encode().unwrap();
    assert_eq!(
        bytes,
        hex::decode("001720003B00340406E104020000FF0406E10500800000").unwrap()
    );
}

#[test]
fn padded_to_file_size() {
    let bytes = nato_cc().encode_padded(32).unwrap();
    assert_eq!(bytes.len(), 32);
    assert!(bytes[23..].iter().all(|&b| b == 0));
    assert!(nato_cc().encode_padded(16).is_err());
    assert_eq!(CapabilityContainer::decode(&bytes).unwrap(), nato_cc());
}

#[test]
fn rejects_bad_cclen_and_tags() {
    let mut bytes = nato_cc().encode().unwrap();
    bytes[1] = 0x16;
    assert!(matches!(
        CapabilityContainer::decode(&bytes),
        Err(Error::Parse(ParseError::InvalidCcLength { cclen: 0x16, .. }))
    ));

    let mut bytes = nato_cc().encode().unwrap();
    bytes[7] = 0x05;
    assert!(matches!(
        CapabilityContainer::decode(&bytes),
        Err(Error::Parse(ParseError::InvalidTlv { tag: 0x05, .. }))
    ));

    assert!(CapabilityContainer::new(Vec::new()).encode().is_err());
}

proptest! {
    #[test]
    fn cc_round_trip(
        sizes in proptest::collection::vec(any::<u16>(), 1..=2),
        write in prop_oneof![Just(0x00u8), Just(0xFFu8)],
    ) {
        let tlvs: Vec<_> = sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| CcFileControlTlv {
                write_access: write,
                ..CcFileControlTlv::open(IsoFileId::new(0xE104 + i as u16), size)
            })
            .collect();
        let cc = CapabilityContainer::new(tlvs);
        let bytes = cc.encode().unwrap();
        prop_assert_eq!(bytes.len(), CapabilityContainer::encoded_len(sizes.len()));
        prop_assert_eq!(u16::from_be_bytes([bytes[0], bytes[1]]) as usize, 7 + 8 * sizes.len());
        prop_assert_eq!(CapabilityContainer::decode(&bytes).unwrap(), cc);
    }

    #[test]
    fn decoding_arbitrary_bytes_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let _ = CapabilityContainer::decode(&bytes);
    }
}
