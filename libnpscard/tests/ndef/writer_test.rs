#[path = "../common/mod.rs"]
mod common;

use libnpscard::ndef::{IsoType4Writer, Type4NdefWriter, encode_mime_record, unwrap_type4_file};
use libnpscard::prelude::*;
use libnpscard::transport::SimulatedCard;
use libnpscard::types::{AppSettings, IsoDf, KeySettings};
use std::cell::RefCell;
use std::rc::Rc;

fn ndef_app(session: &mut Session<SimulatedCard>, capacity: u32) {
    session.select_application(Aid::PICC).unwrap();
    session
        .create_application(Aid::NDEF, KeySettings::DEFAULT, AppSettings::des_iso(), 1, Some(&IsoDf::ndef()))
        .unwrap();
    session.select_application(Aid::NDEF).unwrap();
    session
        .create_standard_file(
            FileNumber::try_from(2).unwrap(),
            Some(IsoFileId::NDEF_NPS),
            CommMode::Plain,
            AccessRights::free(),
            capacity,
        )
        .unwrap();
}

#[test]
fn iso_writer_fills_the_ndef_file() {
    common::init_logger();
    let mut session = Session::new(SimulatedCard::new());
    ndef_app(&mut session, 192);

    let message = encode_mime_record("application/x.nps", &common::fixtures::pattern(100)).unwrap();
    let mut writer = IsoType4Writer::default();
    session.write_type4_message(&mut writer, &message).unwrap();
    assert_eq!(session.state(), SessionState::Disconnected);

    let card = session.close();
    let file = card.file_data(Aid::NDEF, 2).unwrap();
    assert_eq!(unwrap_type4_file(file).unwrap(), message.as_slice());
}

#[test]
fn iso_writer_stops_at_file_end() {
    let mut session = Session::new(SimulatedCard::new());
    ndef_app(&mut session, 32);
    let message = encode_mime_record("application/x.nps", &[1u8; 40]).unwrap();
    let mut writer = IsoType4Writer::default();
    let err = session.write_type4_message(&mut writer, &message).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Card);
}

/// Writer standing in for a platform NDEF stack.
struct CountingWriter {
    inner: IsoType4Writer,
    messages: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl Type4NdefWriter for CountingWriter {
    fn write_ndef_message(&mut self, channel: &mut dyn CardChannel, message: &[u8]) -> Result<()> {
        self.messages.borrow_mut().push(message.to_vec());
        self.inner.write_ndef_message(channel, message)
    }
}

#[test]
fn dual_layout_uses_the_supplied_writer() {
    let messages = Rc::new(RefCell::new(Vec::new()));
    let writer = CountingWriter {
        inner: IsoType4Writer::default(),
        messages: Rc::clone(&messages),
    };
    let mut card = common::connect(SimulatedCard::new(), LayoutVariant::Dual).with_type4_writer(writer);
    let seed = common::fixtures::sample(LayoutVariant::Dual);
    card.format(&seed).unwrap();

    let written = messages.borrow();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0], encode_mime_record(&seed.nps.mime_type.clone().unwrap(), &seed.nps.data).unwrap());
}
