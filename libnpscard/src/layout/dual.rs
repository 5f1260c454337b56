// libnpscard/src/layout/dual.rs

//! Dual layout: a standard Type-4 NDEF tag for the patient summary plus
//! a private application for the extra data.
//!
//! The NDEF application carries a one-TLV capability container and the
//! NDEF file `E104`, written through a [`Type4NdefWriter`] so phones and
//! readers without DESFire support can still read the summary. The extra
//! data sits in file 1 of the private application as a bare MIME record
//! (no NLEN) padded with zeros.

use super::{
    CardPayloads, Layout, LayoutConfig, LayoutVariant, PayloadUpdate, ReadOutcome, capacity_of,
    classify_read, create_file, format_card, payload_to_record, read_type4_payload, read_whole,
    record_to_payload, reformat_with, seed_fresh_slot, sync_capability_container, write_chunked,
};
use crate::constants::CC_FILE_SIZE_ONE_TLV;
use crate::layout::plan::CapacityPlanner;
use crate::ndef::{CapabilityContainer, CcFileControlTlv, Type4NdefWriter, type4_file_len};
use crate::session::Session;
use crate::transport::CardChannel;
use crate::types::{Aid, AppSettings, IsoDf, IsoFileId};
use crate::{ParseError, Result};
use log::debug;

/// Dual layout: NDEF file in the NDEF application, bare record in the private one.
pub struct DualLayout<'a> {
    config: &'a LayoutConfig,
    writer: &'a mut dyn Type4NdefWriter,
}

impl<'a> DualLayout<'a> {
    /// Layout whose NDEF file is written through `writer`.
    pub fn new(config: &'a LayoutConfig, writer: &'a mut dyn Type4NdefWriter) -> Self {
        Self { config, writer }
    }

    fn ndef_fid(&self) -> IsoFileId {
        self.config.dual.ndef.iso_file_id.unwrap_or(IsoFileId::NDEF_NPS)
    }

    fn capability_container(&self, ndef_capacity: u32) -> CapabilityContainer {
        let max = ndef_capacity.min(u16::MAX as u32) as u16;
        CapabilityContainer::new(vec![CcFileControlTlv::open(self.ndef_fid(), max)])
    }

    /// Create both applications and all three files unless they exist.
    /// Returns whether the NDEF file and the private file were newly
    /// created.
    fn provision<C: CardChannel>(
        &self,
        session: &mut Session<C>,
        ndef_cap: u32,
        private_cap: u32,
    ) -> Result<[bool; 2]> {
        let config = self.config;
        let files = &config.dual;

        session.select_application(Aid::PICC)?;
        session.create_application(
            Aid::NDEF,
            config.key_settings,
            AppSettings::des_iso(),
            1,
            Some(&IsoDf::ndef()),
        )?;
        session.create_application(Aid::PRIVATE, config.key_settings, AppSettings::des(), 1, None)?;

        session.select_application(Aid::NDEF)?;
        create_file(session, &files.cc, CC_FILE_SIZE_ONE_TLV)?;
        let ndef_fresh = create_file(session, &files.ndef, ndef_cap)?;

        session.select_application(Aid::PRIVATE)?;
        let private_fresh = create_file(session, &files.private, private_cap)?;
        Ok([ndef_fresh, private_fresh])
    }

    /// Store the bare record in the (selected) private application.
    fn write_private<C: CardChannel>(&self, session: &mut Session<C>, capacity: u32, record: &[u8]) -> Result<()> {
        let mut content = record.to_vec();
        content.resize(capacity as usize, 0x00);
        write_chunked(session, self.config, &self.config.dual.private, 0, &content)
    }

    /// Bring the CC in line with the NDEF file, then hand the message to the
    /// Type-4 writer.
    fn write_ndef<C: CardChannel>(
        &mut self,
        session: &mut Session<C>,
        capacity: u32,
        message: Option<&[u8]>,
    ) -> Result<()> {
        let cc = self.capability_container(capacity);
        session.select_application(Aid::NDEF)?;
        sync_capability_container(session, self.config, &self.config.dual.cc, &cc)?;
        if let Some(message) = message {
            session.write_type4_message(&mut *self.writer, message)?;
        }
        Ok(())
    }

    fn read_payloads<C: CardChannel>(&self, session: &mut Session<C>) -> Result<CardPayloads> {
        let files = &self.config.dual;
        session.select_application(Aid::NDEF)?;
        let cc = CapabilityContainer::decode(&read_whole(session, self.config, &files.cc)?)?;
        if cc.tlvs.len() != 1 {
            return Err(ParseError::UnsupportedTlvCount(cc.tlvs.len()).into());
        }
        let fid = self.ndef_fid();
        if cc.tlv_for(fid).is_none() {
            return Err(ParseError::MissingFileControl { fid }.into());
        }
        let nps = read_type4_payload(session, self.config, &files.ndef)?;

        session.select_application(Aid::PRIVATE)?;
        let record = read_whole(session, self.config, &files.private)?;
        let extra = record_to_payload(&record)?;
        Ok(CardPayloads { nps, extra })
    }
}

impl Layout for DualLayout<'_> {
    fn variant(&self) -> LayoutVariant {
        LayoutVariant::Dual
    }

    fn format<C: CardChannel>(&mut self, session: &mut Session<C>, seed: &CardPayloads) -> Result<()> {
        let planner = CapacityPlanner::from_config(self.config);
        let nps = payload_to_record(self.config, &seed.nps)?;
        let extra = payload_to_record(self.config, &seed.extra)?;
        let ndef_cap = planner.plan_ndef(nps.len())?;
        let private_cap = planner.plan_data(extra.len())?;

        format_card(session, self.config)?;
        self.provision(session, ndef_cap, private_cap)?;
        // provision leaves the private application selected
        self.write_private(session, private_cap, &extra)?;
        self.write_ndef(session, ndef_cap, Some(&nps))
    }

    fn write<C: CardChannel>(&mut self, session: &mut Session<C>, update: &PayloadUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }
        let config = self.config;
        let planner = CapacityPlanner::from_config(config);
        let mut nps = update.nps.as_ref().map(|p| payload_to_record(config, p)).transpose()?;
        let mut extra = update.extra.as_ref().map(|p| payload_to_record(config, p)).transpose()?;

        let [ndef_fresh, private_fresh] = self.provision(
            session,
            planner.plan_ndef(nps.as_ref().map_or(0, Vec::len))?,
            planner.plan_data(extra.as_ref().map_or(0, Vec::len))?,
        )?;
        seed_fresh_slot(config, &mut nps, ndef_fresh)?;
        seed_fresh_slot(config, &mut extra, private_fresh)?;

        let private_cap = capacity_of(session, &config.dual.private)?;
        session.select_application(Aid::NDEF)?;
        let ndef_cap = capacity_of(session, &config.dual.ndef)?;

        let nps_fits = nps.as_ref().map_or(true, |m| type4_file_len(m.len()) <= ndef_cap as usize);
        let extra_fits = extra.as_ref().map_or(true, |r| r.len() <= private_cap as usize);
        if !(nps_fits && extra_fits) {
            return reformat_with(self, session, update);
        }

        debug!("dual layout: writing in place");
        if let Some(record) = &extra {
            session.select_application(Aid::PRIVATE)?;
            self.write_private(session, private_cap, record)?;
        }
        self.write_ndef(session, ndef_cap, nps.as_deref())
    }

    fn read<C: CardChannel>(&mut self, session: &mut Session<C>) -> Result<ReadOutcome<CardPayloads>> {
        let res = self.read_payloads(session);
        classify_read(LayoutVariant::Dual, res)
    }
}
