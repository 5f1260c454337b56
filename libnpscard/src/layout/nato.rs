// libnpscard/src/layout/nato.rs

//! Nato layout: both payloads as Type-4 NDEF files of one application.
//!
//! The capability container lists two file control TLVs. `E104` holds
//! the patient summary and is advertised read-only (write access `0xFF`)
//! so generic NDEF writers leave it alone; `E105` holds the extra data and
//! is advertised writable. All writes go through native DESFire commands.

use super::{
    CardPayloads, Layout, LayoutConfig, LayoutVariant, PayloadUpdate, ReadOutcome, capacity_of,
    classify_read, create_file, format_card, payload_to_record, read_type4_payload, read_whole,
    reformat_with, seed_fresh_slot, sync_capability_container, write_type4_native,
};
use crate::constants::{CC_ACCESS_FREE, CC_ACCESS_NONE, CC_FILE_SIZE_TWO_TLV};
use crate::layout::plan::CapacityPlanner;
use crate::ndef::{CapabilityContainer, CcFileControlTlv, type4_file_len};
use crate::session::Session;
use crate::transport::CardChannel;
use crate::types::{Aid, AppSettings, IsoDf, IsoFileId};
use crate::{CardError, ParseError, Result};
use log::{debug, info};

/// Nato layout: both payloads as NDEF files of the NDEF application.
pub struct NatoLayout<'a> {
    config: &'a LayoutConfig,
}

impl<'a> NatoLayout<'a> {
    /// Layout over `config`.
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self { config }
    }

    fn fids(&self) -> (IsoFileId, IsoFileId) {
        let files = &self.config.nato;
        (
            files.nps.iso_file_id.unwrap_or(IsoFileId::NDEF_NPS),
            files.extra.iso_file_id.unwrap_or(IsoFileId::NDEF_EXTRA),
        )
    }

    fn capability_container(&self, nps_cap: u32, extra_cap: u32) -> CapabilityContainer {
        let (nps_fid, extra_fid) = self.fids();
        let clamp = |cap: u32| cap.min(u16::MAX as u32) as u16;
        CapabilityContainer::new(vec![
            CcFileControlTlv {
                write_access: CC_ACCESS_NONE,
                ..CcFileControlTlv::open(nps_fid, clamp(nps_cap))
            },
            CcFileControlTlv {
                write_access: CC_ACCESS_FREE,
                ..CcFileControlTlv::open(extra_fid, clamp(extra_cap))
            },
        ])
    }

    /// Create the NDEF application and its three files unless they exist;
    /// leaves the NDEF application selected. Returns which of the two
    /// payload files were newly created.
    fn provision<C: CardChannel>(
        &self,
        session: &mut Session<C>,
        nps_cap: u32,
        extra_cap: u32,
    ) -> Result<[bool; 2]> {
        let files = &self.config.nato;
        session.select_application(Aid::PICC)?;
        session.create_application(
            Aid::NDEF,
            self.config.key_settings,
            AppSettings::des_iso(),
            1,
            Some(&IsoDf::ndef()),
        )?;
        session.select_application(Aid::NDEF)?;
        create_file(session, &files.cc, CC_FILE_SIZE_TWO_TLV)?;
        Ok([
            create_file(session, &files.nps, nps_cap)?,
            create_file(session, &files.extra, extra_cap)?,
        ])
    }

    fn read_payloads<C: CardChannel>(&self, session: &mut Session<C>) -> Result<CardPayloads> {
        let files = &self.config.nato;
        session.select_application(Aid::NDEF)?;
        let cc = CapabilityContainer::decode(&read_whole(session, self.config, &files.cc)?)?;
        if cc.tlvs.len() != 2 {
            return Err(ParseError::UnsupportedTlvCount(cc.tlvs.len()).into());
        }
        let (nps_fid, extra_fid) = self.fids();
        for fid in [nps_fid, extra_fid] {
            if cc.tlv_for(fid).is_none() {
                return Err(ParseError::MissingFileControl { fid }.into());
            }
        }
        let nps = read_type4_payload(session, self.config, &files.nps)?;
        let extra = read_type4_payload(session, self.config, &files.extra)?;
        Ok(CardPayloads { nps, extra })
    }
}

impl Layout for NatoLayout<'_> {
    fn variant(&self) -> LayoutVariant {
        LayoutVariant::Nato
    }

    fn format<C: CardChannel>(&mut self, session: &mut Session<C>, seed: &CardPayloads) -> Result<()> {
        let config = self.config;
        let files = &config.nato;
        let planner = CapacityPlanner::from_config(config);
        let nps = payload_to_record(config, &seed.nps)?;
        let extra = payload_to_record(config, &seed.extra)?;
        let nps_cap = planner.plan_ndef(nps.len())?;
        let extra_cap = planner.plan_ndef(extra.len())?;

        format_card(session, config)?;
        let available = session.free_memory()?;
        let required = CC_FILE_SIZE_TWO_TLV + nps_cap + extra_cap;
        if required > available {
            return Err(CardError::InsufficientMemory { required, available }.into());
        }
        info!("nato layout: {} of {} free bytes planned", required, available);

        self.provision(session, nps_cap, extra_cap)?;
        let cc = self.capability_container(nps_cap, extra_cap);
        sync_capability_container(session, config, &files.cc, &cc)?;
        write_type4_native(session, config, &files.nps, nps_cap, &nps)?;
        write_type4_native(session, config, &files.extra, extra_cap, &extra)
    }

    fn write<C: CardChannel>(&mut self, session: &mut Session<C>, update: &PayloadUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }
        let config = self.config;
        let files = &config.nato;
        let planner = CapacityPlanner::from_config(config);
        let mut nps = update.nps.as_ref().map(|p| payload_to_record(config, p)).transpose()?;
        let mut extra = update.extra.as_ref().map(|p| payload_to_record(config, p)).transpose()?;

        let [nps_fresh, extra_fresh] = self.provision(
            session,
            planner.plan_ndef(nps.as_ref().map_or(0, Vec::len))?,
            planner.plan_ndef(extra.as_ref().map_or(0, Vec::len))?,
        )?;
        seed_fresh_slot(config, &mut nps, nps_fresh)?;
        seed_fresh_slot(config, &mut extra, extra_fresh)?;
        let nps_cap = capacity_of(session, &files.nps)?;
        let extra_cap = capacity_of(session, &files.extra)?;

        let fits = |message: &Option<Vec<u8>>, capacity: u32| {
            message
                .as_ref()
                .map_or(true, |m| type4_file_len(m.len()) <= capacity as usize)
        };
        if !(fits(&nps, nps_cap) && fits(&extra, extra_cap)) {
            return reformat_with(self, session, update);
        }

        debug!("nato layout: writing in place");
        let cc = self.capability_container(nps_cap, extra_cap);
        sync_capability_container(session, config, &files.cc, &cc)?;
        if let Some(message) = &nps {
            write_type4_native(session, config, &files.nps, nps_cap, message)?;
        }
        if let Some(message) = &extra {
            write_type4_native(session, config, &files.extra, extra_cap, message)?;
        }
        Ok(())
    }

    fn read<C: CardChannel>(&mut self, session: &mut Session<C>) -> Result<ReadOutcome<CardPayloads>> {
        let res = self.read_payloads(session);
        classify_read(LayoutVariant::Nato, res)
    }
}
