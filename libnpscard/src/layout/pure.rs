// libnpscard/src/layout/pure.rs

//! Pure layout: two raw data files in the private application.
//!
//! File 1 holds the patient summary, file 2 the extra data. Each file
//! starts with the payload length as three little-endian bytes, followed by
//! the payload and zero padding. There is no NDEF framing, so the media
//! type is not kept.

use super::{
    CardPayloads, Layout, LayoutConfig, LayoutVariant, Payload, PayloadUpdate, ReadOutcome,
    capacity_of, classify_read, create_file, format_card, read_whole, reformat_with, write_chunked,
};
use crate::constants::RAW_LENGTH_SIZE;
use crate::layout::config::FileSpec;
use crate::layout::plan::CapacityPlanner;
use crate::protocol::parser;
use crate::session::Session;
use crate::transport::CardChannel;
use crate::types::{Aid, AppSettings};
use crate::{ParseError, Result};
use log::debug;

/// Pure layout: two length-prefixed raw files in the private application.
pub struct PureLayout<'a> {
    config: &'a LayoutConfig,
}

impl<'a> PureLayout<'a> {
    /// Layout over `config`.
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self { config }
    }

    fn planner(&self) -> CapacityPlanner {
        CapacityPlanner::from_config(self.config)
    }

    fn plan(&self, data_len: usize) -> Result<u32> {
        self.planner().plan_data(RAW_LENGTH_SIZE + data_len)
    }

    /// Create the application and both files unless they exist; leaves the
    /// private application selected.
    fn provision<C: CardChannel>(&self, session: &mut Session<C>, capacities: [u32; 2]) -> Result<()> {
        let files = &self.config.pure;
        session.select_application(Aid::PICC)?;
        session.create_application(Aid::PRIVATE, self.config.key_settings, AppSettings::des(), 1, None)?;
        session.select_application(Aid::PRIVATE)?;
        create_file(session, &files.historic, capacities[0])?;
        create_file(session, &files.current, capacities[1])?;
        Ok(())
    }

    fn store<C: CardChannel>(
        &self,
        session: &mut Session<C>,
        spec: &FileSpec,
        capacity: u32,
        data: &[u8],
    ) -> Result<()> {
        // capacity is at most MAX_U24, so the length fits three bytes
        let mut content = Vec::with_capacity(capacity as usize);
        content.extend_from_slice(&parser::le_u24(data.len() as u32));
        content.extend_from_slice(data);
        content.resize(capacity as usize, 0x00);
        write_chunked(session, self.config, spec, 0, &content)
    }

    fn load<C: CardChannel>(&self, session: &mut Session<C>, spec: &FileSpec) -> Result<Payload> {
        let file = read_whole(session, self.config, spec)?;
        let length = parser::le_u24_at(&file, 0)? as usize;
        let available = file.len() - RAW_LENGTH_SIZE;
        if length > available {
            return Err(ParseError::InvalidDataLength { length, available }.into());
        }
        Ok(Payload::raw(&file[RAW_LENGTH_SIZE..RAW_LENGTH_SIZE + length]))
    }

    fn read_payloads<C: CardChannel>(&self, session: &mut Session<C>) -> Result<CardPayloads> {
        session.select_application(Aid::PRIVATE)?;
        let nps = self.load(session, &self.config.pure.historic)?;
        let extra = self.load(session, &self.config.pure.current)?;
        Ok(CardPayloads { nps, extra })
    }
}

impl Layout for PureLayout<'_> {
    fn variant(&self) -> LayoutVariant {
        LayoutVariant::Pure
    }

    fn format<C: CardChannel>(&mut self, session: &mut Session<C>, seed: &CardPayloads) -> Result<()> {
        let capacities = [self.plan(seed.nps.data.len())?, self.plan(seed.extra.data.len())?];
        format_card(session, self.config)?;
        self.provision(session, capacities)?;

        let files = &self.config.pure;
        self.store(session, &files.historic, capacities[0], &seed.nps.data)?;
        self.store(session, &files.current, capacities[1], &seed.extra.data)
    }

    fn write<C: CardChannel>(&mut self, session: &mut Session<C>, update: &PayloadUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }
        let len = |p: &Option<Payload>| p.as_ref().map_or(0, |p| p.data.len());
        self.provision(session, [self.plan(len(&update.nps))?, self.plan(len(&update.extra))?])?;

        let config = self.config;
        let files = &config.pure;
        let slots = [(&files.historic, &update.nps), (&files.current, &update.extra)];
        let mut targets = Vec::with_capacity(2);
        for (spec, payload) in slots {
            let Some(payload) = payload else { continue };
            let capacity = capacity_of(session, spec)?;
            if (capacity as usize) < RAW_LENGTH_SIZE + payload.data.len() {
                return reformat_with(self, session, update);
            }
            targets.push((spec, capacity, payload));
        }

        debug!("pure layout: writing {} file(s) in place", targets.len());
        for (spec, capacity, payload) in targets {
            self.store(session, spec, capacity, &payload.data)?;
        }
        Ok(())
    }

    fn read<C: CardChannel>(&mut self, session: &mut Session<C>) -> Result<ReadOutcome<CardPayloads>> {
        let res = self.read_payloads(session);
        classify_read(LayoutVariant::Pure, res)
    }
}
