// libnpscard/src/card/mod.rs

//! Tap-scoped facade over a card channel.
//!
//! A [`PatientCard`] is created for one tap with [`PatientCard::connect`]
//! and dropped (or [`closed`](PatientCard::close)) when the card leaves the
//! field. Nothing learned about the card outlives it.

use crate::layout::{
    CardPayloads, DualLayout, Layout, LayoutConfig, LayoutVariant, NatoLayout, PayloadUpdate,
    PureLayout, ReadOutcome,
};
use crate::ndef::{IsoType4Writer, Type4NdefWriter};
use crate::session::{Session, SessionState};
use crate::transport::CardChannel;
use crate::types::{Aid, IsoFileId};
use crate::Result;
use log::{debug, info};

/// Run `$body` with `$layout` bound to the layout for `$variant`.
macro_rules! with_layout {
    ($card:ident, $variant:expr, |$layout:ident| $body:expr) => {
        match $variant {
            LayoutVariant::Pure => {
                let mut $layout = PureLayout::new(&$card.config);
                $body
            }
            LayoutVariant::Dual => {
                let mut $layout = DualLayout::new(&$card.config, &mut *$card.writer);
                $body
            }
            LayoutVariant::Nato => {
                let mut $layout = NatoLayout::new(&$card.config);
                $body
            }
        }
    };
}

/// A card in the field, read and written through one layout.
pub struct PatientCard<C: CardChannel> {
    session: Session<C>,
    variant: LayoutVariant,
    config: LayoutConfig,
    writer: Box<dyn Type4NdefWriter>,
}

impl<C: CardChannel> PatientCard<C> {
    /// Start a tap on an already connected channel.
    ///
    /// The PICC is selected once so a card that does not answer DESFire
    /// commands is rejected here rather than halfway through a write.
    pub fn connect(channel: C, variant: LayoutVariant, config: LayoutConfig) -> Result<Self> {
        let mut session = Session::with_timeout(channel, config.timeout_ms);
        session.select_application(Aid::PICC)?;
        let fid = config.dual.ndef.iso_file_id.unwrap_or(IsoFileId::NDEF_NPS);
        let writer = IsoType4Writer::new(fid).with_timeout(config.timeout_ms);
        debug!("connected, using {} layout", variant);
        Ok(Self {
            session,
            variant,
            config,
            writer: Box::new(writer),
        })
    }

    /// Replace the Type-4 writer used for the NDEF file of the Dual layout.
    pub fn with_type4_writer(mut self, writer: impl Type4NdefWriter + 'static) -> Self {
        self.writer = Box::new(writer);
        self
    }

    /// Layout used by [`read`](Self::read), [`write`](Self::write) and [`format`](Self::format).
    pub fn variant(&self) -> LayoutVariant {
        self.variant
    }

    /// Switch to another layout for the rest of the tap.
    pub fn set_variant(&mut self, variant: LayoutVariant) {
        self.variant = variant;
    }

    /// Configuration in use.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Selection and authentication state of the card.
    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Erase the card and provision the current layout with `seed`.
    pub fn format(&mut self, seed: &CardPayloads) -> Result<()> {
        info!("formatting card with {} layout", self.variant);
        let session = &mut self.session;
        with_layout!(self, self.variant, |layout| layout.format(session, seed))
    }

    /// Write the slots set in `update`, keeping the others.
    pub fn write(&mut self, update: &PayloadUpdate) -> Result<()> {
        let session = &mut self.session;
        with_layout!(self, self.variant, |layout| layout.write(session, update))
    }

    /// Read both payloads with the current layout.
    pub fn read(&mut self) -> Result<ReadOutcome<CardPayloads>> {
        self.read_as(self.variant)
    }

    fn read_as(&mut self, variant: LayoutVariant) -> Result<ReadOutcome<CardPayloads>> {
        let session = &mut self.session;
        with_layout!(self, variant, |layout| layout.read(session))
    }

    /// Whether the applications (and for Nato the files) of `variant` are
    /// present at all.
    fn may_hold(&mut self, variant: LayoutVariant, apps: &[Aid]) -> Result<bool> {
        let required: &[Aid] = match variant {
            LayoutVariant::Pure => &[Aid::PRIVATE],
            LayoutVariant::Dual => &[Aid::NDEF, Aid::PRIVATE],
            LayoutVariant::Nato => &[Aid::NDEF],
        };
        if !required.iter().all(|aid| apps.contains(aid)) {
            return Ok(false);
        }
        if variant != LayoutVariant::Nato {
            return Ok(true);
        }
        // Dual also has an NDEF application, but no second NDEF file.
        self.session.select_application(Aid::NDEF)?;
        let files = self.session.file_ids()?;
        Ok(files.contains(&self.config.nato.extra.number))
    }

    /// Find the layout the card is provisioned with by reading it as Nato,
    /// Dual and Pure in turn.
    ///
    /// On success the facade switches to the detected layout and returns it
    /// together with the payloads read. `None` means no layout could read
    /// the card.
    pub fn detect_layout(&mut self) -> Result<Option<(LayoutVariant, CardPayloads)>> {
        self.session.select_application(Aid::PICC)?;
        let apps = self.session.application_ids()?;
        for variant in LayoutVariant::DETECTION_ORDER {
            if !self.may_hold(variant, &apps)? {
                debug!("skipping {} layout, its files are missing", variant);
                continue;
            }
            if let ReadOutcome::Found(payloads) = self.read_as(variant)? {
                info!("card holds {} layout", variant);
                self.variant = variant;
                return Ok(Some((variant, payloads)));
            }
        }
        Ok(None)
    }

    /// End the tap and hand the channel back.
    pub fn close(self) -> C {
        self.session.close()
    }
}
