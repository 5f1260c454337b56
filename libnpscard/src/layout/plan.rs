// libnpscard/src/layout/plan.rs

//! File capacity planning.

use crate::constants::{MAX_U24, NLEN_SIZE};
use crate::layout::config::LayoutConfig;
use crate::{EncodingError, Result};

/// Turns the bytes a file must hold into the capacity it is created with.
///
/// `capacity = max(round_up(required + headroom, alignment), minimum)`, so a
/// payload can grow by at least `headroom` bytes before the layout has to
/// be reformatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityPlanner {
    /// Spare bytes on top of the content.
    pub headroom: u32,
    /// Granularity of file sizes; at least 1.
    pub alignment: u32,
    /// Smallest capacity returned.
    pub minimum: u32,
}

impl CapacityPlanner {
    /// Planner with the sizing policy of `config`.
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            headroom: config.headroom,
            alignment: config.alignment.max(1),
            minimum: config.min_capacity,
        }
    }

    /// Capacity for a file holding `required` bytes, bounded by `limit`.
    pub fn plan(&self, required: usize, limit: u32) -> Result<u32> {
        let too_large = || EncodingError::ContentTooLarge {
            required,
            capacity: limit as usize,
        };
        let required = u32::try_from(required).map_err(|_| too_large())?;
        if required > limit {
            return Err(too_large().into());
        }
        let padded = required.saturating_add(self.headroom);
        let aligned = padded
            .div_ceil(self.alignment)
            .saturating_mul(self.alignment);
        Ok(aligned.max(self.minimum).min(limit))
    }

    /// Capacity for a raw data file.
    pub fn plan_data(&self, required: usize) -> Result<u32> {
        self.plan(required, MAX_U24)
    }

    /// Capacity for a Type-4 NDEF file; the CC records sizes as u16.
    pub fn plan_ndef(&self, message_len: usize) -> Result<u32> {
        self.plan(NLEN_SIZE + message_len, u16::MAX as u32)
    }
}
