// libnpscard/src/transport/mock.rs

//! Scripted channel for unit tests.

use crate::transport::traits::CardChannel;
use crate::{ChannelError, Result};
use std::collections::VecDeque;

/// Mock channel for unit tests. It records sent commands and returns queued
/// responses; an empty queue behaves like a card that stopped answering.
#[derive(Debug, Default)]
pub struct MockChannel {
    /// Every command sent, in order.
    pub sent: Vec<Vec<u8>>,
    /// Responses still to be returned.
    pub responses: VecDeque<Vec<u8>>,
    /// Testing hook: fail the n-th transceive (0-based) with `Disconnected`.
    pub disconnect_at: Option<usize>,
}

impl MockChannel {
    /// Mock with no queued responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock returning `responses` in order.
    pub fn with_responses<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        Self {
            responses: responses.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Queue a raw response.
    pub fn push_response(&mut self, resp: Vec<u8>) {
        self.responses.push_back(resp);
    }

    /// Queue a native response: `payload || 91 status`.
    pub fn push_native(&mut self, payload: &[u8], status: u8) {
        let mut resp = payload.to_vec();
        resp.extend_from_slice(&[0x91, status]);
        self.responses.push_back(resp);
    }

    /// Instruction bytes of every command sent so far.
    pub fn sent_instructions(&self) -> Vec<u8> {
        self.sent.iter().filter_map(|c| c.get(1).copied()).collect()
    }
}

impl CardChannel for MockChannel {
    fn transceive(&mut self, command: &[u8], timeout_ms: u32) -> Result<Vec<u8>> {
        if self.disconnect_at == Some(self.sent.len()) {
            self.sent.push(command.to_vec());
            return Err(ChannelError::Disconnected.into());
        }
        self.sent.push(command.to_vec());
        self.responses
            .pop_front()
            .ok_or_else(|| ChannelError::Timeout { timeout_ms }.into())
    }
}
