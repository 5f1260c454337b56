// libnpscard/src/transport/traits.rs

//! The channel trait.

use crate::Result;

/// Card channel abstracts the reader away from protocol and layout logic.
///
/// One call sends one command APDU and returns the complete response APDU
/// including its status word. Failures of the channel itself (timeouts,
/// a card leaving the field) are reported as [`crate::ChannelError`].
pub trait CardChannel {
    /// Send `command` and wait up to `timeout_ms` for the response.
    fn transceive(&mut self, command: &[u8], timeout_ms: u32) -> Result<Vec<u8>>;
}

impl<T: CardChannel + ?Sized> CardChannel for &mut T {
    fn transceive(&mut self, command: &[u8], timeout_ms: u32) -> Result<Vec<u8>> {
        (**self).transceive(command, timeout_ms)
    }
}

impl<T: CardChannel + ?Sized> CardChannel for Box<T> {
    fn transceive(&mut self, command: &[u8], timeout_ms: u32) -> Result<Vec<u8>> {
        (**self).transceive(command, timeout_ms)
    }
}
