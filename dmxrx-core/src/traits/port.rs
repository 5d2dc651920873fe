//! Serial port session trait

use crate::config::ReceiverConfig;

/// Platform side of a receiver session
///
/// `open` configures the UART for DMX (see `dmxrx_hal::UartConfig::dmx`),
/// puts the transceiver in receive mode and arms delivery of byte and
/// break events to the session's `FrameExtractor`.
///
/// `close` disarms delivery. Once it returns, no producer callback for
/// this session may still be running or start later.
pub trait DmxPort {
    /// Error type for opening the port
    type Error;

    /// Start delivering producer events for `config`
    fn open(&mut self, config: &ReceiverConfig) -> Result<(), Self::Error>;

    /// Stop delivering producer events
    fn close(&mut self);
}
