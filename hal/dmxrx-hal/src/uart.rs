//! UART receive abstractions
//!
//! The receiver core is driven by a platform layer that owns the UART.
//! The platform hands the core whatever bytes it has drained from the
//! receive FIFO through [`ByteSource`], and reports line conditions
//! through [`ReceiveError`].

/// Source of bytes that are available right now
///
/// `try_read_byte` must never block: it returns `None` as soon as the
/// receive FIFO (or the platform's software buffer) is empty.
pub trait ByteSource {
    /// Take the next available byte, if any
    fn try_read_byte(&mut self) -> Option<u8>;
}

// Lets a platform feed a drained slice directly: `bytes.iter().copied()`
impl<I: Iterator<Item = u8>> ByteSource for I {
    fn try_read_byte(&mut self) -> Option<u8> {
        self.next()
    }
}

/// Receive-side line condition reported by the UART
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiveError {
    /// Line held low longer than a character time (DMX frame delimiter)
    Break,
    /// Stop bit not seen where expected
    Framing,
    /// Parity mismatch
    Parity,
    /// Receive FIFO overrun, bytes were lost
    Overrun,
    /// Noise detected on the line
    Noise,
}

impl ReceiveError {
    /// Whether this condition delimits a frame rather than signalling a fault
    pub fn is_break(&self) -> bool {
        matches!(self, ReceiveError::Break)
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl UartConfig {
    /// DMX512 line settings: 250 kbaud, 8N2
    pub const fn dmx() -> Self {
        Self {
            baudrate: 250_000,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::Two,
        }
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::dmx()
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
