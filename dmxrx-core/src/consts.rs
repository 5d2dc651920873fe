//! DMX512 protocol and receiver constants

/// DMX512 baud rate (250 kbit/s)
pub const DMX_BAUDRATE: u32 = 250_000;

/// Maximum channels per universe
pub const DMX_CHANNELS: usize = 512;

/// Start code + 512 channels
pub const DMX_PACKET_SIZE: usize = DMX_CHANNELS + 1;

/// Working buffer size: one extra byte for the UART break artifact
pub const DMX_BUFFER_SIZE: usize = DMX_PACKET_SIZE + 1;

/// Start code for standard dimmer data
pub const NULL_START_CODE: u8 = 0x00;

/// Minimum break time in microseconds
pub const DMX_BREAK_MIN_US: u32 = 88;

/// Minimum mark-after-break in microseconds
pub const DMX_MAB_MIN_US: u32 = 8;

/// Link is considered lost once no frame arrived for this long
pub const DMX_TIMEOUT_MS: u32 = 1000;

/// Rate anchor is moved at most once per window
pub const RATE_WINDOW_MS: u32 = 1000;

/// `time_since_last_packet` result when no frame was ever published
pub const NEVER_RECEIVED: u32 = u32::MAX;

/// Default UART peripheral
pub const DEFAULT_PERIPHERAL: u8 = 2;

/// Default GPIO for UART RX (RS-485 RO)
pub const DEFAULT_RX_PIN: u8 = 6;

/// Default GPIO for UART TX (RS-485 DI, unused while receiving)
pub const DEFAULT_TX_PIN: u8 = 4;

/// Default GPIO for RS-485 direction control (DE/RE)
pub const DEFAULT_ENABLE_PIN: u8 = 5;
