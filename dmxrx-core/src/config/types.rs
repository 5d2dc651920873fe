//! Application configuration types
//!
//! Runtime settings a firmware image reads from its configuration file,
//! as opposed to the board wiring in [`hardware`](super::hardware).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::DMX_CHANNELS;

/// Most channels the status report prints at once
pub const MAX_WATCH_CHANNELS: u16 = 32;

/// RS-485 transceiver settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rs485Config {
    /// DE/RE driven through an inverter (receive = HIGH)
    pub enable_inverted: bool,
}

/// Periodic status report settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatusConfig {
    /// Interval between status lines
    pub report_interval_ms: u32,
    /// First channel printed (1..=512)
    pub watch_start: u16,
    /// Number of channels printed
    pub watch_count: u16,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            report_interval_ms: 1000,
            watch_start: 1,
            watch_count: 8,
        }
    }
}

impl StatusConfig {
    /// Clamp the channel window to the universe and the print limit
    pub fn normalized(mut self) -> Self {
        self.watch_start = self.watch_start.clamp(1, DMX_CHANNELS as u16);
        let remaining = DMX_CHANNELS as u16 - self.watch_start + 1;
        self.watch_count = self.watch_count.min(remaining).min(MAX_WATCH_CHANNELS);
        self.report_interval_ms = self.report_interval_ms.max(100);
        self
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AppConfig {
    pub rs485: Rs485Config,
    pub status: StatusConfig,
}
