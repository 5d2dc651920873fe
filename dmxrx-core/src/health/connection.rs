//! Connection liveness
//!
//! A link is live while the last published frame is younger than the
//! timeout. Timestamps come from a wrapping millisecond counter.

use crate::consts::{DMX_TIMEOUT_MS, NEVER_RECEIVED};

/// Liveness check against a fixed timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectionMonitor {
    timeout_ms: u32,
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionMonitor {
    /// Monitor with the standard DMX timeout
    pub const fn new() -> Self {
        Self {
            timeout_ms: DMX_TIMEOUT_MS,
        }
    }

    /// Timeout in milliseconds
    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Whether a frame published at `last_frame_ms` still counts as live
    ///
    /// An age of exactly the timeout is already disconnected.
    pub fn is_connected(&self, last_frame_ms: Option<u32>, now_ms: u32) -> bool {
        match last_frame_ms {
            Some(last) => now_ms.wrapping_sub(last) < self.timeout_ms,
            None => false,
        }
    }

    /// Age of the last frame, or [`NEVER_RECEIVED`] if there is none
    pub fn time_since(&self, last_frame_ms: Option<u32>, now_ms: u32) -> u32 {
        last_frame_ms.map_or(NEVER_RECEIVED, |last| now_ms.wrapping_sub(last))
    }
}
