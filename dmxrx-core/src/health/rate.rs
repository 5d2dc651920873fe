//! Frame-rate estimation
//!
//! The rate is measured against an anchor sample `(time, frame count)`.
//! The anchor moves at most once per [`RATE_WINDOW_MS`]; queries in
//! between get a fresh estimate against the current anchor without
//! moving it. DMX sources nominally run at 40–44 Hz but jitter from
//! frame to frame, so a one-second baseline keeps the figure steady
//! while still following a real rate change within about a second.

use crate::consts::RATE_WINDOW_MS;

/// Snapshot of the frame counter at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RateSample {
    /// Time of the sample (ms)
    pub timestamp_ms: u32,
    /// Frame count at the sample
    pub sequence: u32,
}

/// Frames-per-second estimator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateEstimator {
    anchor: RateSample,
    /// False until the first estimate has been anchored
    anchored: bool,
    last_rate: f32,
}

impl Default for RateEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl RateEstimator {
    /// Create an estimator anchored at time zero
    pub const fn new() -> Self {
        Self {
            anchor: RateSample {
                timestamp_ms: 0,
                sequence: 0,
            },
            anchored: false,
            last_rate: 0.0,
        }
    }

    /// Restart estimation with `now_ms` as the time origin
    pub fn reset(&mut self, now_ms: u32) {
        *self = Self::new();
        self.anchor.timestamp_ms = now_ms;
    }

    /// Current anchor sample
    pub fn anchor(&self) -> RateSample {
        self.anchor
    }

    /// Estimate frames per second given the current frame count
    ///
    /// Returns 0 until at least one frame has been counted. The first
    /// estimate is taken against the session origin so a reading is
    /// available before a full window has passed; it is approximate.
    /// Once anchored, a count of 0 is a wrapped counter, not an idle line.
    pub fn estimate(&mut self, sequence: u32, now_ms: u32) -> f32 {
        if sequence == 0 && !self.anchored {
            return 0.0;
        }

        let elapsed = now_ms.wrapping_sub(self.anchor.timestamp_ms);

        if elapsed >= RATE_WINDOW_MS || !self.anchored {
            if elapsed == 0 {
                return 0.0;
            }
            let rate = frames_per_second(sequence.wrapping_sub(self.anchor.sequence), elapsed);
            self.anchor = RateSample {
                timestamp_ms: now_ms,
                sequence,
            };
            self.anchored = true;
            self.last_rate = rate;
            return rate;
        }

        // Queried again in the same millisecond the anchor moved
        if elapsed == 0 {
            return self.last_rate;
        }

        frames_per_second(sequence.wrapping_sub(self.anchor.sequence), elapsed)
    }
}

fn frames_per_second(frames: u32, elapsed_ms: u32) -> f32 {
    frames as f32 * 1000.0 / elapsed_ms as f32
}
