//! Break alignment for UARTs that strip the break character
//!
//! The frame extractor expects every frame to open with the break
//! character the UART latched, and trims it on the next break. Drivers
//! that report a break as an error and hand back only the bytes around
//! it (embassy-rp's `read_to_break`, for one) never deliver that byte.
//! [`BreakAlignedFeed`] puts it back: after each break it pushes
//! [`BREAK_CHARACTER`] so the next frame's working buffer reads
//! `[break, start code, ch1, ...]`.
//!
//! A line error in the middle of a frame loses an unknown number of
//! bytes. The feed then drops everything up to the next break instead of
//! publishing a frame with its channels shifted.

use dmxrx_core::{BreakOutcome, FrameExtractor};
use dmxrx_hal::ReceiveError;

/// Byte a UART latches while the line is held in break
pub const BREAK_CHARACTER: u8 = 0x00;

/// Feeds break-terminated reads into a [`FrameExtractor`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BreakAlignedFeed {
    /// A break has been seen since the last loss of alignment
    synced: bool,
}

impl BreakAlignedFeed {
    /// Create a feed that waits for the first break
    pub const fn new() -> Self {
        Self { synced: false }
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Bytes received up to a break, followed by the break
    ///
    /// Returns `None` while the feed is still looking for its first break;
    /// the bytes are dropped in that case.
    pub fn frame_ended(
        &mut self,
        extractor: &mut FrameExtractor<'_>,
        bytes: &[u8],
        now_ms: u32,
    ) -> Option<BreakOutcome> {
        let outcome = if self.synced {
            extractor.on_byte_available(&mut bytes.iter().copied());
            Some(extractor.on_break_detected(now_ms))
        } else {
            extractor.discard();
            None
        };

        extractor.push_byte(BREAK_CHARACTER);
        self.synced = true;
        outcome
    }

    /// Bytes received with no break yet
    ///
    /// Returns the number of bytes the extractor kept.
    pub fn bytes(&mut self, extractor: &mut FrameExtractor<'_>, bytes: &[u8]) -> usize {
        if !self.synced {
            return 0;
        }
        extractor.on_byte_available(&mut bytes.iter().copied())
    }

    /// Line condition reported without its position in the frame
    ///
    /// A break ends the frame like [`frame_ended`](Self::frame_ended)
    /// with no further bytes. Any other error is counted and drops the
    /// frame in progress until the next break.
    pub fn line_error(
        &mut self,
        extractor: &mut FrameExtractor<'_>,
        error: ReceiveError,
        now_ms: u32,
    ) -> Option<BreakOutcome> {
        if error.is_break() {
            return self.frame_ended(extractor, &[], now_ms);
        }

        extractor.on_receive_error(error, now_ms);
        self.resync(extractor);
        None
    }

    /// Forget the current alignment and wait for the next break
    pub fn resync(&mut self, extractor: &mut FrameExtractor<'_>) {
        extractor.discard();
        self.synced = false;
    }
}
