//! Frame extraction from a break-delimited byte stream
//!
//! Bytes are accumulated into a working buffer between breaks. A break
//! closes the frame in progress: the UART's break artifact is trimmed,
//! the rest is clamped to a full DMX packet and published.
//!
//! The receiving UART captures one extra byte right before the real
//! start code whenever it signals a break:
//! ```text
//! ┌──────────┬────────────┬─────┬─────┬─────┐
//! │ ARTIFACT │ START CODE │ CH1 │ CH2 │ ... │
//! └──────────┴────────────┴─────┴─────┴─────┘
//! ```
//! With two or more bytes buffered the first one is dropped. A single
//! buffered byte is published as-is.
//!
//! No start-code or length validation happens here; a frame with a
//! non-zero start code is published unchanged.

use heapless::Vec;

use dmxrx_hal::{ByteSource, ReceiveError};

use super::store::FrameStore;
use crate::consts::{DMX_BUFFER_SIZE, DMX_PACKET_SIZE};

/// What a break did with the frame in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BreakOutcome {
    /// No bytes were buffered, nothing to publish
    Idle,
    /// A frame was published
    Published {
        /// Bytes published (start code + channels)
        size: u16,
        /// Sequence count after this publish
        sequence: u32,
    },
    /// Bytes were buffered but no session is active
    Discarded,
}

/// Number of leading bytes to drop as break artifact
pub fn artifact_offset(buffered: usize) -> usize {
    if buffered >= 2 {
        1
    } else {
        0
    }
}

/// Producer-side framing state machine
///
/// Owned by the producer context. `&mut self` on every entry point
/// matches the platform guarantee that byte and break events are
/// delivered in sequence, never concurrently with themselves.
pub struct FrameExtractor<'a> {
    store: &'a FrameStore,
    buffer: Vec<u8, DMX_BUFFER_SIZE>,
    generation: u32,
}

impl<'a> FrameExtractor<'a> {
    /// Create an extractor publishing into `store`
    pub fn new(store: &'a FrameStore) -> Self {
        Self {
            store,
            buffer: Vec::new(),
            generation: store.generation(),
        }
    }

    /// Store this extractor publishes into
    pub fn store(&self) -> &'a FrameStore {
        self.store
    }

    /// Bytes buffered for the frame in progress
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the working buffer is full and further bytes are dropped
    pub fn is_full(&self) -> bool {
        self.buffer.is_full()
    }

    /// Drain every byte `source` has available
    ///
    /// Bytes beyond the working buffer capacity are consumed and dropped
    /// until the next break. Returns the number of bytes kept.
    pub fn on_byte_available<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> usize {
        self.sync_session();

        let mut kept = 0;
        while let Some(byte) = source.try_read_byte() {
            if self.buffer.push(byte).is_ok() {
                kept += 1;
            }
        }
        kept
    }

    /// Append a single byte, returning false if it was dropped
    pub fn push_byte(&mut self, byte: u8) -> bool {
        self.sync_session();
        self.buffer.push(byte).is_ok()
    }

    /// Drop the frame in progress without publishing it
    pub fn discard(&mut self) {
        self.sync_session();
        self.buffer.clear();
    }

    /// Close the frame in progress and start the next one
    pub fn on_break_detected(&mut self, now_ms: u32) -> BreakOutcome {
        self.sync_session();

        let outcome = if self.buffer.is_empty() {
            BreakOutcome::Idle
        } else {
            match self.store.publish(self.generation, self.frame_bytes(), now_ms) {
                Some((size, sequence)) => BreakOutcome::Published { size, sequence },
                None => BreakOutcome::Discarded,
            }
        };

        self.buffer.clear();
        outcome
    }

    /// Handle a line condition reported by the UART
    ///
    /// A break is a frame boundary; anything else is counted as a
    /// reception error and leaves the frame in progress alone.
    pub fn on_receive_error(&mut self, error: ReceiveError, now_ms: u32) -> Option<BreakOutcome> {
        if error.is_break() {
            return Some(self.on_break_detected(now_ms));
        }

        self.store.record_error();
        None
    }

    /// Buffered bytes minus the artifact, clamped to one packet
    fn frame_bytes(&self) -> &[u8] {
        let offset = artifact_offset(self.buffer.len());
        let len = (self.buffer.len() - offset).min(DMX_PACKET_SIZE);
        &self.buffer[offset..offset + len]
    }

    /// Drop bytes buffered before the store's current session started
    fn sync_session(&mut self) {
        let generation = self.store.generation();
        if generation != self.generation {
            self.buffer.clear();
            self.generation = generation;
        }
    }
}
