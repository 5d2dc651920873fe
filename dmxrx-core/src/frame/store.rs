//! Published frame store
//!
//! The handoff cell between the producer (break handling) and the
//! consumer (application reads). Frame data, size, timestamp and
//! sequence count are bundled in one record behind a single
//! critical-section mutex, so a reader sees the frame either as of the
//! previous publish or as of the next one, never a mix. Every critical
//! section here is a bounded byte copy plus a few field updates.

use core::cell::RefCell;

use critical_section::Mutex;
use portable_atomic::{AtomicU32, Ordering};

use crate::consts::{DMX_CHANNELS, DMX_PACKET_SIZE};
use crate::health::{ConnectionMonitor, RateEstimator};

const MONITOR: ConnectionMonitor = ConnectionMonitor::new();

/// Last fully extracted frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishedFrame {
    data: [u8; DMX_PACKET_SIZE],
    size: u16,
    timestamp_ms: Option<u32>,
    sequence: u32,
}

impl PublishedFrame {
    const fn new() -> Self {
        Self {
            data: [0; DMX_PACKET_SIZE],
            size: 0,
            timestamp_ms: None,
            sequence: 0,
        }
    }

    /// Raw frame buffer: start code followed by 512 channel slots
    ///
    /// Only the first [`size`](Self::size) bytes belong to the last frame.
    pub fn data(&self) -> &[u8; DMX_PACKET_SIZE] {
        &self.data
    }

    /// Valid bytes of the last frame (start code + channels), 0 if none yet
    pub fn size(&self) -> u16 {
        self.size
    }

    /// Start code of the last frame
    pub fn start_code(&self) -> Option<u8> {
        (self.size > 0).then(|| self.data[0])
    }

    /// Time of the last publish
    pub fn timestamp_ms(&self) -> Option<u32> {
        self.timestamp_ms
    }

    /// Frames published this session (wrapping)
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

/// Consistent copy of the published frame and its metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSnapshot {
    pub data: [u8; DMX_PACKET_SIZE],
    pub size: u16,
    pub timestamp_ms: Option<u32>,
    pub sequence: u32,
}

impl FrameSnapshot {
    /// Channel bytes carried by the frame (excluding the start code)
    pub fn channels(&self) -> &[u8] {
        let end = usize::from(self.size).max(1);
        &self.data[1..end]
    }
}

struct StoreState {
    initialized: bool,
    frame: PublishedFrame,
    error_count: u32,
    rate: RateEstimator,
}

impl StoreState {
    const fn new() -> Self {
        Self {
            initialized: false,
            frame: PublishedFrame::new(),
            error_count: 0,
            rate: RateEstimator::new(),
        }
    }

    fn is_live(&self, now_ms: u32) -> bool {
        self.initialized && MONITOR.is_connected(self.frame.timestamp_ms, now_ms)
    }
}

/// Frame store shared by the producer and consumer contexts
///
/// `const`-constructible so it can live in a `static`.
pub struct FrameStore {
    state: Mutex<RefCell<StoreState>>,
    /// Bumped on every session start; extractors drop stale bytes on change
    generation: AtomicU32,
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameStore {
    /// Create an uninitialized store
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(StoreState::new())),
            generation: AtomicU32::new(0),
        }
    }

    /// Start a session: clear everything and accept publishes
    pub fn begin(&self, now_ms: u32) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            *state = StoreState::new();
            state.rate.reset(now_ms);
            state.initialized = true;
            self.generation.fetch_add(1, Ordering::Release);
        });
    }

    /// End the session; reads return "no data" from now on
    ///
    /// History accessors (packet count, error count, last size) keep
    /// reporting the ended session until the next [`begin`](Self::begin).
    pub fn end(&self) {
        critical_section::with(|cs| {
            self.state.borrow_ref_mut(cs).initialized = false;
        });
    }

    /// Session generation counter
    pub fn generation(&self) -> u32 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn is_initialized(&self) -> bool {
        critical_section::with(|cs| self.state.borrow_ref(cs).initialized)
    }

    /// Publish a completed frame
    ///
    /// Copies at most [`DMX_PACKET_SIZE`] bytes. `generation` is the
    /// session the bytes were collected in. Returns the new
    /// `(size, sequence)`, or `None` if nothing was published because the
    /// frame is empty, no session is active, or a newer session started.
    pub(crate) fn publish(
        &self,
        generation: u32,
        frame: &[u8],
        now_ms: u32,
    ) -> Option<(u16, u32)> {
        let len = frame.len().min(DMX_PACKET_SIZE);
        if len == 0 {
            return None;
        }

        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            if !state.initialized || self.generation.load(Ordering::Acquire) != generation {
                return None;
            }

            let published = &mut state.frame;
            published.data[..len].copy_from_slice(&frame[..len]);
            published.size = len as u16;
            published.timestamp_ms = Some(now_ms);
            published.sequence = published.sequence.wrapping_add(1);
            Some((published.size, published.sequence))
        })
    }

    #[cfg(test)]
    pub(crate) fn seed_sequence(&self, sequence: u32) {
        critical_section::with(|cs| {
            self.state.borrow_ref_mut(cs).frame.sequence = sequence;
        });
    }

    /// Count a reception error other than break
    pub(crate) fn record_error(&self) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            state.error_count = state.error_count.wrapping_add(1);
        });
    }

    /// Value of one channel (1..=512)
    ///
    /// Returns 0 for an out-of-range channel, with no active session,
    /// while disconnected, or when the last frame was too short to carry
    /// the channel.
    pub fn read(&self, channel: u16, now_ms: u32) -> u8 {
        if channel == 0 || usize::from(channel) > DMX_CHANNELS {
            return 0;
        }

        critical_section::with(|cs| {
            let state = self.state.borrow_ref(cs);
            if !state.is_live(now_ms) || channel >= state.frame.size {
                return 0;
            }
            state.frame.data[usize::from(channel)]
        })
    }

    /// Copy up to `count` consecutive channels starting at `start_channel`
    ///
    /// `count` is further capped to `dest.len()` and to what the last
    /// frame carried. Returns the number of bytes written to the front of
    /// `dest`; the rest of `dest` is left untouched.
    pub fn read_channels(
        &self,
        dest: &mut [u8],
        start_channel: u16,
        count: usize,
        now_ms: u32,
    ) -> usize {
        if start_channel == 0 || usize::from(start_channel) > DMX_CHANNELS {
            return 0;
        }
        let start = usize::from(start_channel);
        let count = count.min(dest.len());

        critical_section::with(|cs| {
            let state = self.state.borrow_ref(cs);
            if !state.is_live(now_ms) {
                return 0;
            }

            let size = usize::from(state.frame.size);
            if size <= start {
                return 0;
            }

            let len = count.min(size - start);
            dest[..len].copy_from_slice(&state.frame.data[start..start + len]);
            len
        })
    }

    /// Whether a session is active and the last frame is recent
    pub fn is_connected(&self, now_ms: u32) -> bool {
        critical_section::with(|cs| self.state.borrow_ref(cs).is_live(now_ms))
    }

    /// Milliseconds since the last frame, [`NEVER_RECEIVED`] if none
    ///
    /// [`NEVER_RECEIVED`]: crate::consts::NEVER_RECEIVED
    pub fn time_since_last_packet(&self, now_ms: u32) -> u32 {
        critical_section::with(|cs| {
            let state = self.state.borrow_ref(cs);
            let last = state.frame.timestamp_ms.filter(|_| state.initialized);
            MONITOR.time_since(last, now_ms)
        })
    }

    /// Frames published this session
    pub fn packet_count(&self) -> u32 {
        critical_section::with(|cs| self.state.borrow_ref(cs).frame.sequence)
    }

    /// Reception errors other than break this session
    pub fn error_count(&self) -> u32 {
        critical_section::with(|cs| self.state.borrow_ref(cs).error_count)
    }

    /// Size of the last frame (1..=513), 0 before the first frame
    pub fn last_packet_size(&self) -> u16 {
        critical_section::with(|cs| self.state.borrow_ref(cs).frame.size)
    }

    /// Frames per second, see [`RateEstimator`]
    pub fn packet_rate(&self, now_ms: u32) -> f32 {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            if !state.initialized {
                return 0.0;
            }
            let sequence = state.frame.sequence;
            state.rate.estimate(sequence, now_ms)
        })
    }

    /// Run `f` against the published frame
    ///
    /// `f` runs inside the critical section and blocks the producer
    /// while it does; keep it short.
    pub fn with_frame<R>(&self, f: impl FnOnce(&PublishedFrame) -> R) -> R {
        critical_section::with(|cs| f(&self.state.borrow_ref(cs).frame))
    }

    /// Copy of the 513-byte frame buffer
    pub fn buffer(&self) -> [u8; DMX_PACKET_SIZE] {
        self.with_frame(|frame| frame.data)
    }

    /// Copy of the frame and its metadata, taken in one critical section
    pub fn snapshot(&self) -> FrameSnapshot {
        self.with_frame(|frame| FrameSnapshot {
            data: frame.data,
            size: frame.size,
            timestamp_ms: frame.timestamp_ms,
            sequence: frame.sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{DMX_TIMEOUT_MS, NEVER_RECEIVED};
    use proptest::prelude::*;

    fn full_frame() -> [u8; DMX_PACKET_SIZE] {
        let mut frame = [0u8; DMX_PACKET_SIZE];
        for (i, slot) in frame.iter_mut().enumerate().skip(1) {
            *slot = i as u8;
        }
        frame
    }

    fn live_store(frame: &[u8], now_ms: u32) -> FrameStore {
        let store = FrameStore::new();
        store.begin(0);
        store.publish(store.generation(), frame, now_ms);
        store
    }

    #[test]
    fn test_uninitialized_store_reads_nothing() {
        let store = FrameStore::new();
        assert!(!store.is_initialized());
        assert_eq!(store.publish(store.generation(), &[0, 1, 2], 10), None);
        assert_eq!(store.read(1, 10), 0);
        assert!(!store.is_connected(10));
        assert_eq!(store.time_since_last_packet(10), NEVER_RECEIVED);
        assert_eq!(store.packet_rate(10), 0.0);
        assert_eq!(store.packet_count(), 0);
    }

    #[test]
    fn test_start_code_and_first_channels() {
        let mut frame = [0u8; DMX_PACKET_SIZE];
        frame[0] = 0x00; // start code
        frame[1] = 0x00;
        frame[2] = 0xFF;
        let store = live_store(&frame, 100);

        assert_eq!(store.last_packet_size(), 513);
        assert_eq!(store.read(1, 100), 0x00);
        assert_eq!(store.read(2, 100), 0xFF);
        // 513 is not a channel
        assert_eq!(store.read(513, 100), 0);
    }

    #[test]
    fn test_short_frame_hides_trailing_channels() {
        let store = live_store(&full_frame(), 100);
        assert_eq!(store.read(300, 100), 300u16 as u8);

        store.publish(store.generation(), &[0x00, 0x11, 0x22, 0x33], 120);
        assert_eq!(store.last_packet_size(), 4);
        assert_eq!(store.read(3, 120), 0x33);
        // Stale bytes from the long frame are not reported
        assert_eq!(store.read(4, 120), 0);
        assert_eq!(store.read(300, 120), 0);
    }

    #[test]
    fn test_read_channels_tail_of_universe() {
        let store = live_store(&full_frame(), 100);
        let mut buf = [0xEEu8; 20];

        for _ in 0..2 {
            assert_eq!(store.read_channels(&mut buf, 500, 20, 100), 13);
            for (offset, value) in buf[..13].iter().enumerate() {
                assert_eq!(*value, (500 + offset) as u8);
            }
            assert!(buf[13..].iter().all(|&b| b == 0xEE));
        }
    }

    #[test]
    fn test_read_channels_rejects_bad_start() {
        let store = live_store(&full_frame(), 100);
        let mut buf = [0u8; 4];
        assert_eq!(store.read_channels(&mut buf, 0, 4, 100), 0);
        assert_eq!(store.read_channels(&mut buf, 513, 4, 100), 0);
    }

    #[test]
    fn test_read_channels_capped_by_destination() {
        let store = live_store(&full_frame(), 100);
        let mut buf = [0u8; 3];
        assert_eq!(store.read_channels(&mut buf, 10, 50, 100), 3);
        assert_eq!(buf, [10, 11, 12]);
    }

    #[test]
    fn test_read_channels_past_frame_end() {
        let store = live_store(&[0x00, 1, 2, 3], 100);
        let mut buf = [0u8; 8];
        assert_eq!(store.read_channels(&mut buf, 3, 8, 100), 1);
        assert_eq!(store.read_channels(&mut buf, 4, 8, 100), 0);
    }

    #[test]
    fn test_reads_gated_on_liveness() {
        let store = live_store(&full_frame(), 100);
        let mut buf = [0u8; 4];

        assert!(store.is_connected(100 + DMX_TIMEOUT_MS - 1));
        assert_eq!(store.read(1, 100 + DMX_TIMEOUT_MS - 1), 1);

        let stale = 100 + DMX_TIMEOUT_MS;
        assert!(!store.is_connected(stale));
        assert_eq!(store.read(1, stale), 0);
        assert_eq!(store.read_channels(&mut buf, 1, 4, stale), 0);
        // History is still reported
        assert_eq!(store.packet_count(), 1);
        assert_eq!(store.last_packet_size(), 513);
        assert_eq!(store.time_since_last_packet(stale), DMX_TIMEOUT_MS);
    }

    #[test]
    fn test_oversized_frame_clamped() {
        let long = [0x42u8; DMX_PACKET_SIZE + 10];
        let store = FrameStore::new();
        store.begin(0);
        assert_eq!(store.publish(store.generation(), &long, 5), Some((513, 1)));
    }

    #[test]
    fn test_empty_publish_changes_nothing() {
        let store = live_store(&[0x00, 7], 100);
        let before = store.snapshot();
        assert_eq!(store.publish(store.generation(), &[], 200), None);
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_end_and_begin() {
        let store = live_store(&full_frame(), 100);
        store.record_error();
        let generation = store.generation();

        store.end();
        assert!(!store.is_initialized());
        assert_eq!(store.read(1, 100), 0);
        assert_eq!(store.time_since_last_packet(100), NEVER_RECEIVED);
        assert_eq!(store.packet_count(), 1);
        assert_eq!(store.error_count(), 1);

        store.begin(500);
        assert_eq!(store.generation(), generation.wrapping_add(1));
        assert_eq!(store.packet_count(), 0);
        assert_eq!(store.error_count(), 0);
        assert_eq!(store.last_packet_size(), 0);
        assert_eq!(store.buffer(), [0u8; DMX_PACKET_SIZE]);
    }

    #[test]
    fn test_publish_from_previous_session_rejected() {
        let store = live_store(&[0x00, 1, 2], 100);
        let stale = store.generation();

        store.begin(200);
        assert_eq!(store.publish(stale, &[0x00, 9, 9], 210), None);
        assert_eq!(store.packet_count(), 0);
        assert_eq!(store.read(1, 210), 0);

        assert_eq!(
            store.publish(store.generation(), &[0x00, 5], 220),
            Some((2, 1))
        );
        assert_eq!(store.read(1, 220), 5);
    }

    #[test]
    fn test_sequence_wraps_past_max() {
        let store = live_store(&[0x00, 1], 100);
        store.seed_sequence(u32::MAX - 1);

        let generation = store.generation();
        assert_eq!(store.publish(generation, &[0x00, 2], 110), Some((2, u32::MAX)));
        assert_eq!(store.publish(generation, &[0x00, 3], 120), Some((2, 0)));
        assert_eq!(store.publish(generation, &[0x00, 4], 130), Some((2, 1)));

        assert_eq!(store.packet_count(), 1);
        assert!(store.is_connected(130));
        assert_eq!(store.read(1, 130), 4);
        assert_eq!(store.error_count(), 0);
    }

    #[test]
    fn test_snapshot_is_consistent() {
        let store = live_store(&[0x00, 9, 8, 7], 100);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.size, 4);
        assert_eq!(snapshot.sequence, 1);
        assert_eq!(snapshot.timestamp_ms, Some(100));
        assert_eq!(snapshot.channels(), &[9, 8, 7]);
        assert_eq!(store.with_frame(|f| f.start_code()), Some(0x00));
    }

    proptest! {
        #[test]
        fn prop_out_of_range_channel_reads_zero(channel in 513u16..=u16::MAX) {
            let store = live_store(&full_frame(), 100);
            prop_assert_eq!(store.read(channel, 100), 0);
            prop_assert_eq!(store.read(0, 100), 0);
        }

        #[test]
        fn prop_read_matches_published_frame(
            frame in proptest::collection::vec(any::<u8>(), 1..=DMX_PACKET_SIZE),
            channel in 1u16..=512,
        ) {
            let store = live_store(&frame, 100);
            let expected = if usize::from(channel) < frame.len() {
                frame[usize::from(channel)]
            } else {
                0
            };
            prop_assert_eq!(store.read(channel, 100), expected);
        }
    }
}
