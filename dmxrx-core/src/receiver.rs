//! Consumer-side receiver API
//!
//! [`DmxReceiver`] owns the platform port and a clock, and serves reads
//! from a [`FrameStore`] that the producer-side [`FrameExtractor`]
//! publishes into. Every read is a pure function of the store and the
//! current time.
//!
//! [`FrameExtractor`]: crate::frame::FrameExtractor

use dmxrx_hal::Clock;

use crate::config::{ConfigError, ReceiverConfig};
use crate::consts::DMX_PACKET_SIZE;
use crate::frame::{FrameSnapshot, FrameStore, PublishedFrame};
use crate::traits::DmxPort;

/// Errors from [`DmxReceiver::initialize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError<E> {
    /// Configuration rejected before touching the port
    Config(ConfigError),
    /// The platform failed to open the port
    Port(E),
}

impl<E> From<ConfigError> for InitError<E> {
    fn from(e: ConfigError) -> Self {
        InitError::Config(e)
    }
}

/// DMX512 receiver session
pub struct DmxReceiver<'a, P: DmxPort, C: Clock> {
    store: &'a FrameStore,
    port: P,
    clock: C,
    config: Option<ReceiverConfig>,
}

impl<'a, P: DmxPort, C: Clock> DmxReceiver<'a, P, C> {
    /// Create an idle receiver; call [`initialize`](Self::initialize) to start
    pub fn new(store: &'a FrameStore, port: P, clock: C) -> Self {
        Self {
            store,
            port,
            clock,
            config: None,
        }
    }

    /// Start receiving with `config`
    ///
    /// An active session is torn down first. On error the receiver is
    /// left uninitialized.
    pub fn initialize(&mut self, config: ReceiverConfig) -> Result<(), InitError<P::Error>> {
        if self.is_initialized() {
            self.teardown();
        }

        config.validate()?;

        // The store must accept publishes before the first producer event
        self.store.begin(self.clock.now_ms());
        if let Err(e) = self.port.open(&config) {
            self.store.end();
            return Err(InitError::Port(e));
        }

        #[cfg(feature = "defmt")]
        defmt::info!("DMX receiver started on peripheral {}", config.peripheral.0);

        self.config = Some(config);
        Ok(())
    }

    /// Stop receiving; safe to call when not initialized
    pub fn teardown(&mut self) {
        let Some(_config) = self.config.take() else {
            return;
        };

        // No producer callback may run once the port is closed
        self.port.close();
        self.store.end();

        #[cfg(feature = "defmt")]
        defmt::info!("DMX receiver stopped on peripheral {}", _config.peripheral.0);
    }

    pub fn is_initialized(&self) -> bool {
        self.config.is_some()
    }

    /// Active session configuration
    pub fn config(&self) -> Option<&ReceiverConfig> {
        self.config.as_ref()
    }

    /// Store shared with the producer
    pub fn store(&self) -> &'a FrameStore {
        self.store
    }

    /// Value of one channel (1..=512), 0 if unavailable
    pub fn read(&self, channel: u16) -> u8 {
        self.store.read(channel, self.clock.now_ms())
    }

    /// Copy up to `count` channels starting at `start_channel` into `dest`
    ///
    /// Returns the number of channels copied.
    pub fn read_channels(&self, dest: &mut [u8], start_channel: u16, count: usize) -> usize {
        self.store
            .read_channels(dest, start_channel, count, self.clock.now_ms())
    }

    /// Whether a frame arrived within the last second
    pub fn is_connected(&self) -> bool {
        self.store.is_connected(self.clock.now_ms())
    }

    /// Milliseconds since the last frame, `NEVER_RECEIVED` if none
    pub fn time_since_last_packet(&self) -> u32 {
        self.store.time_since_last_packet(self.clock.now_ms())
    }

    pub fn packet_count(&self) -> u32 {
        self.store.packet_count()
    }

    pub fn error_count(&self) -> u32 {
        self.store.error_count()
    }

    /// Frames per second
    pub fn packet_rate(&self) -> f32 {
        self.store.packet_rate(self.clock.now_ms())
    }

    /// Size of the last frame including the start code
    pub fn last_packet_size(&self) -> u16 {
        self.store.last_packet_size()
    }

    /// Copy of the 513-byte frame buffer
    pub fn buffer(&self) -> [u8; DMX_PACKET_SIZE] {
        self.store.buffer()
    }

    /// Borrow the published frame for the duration of `f`
    pub fn with_frame<R>(&self, f: impl FnOnce(&PublishedFrame) -> R) -> R {
        self.store.with_frame(f)
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        self.store.snapshot()
    }
}

impl<P: DmxPort, C: Clock> Drop for DmxReceiver<'_, P, C> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PeripheralId;
    use crate::consts::{DMX_TIMEOUT_MS, NEVER_RECEIVED};
    use crate::frame::FrameExtractor;
    use core::cell::Cell;

    /// Manually advanced clock
    struct MockClock {
        now: Cell<u32>,
    }

    impl MockClock {
        fn new(now: u32) -> Self {
            Self {
                now: Cell::new(now),
            }
        }

        fn advance(&self, ms: u32) {
            self.now.set(self.now.get().wrapping_add(ms));
        }
    }

    impl Clock for MockClock {
        fn now_ms(&self) -> u32 {
            self.now.get()
        }
    }

    /// Mock port recording open/close calls
    #[derive(Default)]
    struct MockPort {
        opens: Cell<u32>,
        closes: Cell<u32>,
        fail: bool,
    }

    impl DmxPort for &MockPort {
        type Error = ();

        fn open(&mut self, _config: &ReceiverConfig) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.opens.set(self.opens.get() + 1);
            Ok(())
        }

        fn close(&mut self) {
            self.closes.set(self.closes.get() + 1);
        }
    }

    fn send_frame(extractor: &mut FrameExtractor<'_>, channels: &[u8], now: u32) {
        extractor.push_byte(0xAA); // break artifact
        extractor.push_byte(0x00);
        extractor.on_byte_available(&mut channels.iter().copied());
        extractor.on_break_detected(now);
    }

    #[test]
    fn test_not_ready_before_initialize() {
        let store = FrameStore::new();
        let port = MockPort::default();
        let clock = MockClock::new(10);
        let receiver = DmxReceiver::new(&store, &port, &clock);

        assert!(!receiver.is_initialized());
        assert_eq!(receiver.read(1), 0);
        assert!(!receiver.is_connected());
        assert_eq!(receiver.time_since_last_packet(), NEVER_RECEIVED);
        assert_eq!(receiver.packet_rate(), 0.0);
    }

    #[test]
    fn test_receive_and_read() {
        let store = FrameStore::new();
        let port = MockPort::default();
        let clock = MockClock::new(1000);
        let mut receiver = DmxReceiver::new(&store, &port, &clock);
        let mut extractor = FrameExtractor::new(&store);

        receiver.initialize(ReceiverConfig::default()).unwrap();
        assert_eq!(port.opens.get(), 1);
        assert_eq!(receiver.time_since_last_packet(), NEVER_RECEIVED);

        clock.advance(25);
        send_frame(&mut extractor, &[1, 2, 3, 4], clock.now_ms());

        assert!(receiver.is_connected());
        assert_eq!(receiver.read(2), 2);
        assert_eq!(receiver.last_packet_size(), 5);
        assert_eq!(receiver.packet_count(), 1);
        assert_eq!(receiver.time_since_last_packet(), 0);

        let mut buf = [0u8; 8];
        assert_eq!(receiver.read_channels(&mut buf, 2, 8), 3);
        assert_eq!(&buf[..3], &[2, 3, 4]);

        clock.advance(DMX_TIMEOUT_MS);
        assert!(!receiver.is_connected());
        assert_eq!(receiver.read(2), 0);
        assert_eq!(receiver.time_since_last_packet(), DMX_TIMEOUT_MS);
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let store = FrameStore::new();
        let port = MockPort::default();
        let clock = MockClock::new(0);
        let mut receiver = DmxReceiver::new(&store, &port, &clock);

        receiver.teardown();
        assert_eq!(port.closes.get(), 0);

        receiver.initialize(ReceiverConfig::default()).unwrap();
        receiver.teardown();
        receiver.teardown();
        assert_eq!(port.closes.get(), 1);
        assert!(!store.is_initialized());
    }

    #[test]
    fn test_reinitialize_tears_down_first() {
        let store = FrameStore::new();
        let port = MockPort::default();
        let clock = MockClock::new(0);
        let mut receiver = DmxReceiver::new(&store, &port, &clock);
        let mut extractor = FrameExtractor::new(&store);

        receiver.initialize(ReceiverConfig::default()).unwrap();
        clock.advance(10);
        send_frame(&mut extractor, &[7], clock.now_ms());
        assert_eq!(receiver.packet_count(), 1);

        let config = ReceiverConfig::without_enable(PeripheralId(1), 5, 4);
        receiver.initialize(config).unwrap();
        assert_eq!(port.opens.get(), 2);
        assert_eq!(port.closes.get(), 1);
        assert_eq!(receiver.config(), Some(&config));
        // Fresh session starts from zero
        assert_eq!(receiver.packet_count(), 0);
        assert_eq!(receiver.read(1), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let store = FrameStore::new();
        let port = MockPort::default();
        let clock = MockClock::new(0);
        let mut receiver = DmxReceiver::new(&store, &port, &clock);

        let config = ReceiverConfig::without_enable(PeripheralId(1), 4, 4);
        assert_eq!(
            receiver.initialize(config),
            Err(InitError::Config(ConfigError::SamePin))
        );
        assert!(!receiver.is_initialized());
        assert_eq!(port.opens.get(), 0);
    }

    #[test]
    fn test_port_failure_leaves_store_closed() {
        let store = FrameStore::new();
        let port = MockPort {
            fail: true,
            ..MockPort::default()
        };
        let clock = MockClock::new(0);
        let mut receiver = DmxReceiver::new(&store, &port, &clock);

        assert_eq!(
            receiver.initialize(ReceiverConfig::default()),
            Err(InitError::Port(()))
        );
        assert!(!receiver.is_initialized());
        assert!(!store.is_initialized());
    }

    #[test]
    fn test_drop_closes_port() {
        let store = FrameStore::new();
        let port = MockPort::default();
        let clock = MockClock::new(0);
        {
            let mut receiver = DmxReceiver::new(&store, &port, &clock);
            receiver.initialize(ReceiverConfig::default()).unwrap();
        }
        assert_eq!(port.closes.get(), 1);
        assert!(!store.is_initialized());
    }

    #[test]
    fn test_rate_at_steady_40hz() {
        let store = FrameStore::new();
        let port = MockPort::default();
        let clock = MockClock::new(0);
        let mut receiver = DmxReceiver::new(&store, &port, &clock);
        let mut extractor = FrameExtractor::new(&store);

        receiver.initialize(ReceiverConfig::default()).unwrap();
        assert_eq!(receiver.packet_rate(), 0.0);

        let mut rate = 0.0;
        for tick in 1..=200u32 {
            clock.advance(25);
            send_frame(&mut extractor, &[0u8; 16], clock.now_ms());
            if tick % 40 == 0 {
                rate = receiver.packet_rate();
            }
        }
        assert!((rate - 40.0).abs() < 0.5, "rate {rate}");
    }
}
