//! Peripheral-keyed extractor registry
//!
//! For platforms whose interrupt API only accepts a plain function, the
//! handler cannot carry a receiver handle. Instead each receiver's
//! [`FrameExtractor`] is registered here under its peripheral id, and the
//! handler routes events with `REGISTRY.on_bytes(id, ..)` /
//! `REGISTRY.on_break(id, ..)`.
//!
//! An event checks the extractor out of its slot, runs it, and puts it
//! back. Only the check-out and the check-in hold the registry lock; the
//! byte drain itself runs unlocked, and the store's own critical section
//! covers nothing but the publish. While a slot is checked out, further
//! events for that peripheral are refused rather than queued.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Vec;

use dmxrx_hal::{ByteSource, ReceiveError};

use crate::config::PeripheralId;
use crate::frame::{BreakOutcome, FrameExtractor, FrameStore};

/// Registry errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// All slots are taken
    Full,
    /// The peripheral already has an extractor
    AlreadyRegistered,
}

/// Registered extractor; `None` while an event is running it
type Slot = (PeripheralId, Option<FrameExtractor<'static>>);

/// Fixed-capacity map from peripheral id to extractor
pub struct ReceiverRegistry<const N: usize> {
    slots: Mutex<RefCell<Vec<Slot, N>>>,
}

impl<const N: usize> Default for ReceiverRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ReceiverRegistry<N> {
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(RefCell::new(Vec::new())),
        }
    }

    /// Route events for `peripheral` into `store`
    pub fn register(
        &self,
        peripheral: PeripheralId,
        store: &'static FrameStore,
    ) -> Result<(), RegistryError> {
        critical_section::with(|cs| {
            let mut slots = self.slots.borrow_ref_mut(cs);
            if slots.iter().any(|(id, _)| *id == peripheral) {
                return Err(RegistryError::AlreadyRegistered);
            }
            slots
                .push((peripheral, Some(FrameExtractor::new(store))))
                .map_err(|_| RegistryError::Full)
        })
    }

    /// Stop routing events for `peripheral`; returns false if it was unknown
    pub fn unregister(&self, peripheral: PeripheralId) -> bool {
        critical_section::with(|cs| {
            let mut slots = self.slots.borrow_ref_mut(cs);
            match slots.iter().position(|(id, _)| *id == peripheral) {
                Some(index) => {
                    slots.swap_remove(index);
                    true
                }
                None => false,
            }
        })
    }

    pub fn is_registered(&self, peripheral: PeripheralId) -> bool {
        critical_section::with(|cs| {
            self.slots
                .borrow_ref(cs)
                .iter()
                .any(|(id, _)| *id == peripheral)
        })
    }

    /// Byte-available event
    ///
    /// `None` if `peripheral` is not registered or its extractor is
    /// already running; the source is left undrained in that case.
    pub fn on_bytes<S: ByteSource + ?Sized>(
        &self,
        peripheral: PeripheralId,
        source: &mut S,
    ) -> Option<usize> {
        self.with_extractor(peripheral, |extractor| {
            extractor.on_byte_available(source)
        })
    }

    /// Break event; `None` if `peripheral` is not registered or busy
    pub fn on_break(&self, peripheral: PeripheralId, now_ms: u32) -> Option<BreakOutcome> {
        self.with_extractor(peripheral, |extractor| extractor.on_break_detected(now_ms))
    }

    /// Line-error event; a break is routed like [`on_break`](Self::on_break)
    pub fn on_error(
        &self,
        peripheral: PeripheralId,
        error: ReceiveError,
        now_ms: u32,
    ) -> Option<BreakOutcome> {
        self.with_extractor(peripheral, |extractor| {
            extractor.on_receive_error(error, now_ms)
        })
        .flatten()
    }

    fn with_extractor<R>(
        &self,
        peripheral: PeripheralId,
        f: impl FnOnce(&mut FrameExtractor<'static>) -> R,
    ) -> Option<R> {
        let mut extractor = critical_section::with(|cs| {
            let mut slots = self.slots.borrow_ref_mut(cs);
            slots
                .iter_mut()
                .find(|(id, _)| *id == peripheral)
                .and_then(|(_, slot)| slot.take())
        })?;

        let result = f(&mut extractor);

        // Dropped if the peripheral was unregistered meanwhile
        critical_section::with(|cs| {
            let mut slots = self.slots.borrow_ref_mut(cs);
            if let Some((_, slot)) = slots.iter_mut().find(|(id, _)| *id == peripheral) {
                if slot.is_none() {
                    *slot = Some(extractor);
                }
            }
        });
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    /// Yields its bytes; on the first one, waits for a reader on another
    /// thread to get through the store
    struct ReadDuringDrain {
        store: &'static FrameStore,
        bytes: std::vec::IntoIter<u8>,
        reader_finished: Option<bool>,
    }

    impl Iterator for ReadDuringDrain {
        type Item = u8;

        fn next(&mut self) -> Option<u8> {
            if self.reader_finished.is_none() {
                let store = self.store;
                let (done_tx, done_rx) = mpsc::channel();
                thread::spawn(move || {
                    let _ = done_tx.send(store.read(1, 0));
                });
                self.reader_finished =
                    Some(done_rx.recv_timeout(Duration::from_secs(2)).is_ok());
            }
            self.bytes.next()
        }
    }

    #[test]
    fn test_routes_by_peripheral() {
        static STORE_A: FrameStore = FrameStore::new();
        static STORE_B: FrameStore = FrameStore::new();
        let registry: ReceiverRegistry<2> = ReceiverRegistry::new();

        STORE_A.begin(0);
        STORE_B.begin(0);
        registry.register(PeripheralId(1), &STORE_A).unwrap();
        registry.register(PeripheralId(2), &STORE_B).unwrap();

        let frame_a = [0xAA, 0x00, 11, 12];
        let frame_b = [0xAA, 0x00, 21];
        assert_eq!(
            registry.on_bytes(PeripheralId(1), &mut frame_a.iter().copied()),
            Some(4)
        );
        assert_eq!(
            registry.on_bytes(PeripheralId(2), &mut frame_b.iter().copied()),
            Some(3)
        );

        assert_eq!(
            registry.on_break(PeripheralId(1), 10),
            Some(BreakOutcome::Published {
                size: 3,
                sequence: 1
            })
        );
        assert_eq!(
            registry.on_error(PeripheralId(2), ReceiveError::Break, 10),
            Some(BreakOutcome::Published {
                size: 2,
                sequence: 1
            })
        );

        assert_eq!(STORE_A.read(2, 10), 12);
        assert_eq!(STORE_B.read(1, 10), 21);
        assert_eq!(STORE_B.read(2, 10), 0);
    }

    #[test]
    fn test_unknown_peripheral_ignored() {
        let registry: ReceiverRegistry<1> = ReceiverRegistry::new();
        let mut source = [1u8, 2].into_iter();
        assert_eq!(registry.on_bytes(PeripheralId(3), &mut source), None);
        assert_eq!(registry.on_break(PeripheralId(3), 0), None);
        assert!(!registry.unregister(PeripheralId(3)));
    }

    #[test]
    fn test_capacity_and_duplicates() {
        static STORE: FrameStore = FrameStore::new();
        let registry: ReceiverRegistry<1> = ReceiverRegistry::new();

        registry.register(PeripheralId(1), &STORE).unwrap();
        assert_eq!(
            registry.register(PeripheralId(1), &STORE),
            Err(RegistryError::AlreadyRegistered)
        );
        assert_eq!(
            registry.register(PeripheralId(2), &STORE),
            Err(RegistryError::Full)
        );

        assert!(registry.unregister(PeripheralId(1)));
        assert!(!registry.is_registered(PeripheralId(1)));
        registry.register(PeripheralId(2), &STORE).unwrap();
        assert!(registry.is_registered(PeripheralId(2)));
    }

    #[test]
    fn test_drain_does_not_block_readers() {
        static STORE: FrameStore = FrameStore::new();
        let registry: ReceiverRegistry<1> = ReceiverRegistry::new();

        STORE.begin(0);
        registry.register(PeripheralId(1), &STORE).unwrap();

        let mut source = ReadDuringDrain {
            store: &STORE,
            bytes: std::vec![0xAA, 0x00, 1, 2, 3, 4].into_iter(),
            reader_finished: None,
        };
        assert_eq!(registry.on_bytes(PeripheralId(1), &mut source), Some(6));
        assert_eq!(source.reader_finished, Some(true));

        assert_eq!(
            registry.on_break(PeripheralId(1), 10),
            Some(BreakOutcome::Published {
                size: 5,
                sequence: 1
            })
        );
    }

    #[test]
    fn test_busy_slot_refuses_nested_event() {
        static STORE: FrameStore = FrameStore::new();
        let registry: ReceiverRegistry<1> = ReceiverRegistry::new();

        STORE.begin(0);
        registry.register(PeripheralId(1), &STORE).unwrap();

        let nested = registry.with_extractor(PeripheralId(1), |extractor| {
            extractor.push_byte(0x00);
            registry.on_break(PeripheralId(1), 5)
        });
        assert_eq!(nested, Some(None));

        // Extractor is back in its slot with the byte still pending
        assert_eq!(
            registry.on_break(PeripheralId(1), 6),
            Some(BreakOutcome::Published {
                size: 1,
                sequence: 1
            })
        );
    }

    #[test]
    fn test_errors_counted_per_store() {
        static STORE: FrameStore = FrameStore::new();
        let registry: ReceiverRegistry<1> = ReceiverRegistry::new();

        STORE.begin(0);
        registry.register(PeripheralId(1), &STORE).unwrap();
        assert_eq!(
            registry.on_error(PeripheralId(1), ReceiveError::Parity, 1),
            None
        );
        assert_eq!(STORE.error_count(), 1);
    }
}
