//! State shared between tasks

use portable_atomic::AtomicBool;

use dmxrx_core::FrameStore;

/// Published DMX frame, written by the RX task, read by the receiver
pub static DMX_STORE: FrameStore = FrameStore::new();

/// Set while the receiver session has the port open
///
/// The RX task keeps draining the UART while this is clear but does not
/// hand anything to its extractor.
pub static RX_ARMED: AtomicBool = AtomicBool::new(false);
