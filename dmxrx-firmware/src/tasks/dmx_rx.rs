//! DMX UART receive task
//!
//! Producer context: reads the UART one break at a time and hands each
//! frame to the frame extractor.
//!
//! `read_to_break` DMAs bytes out of the UART FIFO in arrival order and
//! returns when the break that ends the frame reaches the FIFO. Bytes
//! that follow the break stay in the hardware FIFO until the next call,
//! so they can never be credited to the frame before it. If the task
//! falls behind far enough for the FIFO to overrun, the error comes back
//! from that read and the frame is dropped instead of published shifted.

use defmt::*;
use embassy_rp::uart::{Async, Error as UartError, ReadToBreakError, UartRx};
use portable_atomic::Ordering;

use dmxrx_core::{BreakOutcome, FrameExtractor, FrameStore};
use dmxrx_drivers::BreakAlignedFeed;
use dmxrx_hal::{Clock, ReceiveError};

use crate::board::RX_FRAME_BUF_SIZE;
use crate::channels::RX_ARMED;
use crate::platform::EmbassyClock;

/// DMX RX task - feeds break-delimited UART reads to the frame extractor
#[embassy_executor::task]
pub async fn dmx_rx_task(
    mut rx: UartRx<'static, Async>,
    buf: &'static mut [u8; RX_FRAME_BUF_SIZE],
    store: &'static FrameStore,
) {
    info!("DMX RX task started");

    let mut extractor = FrameExtractor::new(store);
    let mut feed = BreakAlignedFeed::new();
    let clock = EmbassyClock;

    loop {
        let result = rx.read_to_break(&mut buf[..]).await;

        // Port closed: keep the UART drained, deliver nothing
        if !RX_ARMED.load(Ordering::Acquire) {
            if feed.is_synced() {
                feed.resync(&mut extractor);
            }
            continue;
        }

        match result {
            Ok(n) => {
                let outcome = feed.frame_ended(&mut extractor, &buf[..n], clock.now_ms());
                log_outcome(outcome);
            }
            Err(ReadToBreakError::MissingBreak(n)) => {
                let kept = feed.bytes(&mut extractor, &buf[..n]);
                if kept < n && feed.is_synced() {
                    trace!("Working buffer full, dropped {} bytes", n - kept);
                }
            }
            Err(ReadToBreakError::Other(e)) => {
                let error = to_receive_error(e);
                let outcome = feed.line_error(&mut extractor, error, clock.now_ms());
                if error.is_break() {
                    log_outcome(outcome);
                } else {
                    warn!("UART receive error: {:?}, waiting for next break", error);
                }
            }
            #[allow(unreachable_patterns)]
            Err(_) => {
                feed.resync(&mut extractor);
            }
        }
    }
}

fn log_outcome(outcome: Option<BreakOutcome>) {
    match outcome {
        Some(BreakOutcome::Published { size, sequence }) => {
            trace!("Frame {}: {} bytes", sequence, size);
        }
        Some(BreakOutcome::Idle) => {}
        Some(BreakOutcome::Discarded) => {
            debug!("Frame discarded, no active session");
        }
        None => {
            debug!("Break found, frame alignment acquired");
        }
    }
}

fn to_receive_error(e: UartError) -> ReceiveError {
    match e {
        UartError::Break => ReceiveError::Break,
        UartError::Framing => ReceiveError::Framing,
        UartError::Parity => ReceiveError::Parity,
        UartError::Overrun => ReceiveError::Overrun,
        #[allow(unreachable_patterns)]
        _ => ReceiveError::Noise,
    }
}
