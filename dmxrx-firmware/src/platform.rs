//! Platform glue between embassy-rp and the receiver core

use embassy_rp::gpio::Output;
use embassy_time::Instant;
use portable_atomic::Ordering;

use dmxrx_core::{DmxPort, ReceiverConfig};
use dmxrx_drivers::Rs485Transceiver;
use dmxrx_hal::{Clock, OutputPin};

use crate::board;
use crate::channels::RX_ARMED;

/// Milliseconds from the embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        // Truncation wraps every ~49 days; consumers use wrapping_sub
        Instant::now().as_millis() as u32
    }
}

/// embassy-rp output driven through the HAL trait
pub struct GpioPin(Output<'static>);

impl GpioPin {
    pub fn new(output: Output<'static>) -> Self {
        Self(output)
    }
}

impl OutputPin for GpioPin {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_high()
    }
}

/// Errors opening the DMX port
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum PortError {
    /// Requested peripheral or pins are not the ones this board wires up
    WiringMismatch,
}

/// UART1 + RS-485 transceiver as a receiver port
///
/// The UART itself is configured once at boot; opening the port puts the
/// transceiver in receive mode and arms the RX task.
pub struct Rs485Port {
    transceiver: Rs485Transceiver<GpioPin>,
}

impl Rs485Port {
    pub fn new(transceiver: Rs485Transceiver<GpioPin>) -> Self {
        Self { transceiver }
    }
}

impl DmxPort for Rs485Port {
    type Error = PortError;

    fn open(&mut self, config: &ReceiverConfig) -> Result<(), PortError> {
        if !board::matches_wiring(config) {
            return Err(PortError::WiringMismatch);
        }

        self.transceiver.receive();
        RX_ARMED.store(true, Ordering::Release);
        Ok(())
    }

    fn close(&mut self) {
        // RX task and this call share one executor, so no extractor
        // callback can be in flight here
        RX_ARMED.store(false, Ordering::Release);
    }
}
