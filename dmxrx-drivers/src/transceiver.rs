//! RS-485 transceiver direction control
//!
//! DMX transceivers (MAX485 and friends) tie DE and /RE to one GPIO:
//! driven low the chip listens on the bus. Boards that put an inverter
//! in that line need the opposite level. The receiver never drives the
//! bus, so receive is the only direction this driver selects.

use dmxrx_hal::OutputPin;

/// RS-485 transceiver held in receive mode
pub struct Rs485Transceiver<P> {
    pin: P,
    /// If true, receive = pin HIGH
    inverted: bool,
}

impl<P: OutputPin> Rs485Transceiver<P> {
    /// Create a transceiver driver and put it in receive mode
    ///
    /// # Arguments
    /// - `pin`: The DE/RE pin
    /// - `inverted`: If true, the DE/RE line passes through an inverter
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut transceiver = Self { pin, inverted };
        transceiver.receive();
        transceiver
    }

    /// Create a driver for a directly wired (active-high DE) transceiver
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    /// Put the transceiver in receive mode
    pub fn receive(&mut self) {
        // Normal: receive → low. Inverted: receive → high.
        self.pin.set_state(self.inverted);
    }

    /// Whether the DE/RE pin is at the receive level
    pub fn is_receiving(&self) -> bool {
        self.pin.is_set_high() == self.inverted
    }

    /// Release the pin
    pub fn release(self) -> P {
        self.pin
    }
}
