//! Hardware configuration types
//!
//! These types define which UART peripheral and which pins a receiver
//! session uses.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_ENABLE_PIN, DEFAULT_PERIPHERAL, DEFAULT_RX_PIN, DEFAULT_TX_PIN};

/// UART peripheral identifier (e.g. `1` for UART1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PeripheralId(pub u8);

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO pin number
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// RX and TX are assigned the same GPIO
    SamePin,
    /// Direction-control pin collides with RX or TX
    EnablePinConflict,
}

/// Receiver session configuration
///
/// Opaque to the framing logic: it is validated, then passed through to
/// the platform when the session is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReceiverConfig {
    /// UART peripheral to receive on
    pub peripheral: PeripheralId,
    /// GPIO connected to the transceiver's RO output
    pub rx_pin: PinConfig,
    /// GPIO connected to the transceiver's DI input (idle while receiving)
    pub tx_pin: PinConfig,
    /// GPIO connected to DE/RE, if the board has direction control
    pub enable_pin: Option<PinConfig>,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            peripheral: PeripheralId(DEFAULT_PERIPHERAL),
            rx_pin: PinConfig::new(DEFAULT_RX_PIN),
            tx_pin: PinConfig::new(DEFAULT_TX_PIN),
            enable_pin: Some(PinConfig::new(DEFAULT_ENABLE_PIN)),
        }
    }
}

impl ReceiverConfig {
    /// Configuration without a direction-control pin
    pub const fn without_enable(peripheral: PeripheralId, rx_pin: u8, tx_pin: u8) -> Self {
        Self {
            peripheral,
            rx_pin: PinConfig::new(rx_pin),
            tx_pin: PinConfig::new(tx_pin),
            enable_pin: None,
        }
    }

    /// Check pin assignments for collisions
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rx_pin.pin == self.tx_pin.pin {
            return Err(ConfigError::SamePin);
        }

        if let Some(enable) = self.enable_pin {
            if enable.pin == self.rx_pin.pin || enable.pin == self.tx_pin.pin {
                return Err(ConfigError::EnablePinConflict);
            }
        }

        Ok(())
    }
}
