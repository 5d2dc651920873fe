//! Board wiring
//!
//! Reference board: RP2040 with a MAX485 on UART1.
//! RO → GPIO5 (UART1 RX), DI → GPIO4 (UART1 TX), DE/RE → GPIO6,
//! status LED on GPIO25.
//!
//! UART1 runs receive-only through embassy-rp's DMA `UartRx`, one
//! `read_to_break` per frame. The PL011 latches the break as a 0x00 with
//! its break flag set; `read_to_break` reports the break and hands back
//! only the bytes received before it, so that 0x00 never reaches the
//! extractor. The RX task restores it with `BreakAlignedFeed`, which keeps
//! the start code at slot 0 and channel N at slot N.

use embassy_rp::uart;

use dmxrx_core::config::{PeripheralId, PinConfig, ReceiverConfig, Rs485Config};
use dmxrx_core::consts::DMX_BUFFER_SIZE;
use dmxrx_hal::uart::{DataBits, Parity, StopBits};
use dmxrx_hal::UartConfig;

pub const DMX_PERIPHERAL: PeripheralId = PeripheralId(1);
pub const DMX_TX_PIN: u8 = 4;
pub const DMX_RX_PIN: u8 = 5;
pub const DMX_ENABLE_PIN: u8 = 6;

/// `read_to_break` target: a full packet plus slack for line noise
pub const RX_FRAME_BUF_SIZE: usize = DMX_BUFFER_SIZE + 64;

/// Receiver session configuration for this board
pub fn receiver_config(rs485: &Rs485Config) -> ReceiverConfig {
    ReceiverConfig {
        peripheral: DMX_PERIPHERAL,
        rx_pin: PinConfig::new(DMX_RX_PIN),
        tx_pin: PinConfig::new(DMX_TX_PIN),
        enable_pin: Some(PinConfig {
            pin: DMX_ENABLE_PIN,
            inverted: rs485.enable_inverted,
        }),
    }
}

/// Whether `config` describes this board's wiring
pub fn matches_wiring(config: &ReceiverConfig) -> bool {
    config.peripheral == DMX_PERIPHERAL
        && config.rx_pin.pin == DMX_RX_PIN
        && config.tx_pin.pin == DMX_TX_PIN
        && config.enable_pin.map_or(true, |pin| pin.pin == DMX_ENABLE_PIN)
}

/// DMX line settings translated to the RP2040 UART driver
pub fn uart_config() -> uart::Config {
    let dmx = UartConfig::dmx();

    let mut cfg = uart::Config::default();
    cfg.baudrate = dmx.baudrate;
    cfg.data_bits = match dmx.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    cfg.parity = match dmx.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    cfg.stop_bits = match dmx.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    cfg
}
