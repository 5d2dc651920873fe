//! dmxrx - DMX512 receiver firmware
//!
//! Main firmware binary for RP2040-based boards with an RS-485
//! transceiver on UART1. One task turns the UART byte stream into
//! frames, another consumes them and reports link status over defmt.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::{InterruptHandler as UartInterruptHandler, UartRx};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use dmxrx_core::config::toml::parse_config;
use dmxrx_core::{AppConfig, DmxReceiver};
use dmxrx_drivers::Rs485Transceiver;

use crate::channels::DMX_STORE;
use crate::platform::{EmbassyClock, GpioPin, Rs485Port};

/// Embedded configuration (compiled into firmware)
/// Edit receiver.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../receiver.toml");

mod board;
mod channels;
mod platform;
mod tasks;

bind_interrupts!(struct Irqs {
    UART1_IRQ => UartInterruptHandler<UART1>;
});

// DMA target for break-delimited reads (must live forever)
static RX_BUF: StaticCell<[u8; board::RX_FRAME_BUF_SIZE]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("dmxrx firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let app = load_config();

    // Pin assignments are board-specific (see board.rs). RX only: the
    // break-delimited read path is what keeps frames aligned.
    let rx_buf = RX_BUF.init([0u8; board::RX_FRAME_BUF_SIZE]);
    let rx = UartRx::new(p.UART1, p.PIN_5, Irqs, p.DMA_CH0, board::uart_config());

    info!("UART1 RX initialized for DMX512 (250k 8N2, read to break)");

    // Transceiver starts in receive mode
    let enable = Output::new(p.PIN_6, Level::Low);
    let transceiver = Rs485Transceiver::new(GpioPin::new(enable), app.rs485.enable_inverted);
    let port = Rs485Port::new(transceiver);

    let receiver = DmxReceiver::new(&DMX_STORE, port, EmbassyClock);
    let led = Output::new(p.PIN_25, Level::Low);

    // Spawn tasks
    spawner
        .spawn(tasks::dmx_rx_task(rx, rx_buf, &DMX_STORE))
        .unwrap();
    spawner
        .spawn(tasks::status_task(receiver, app, led))
        .unwrap();

    info!("All tasks spawned, receiver running");
}

/// Parse the embedded configuration, falling back to defaults
fn load_config() -> AppConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Configuration loaded: {}", config);
            config
        }
        Err(e) => {
            warn!("receiver.toml rejected ({}), using defaults", e);
            AppConfig::default()
        }
    }
}
