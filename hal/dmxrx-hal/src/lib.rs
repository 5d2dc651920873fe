//! dmxrx Hardware Abstraction Layer
//!
//! This crate defines the small set of platform traits the DMX receiver
//! core needs from a host platform. Chip-specific code (UART driver,
//! interrupt wiring, timers) implements them; the core never touches
//! registers directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (dmxrx-firmware, etc.)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  dmxrx-core (framing, handoff, stats)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  dmxrx-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::ByteSource`] - Bytes drained from a UART receive FIFO
//! - [`time::Clock`] - Wrapping millisecond timekeeping
//! - [`gpio::OutputPin`] - Digital output (transceiver direction control)

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod time;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use time::Clock;
pub use uart::{ByteSource, ReceiveError, UartConfig};
