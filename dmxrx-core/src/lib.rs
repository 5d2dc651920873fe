//! Board-agnostic core logic for the DMX512 receiver
//!
//! This crate contains everything between the UART driver and the
//! application that does not depend on a specific chip:
//!
//! - Frame extraction from a break-delimited byte stream
//! - The published-frame handoff cell shared by producer and consumer
//! - Link liveness and frame-rate statistics
//! - The consumer-facing receiver API
//! - A peripheral-keyed registry for interrupt-style platforms
//! - Configuration type definitions
//!
//! # Contexts
//!
//! ```text
//!  producer (UART IRQ / rx task)        consumer (application)
//! ┌─────────────────────────────┐      ┌────────────────────────────┐
//! │ FrameExtractor              │      │ DmxReceiver                │
//! │   on_byte_available()       │      │   read(), read_channels()  │
//! │   on_break_detected()       │      │   is_connected()           │
//! └──────────────┬──────────────┘      │   packet_rate() ...        │
//!                │ publish             └─────────────┬──────────────┘
//!                ▼                                   │ read
//!         ┌─────────────────────────────────────────────────┐
//!         │ FrameStore (critical-section handoff cell)      │
//!         └─────────────────────────────────────────────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod consts;
pub mod frame;
pub mod health;
pub mod receiver;
pub mod registry;
pub mod traits;

pub use config::{AppConfig, ConfigError, PeripheralId, PinConfig, ReceiverConfig};
pub use frame::{BreakOutcome, FrameExtractor, FrameSnapshot, FrameStore};
pub use receiver::{DmxReceiver, InitError};
pub use registry::{ReceiverRegistry, RegistryError};
pub use traits::DmxPort;
