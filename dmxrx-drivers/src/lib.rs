//! Hardware driver implementations
//!
//! Concrete drivers built on the `dmxrx-hal` traits:
//!
//! - RS-485 transceiver direction control (DE/RE)
//! - Break alignment for UARTs that strip the break character

#![no_std]
#![deny(unsafe_code)]

pub mod break_feed;
pub mod transceiver;

pub use break_feed::{BreakAlignedFeed, BREAK_CHARACTER};
pub use transceiver::Rs485Transceiver;
