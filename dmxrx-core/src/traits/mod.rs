//! Platform traits owned by the core
//!
//! Byte, time and pin abstractions live in `dmxrx-hal`; traits that
//! need core types are defined here.

pub mod port;

pub use port::DmxPort;
