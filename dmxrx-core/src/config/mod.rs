//! Configuration types
//!
//! - [`hardware`]: where a receiver is wired (validated, then handed to
//!   the platform's [`DmxPort`])
//! - [`types`]: runtime application settings
//! - [`toml`]: `no_std` parser for the configuration file
//!
//! [`DmxPort`]: crate::traits::DmxPort

pub mod hardware;
pub mod toml;
pub mod types;

pub use hardware::*;
pub use types::*;
