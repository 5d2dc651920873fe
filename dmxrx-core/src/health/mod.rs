//! Link health
//!
//! Liveness and frame-rate figures derived from publish timestamps and
//! the frame counter. Both are pure functions of state and are
//! re-evaluated on every query; there is no background timer.

pub mod connection;
pub mod rate;

pub use connection::ConnectionMonitor;
pub use rate::{RateEstimator, RateSample};
