//! Embassy tasks

mod dmx_rx;
mod status;

pub use dmx_rx::dmx_rx_task;
pub use status::status_task;
