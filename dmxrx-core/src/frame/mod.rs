//! DMX frame handling
//!
//! - [`extractor`]: producer-side accumulation and break handling
//! - [`store`]: the published frame shared with the consumer

pub mod extractor;
pub mod store;

pub use extractor::{artifact_offset, BreakOutcome, FrameExtractor};
pub use store::{FrameSnapshot, FrameStore, PublishedFrame};
