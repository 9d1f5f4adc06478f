//! Persistent sync state.
//!
//! The only durable cross-run state besides the downloaded files is the
//! watermark: a single timestamp in a marker file under the sync root.
//! When it is missing or unreadable, `scan` rebuilds a best-effort value
//! from the files already on disk.

pub mod error;
pub mod scan;
pub mod watermark;

pub use error::StateError;
pub use watermark::{Watermark, WatermarkStore, MARKER_FILE};
