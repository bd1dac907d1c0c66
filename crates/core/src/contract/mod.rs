//! Contract types shared by every store backend
//!
//! - `version`: the monotonic stamp carried by each accepted write
//! - `timestamp`: microsecond wall-clock timestamps

pub mod timestamp;
pub mod version;

pub use timestamp::Timestamp;
pub use version::Version;
