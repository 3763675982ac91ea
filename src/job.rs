pub mod status;
pub mod watch;

pub use status::{JobFailure, JobState, classify};
pub use watch::{WatchError, watch_job};
