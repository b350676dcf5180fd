//! Configuration, progress and result types for a download.
//!
//! These types carry no I/O; the pipeline in [`crate::effects`] consumes them.

pub mod options;
pub mod progress;

use std::time::Duration;

pub use options::{
    DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, DownloadRequest, RequestFactory, ResponseValidator,
    default_request,
};
pub use progress::{ProgressFn, ProgressHandler, ProgressState, progress_fn};

/// Outcome of a successful download.
#[derive(Debug)]
pub struct Downloaded<W> {
    /// Bytes written to the destination.
    pub file_size: u64,

    /// Wall-clock time of the whole download.
    pub duration: Duration,

    /// The destination, handed back after the copy.
    pub dest: W,
}

impl<W> Downloaded<W> {
    pub fn into_dest(self) -> W { self.dest }
}
