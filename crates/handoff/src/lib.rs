//! HTTP downloading through a private staging file.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Request configuration, progress sinks and results
//! - [`core`] - Cancellation contexts, header parsing, response validation
//! - [`effects`] - Transport, staging file and bounded copies
//!
//! # Key Features
//!
//! - **Staged delivery**: The body lands in a temporary file first; the
//!   destination is written only after the whole body arrived.
//! - **Bounded phases**: Network read and local copy each get their own
//!   deadline, nested under the caller's [`Context`].
//! - **Cancellation everywhere**: Every phase and every chunk observes the
//!   context.
//! - **Mechanism-only**: No retries, no checksums; the caller owns policy.

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use self::core::{Context, ContextError, HttpResponseError, UNKNOWN_LENGTH, content_length, status_equals};
pub use self::data::{
    DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, DownloadRequest, Downloaded, ProgressFn, ProgressHandler,
    ProgressState, RequestFactory, ResponseValidator, progress_fn,
};
pub use self::effects::{Fetcher, HttpClient, copy_with_context, download};

pub use self::error::{BoxError, Error, Result};
