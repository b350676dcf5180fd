//! Pure logic for the download pipeline: cancellation scopes, header parsing
//! and response validation. Nothing here performs I/O.

mod context;
mod headers;
mod validation;

pub use context::{Context, ContextError};
pub use headers::{UNKNOWN_LENGTH, content_length};
pub use validation::{HttpResponseError, status_equals};
