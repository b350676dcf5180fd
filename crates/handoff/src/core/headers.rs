use reqwest::header::{CONTENT_LENGTH, HeaderMap};

/// Reported as the expected total when the body length is not declared.
pub const UNKNOWN_LENGTH: i64 = -1;

/// Parse the declared `Content-Length` as a base-10 `i64`.
///
/// Missing, non-UTF-8 or malformed values yield [`UNKNOWN_LENGTH`].
pub fn content_length(headers: &HeaderMap) -> i64 {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(UNKNOWN_LENGTH)
}
