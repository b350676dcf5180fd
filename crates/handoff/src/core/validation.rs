use reqwest::{Response, StatusCode};
use thiserror::Error;

use crate::error::Result;

/// Returned by [`status_equals`] when a response carries an unexpected status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("http response error ({status})")]
pub struct HttpResponseError {
    pub status: StatusCode,
}

impl HttpResponseError {
    /// Human-readable reason phrase for the status, if one is registered.
    pub fn reason(&self) -> Option<&'static str> { self.status.canonical_reason() }
}

/// Build a response validator that accepts only `expected`.
///
/// # Examples
///
/// ```
/// use handoff::{DownloadRequest, status_equals};
/// use reqwest::StatusCode;
///
/// let url = "https://example.com/data.bin".parse().unwrap();
/// let request = DownloadRequest::new(url, Vec::<u8>::new())
///     .validate_response(status_equals(StatusCode::OK));
/// ```
pub fn status_equals(expected: StatusCode) -> impl Fn(&Response) -> Result<()> + Send + Sync + 'static {
    move |response: &Response| check_status(response.status(), expected)
}

pub(crate) fn check_status(actual: StatusCode, expected: StatusCode) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(HttpResponseError { status: actual }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> Response {
        let inner = http::Response::builder()
            .status(status)
            .body(Vec::<u8>::new())
            .unwrap();
        Response::from(inner)
    }

    #[test]
    fn test_status_equals_accepts_expected() {
        let validate = status_equals(StatusCode::OK);
        assert!(validate(&response(200)).is_ok());
    }

    #[test]
    fn test_status_equals_rejects_everything_else() {
        let validate = status_equals(StatusCode::OK);

        for code in [100, 201, 204, 301, 304, 400, 403, 404, 429, 500, 503] {
            let err = validate(&response(code)).unwrap_err();
            assert_eq!(err.status().map(|s| s.as_u16()), Some(code), "status {code}");
        }
    }

    #[test]
    fn test_error_message_has_reason_phrase() {
        let err = HttpResponseError {
            status: StatusCode::NOT_FOUND,
        };
        assert_eq!(err.to_string(), "http response error (404 Not Found)");
        assert_eq!(err.reason(), Some("Not Found"));
    }
}
