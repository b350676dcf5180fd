use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::{Method, Request, Response, Url};

use super::progress::ProgressHandler;
use crate::error::{BoxError, Result};

/// Timeout applied to a phase when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// `User-Agent` sent by the default request factory.
pub const DEFAULT_USER_AGENT: &str = concat!("handoff/", env!("CARGO_PKG_VERSION"));

/// Builds the outbound request for a source URL.
pub type RequestFactory = Box<dyn Fn(&Url) -> std::result::Result<Request, BoxError> + Send + Sync>;

/// Accepts or rejects a response before its body is read.
pub type ResponseValidator = Box<dyn Fn(&Response) -> Result<()> + Send + Sync>;

/// Everything needed to run one download.
///
/// The source and destination are required; everything else has a default.
///
/// # Examples
///
/// ```
/// use handoff::{DownloadRequest, progress_fn, status_equals};
/// use reqwest::StatusCode;
/// use std::time::Duration;
///
/// let url = "https://example.com/rand_16k.dat".parse().unwrap();
/// let request = DownloadRequest::new(url, Vec::<u8>::new())
///     .validate_response(status_equals(StatusCode::OK))
///     .progress(progress_fn(|expected, received| {
///         println!("{received} of {expected} bytes");
///     }))
///     .read_timeout(Duration::from_secs(30));
/// ```
pub struct DownloadRequest<W> {
    /// URL the body is fetched from.
    pub source: Url,

    /// Receives the body once it has been fully staged.
    pub dest: W,

    /// Custom request construction. `None` sends a plain `GET` with
    /// [`DEFAULT_USER_AGENT`].
    pub create_request: Option<RequestFactory>,

    /// Response check run before the body is read. `None` accepts any status.
    pub validate_response: Option<ResponseValidator>,

    /// Progress sink for the network read.
    pub progress: Option<Box<dyn ProgressHandler>>,

    /// Bound on reading the body into the staging file.
    ///
    /// Zero means [`DEFAULT_TIMEOUT`].
    pub read_timeout: Duration,

    /// Bound on copying the staged body into `dest`.
    ///
    /// Zero means [`DEFAULT_TIMEOUT`].
    pub copy_timeout: Duration,

    /// Directory for the staging file. `None` uses the OS temp directory.
    pub staging_dir: Option<PathBuf>,
}

impl<W> DownloadRequest<W> {
    pub fn new(source: Url, dest: W) -> Self {
        Self {
            source,
            dest,
            create_request: None,
            validate_response: None,
            progress: None,
            read_timeout: Duration::ZERO,
            copy_timeout: Duration::ZERO,
            staging_dir: None,
        }
    }

    #[must_use]
    pub fn create_request<F>(mut self, f: F) -> Self
    where
        F: Fn(&Url) -> std::result::Result<Request, BoxError> + Send + Sync + 'static,
    {
        self.create_request = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn validate_response<F>(mut self, f: F) -> Self
    where
        F: Fn(&Response) -> Result<()> + Send + Sync + 'static,
    {
        self.validate_response = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn progress(mut self, handler: impl ProgressHandler + 'static) -> Self {
        self.progress = Some(Box::new(handler));
        self
    }

    #[must_use]
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    #[must_use]
    pub fn copy_timeout(mut self, timeout: Duration) -> Self {
        self.copy_timeout = timeout;
        self
    }

    #[must_use]
    pub fn staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    /// Read timeout with the zero default resolved.
    pub fn effective_read_timeout(&self) -> Duration { or_default(self.read_timeout) }

    /// Copy timeout with the zero default resolved.
    pub fn effective_copy_timeout(&self) -> Duration { or_default(self.copy_timeout) }

    pub(crate) fn build_request(&self) -> std::result::Result<Request, BoxError> {
        match &self.create_request {
            Some(create) => create(&self.source),
            None => default_request(&self.source),
        }
    }
}

impl<W> fmt::Debug for DownloadRequest<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadRequest")
            .field("source", &self.source.as_str())
            .field("create_request", &self.create_request.as_ref().map(|_| "{ ... }"))
            .field("validate_response", &self.validate_response.as_ref().map(|_| "{ ... }"))
            .field("progress", &self.progress.as_ref().map(|_| "{ ... }"))
            .field("read_timeout", &self.read_timeout)
            .field("copy_timeout", &self.copy_timeout)
            .field("staging_dir", &self.staging_dir)
            .finish()
    }
}

fn or_default(timeout: Duration) -> Duration {
    if timeout.is_zero() { DEFAULT_TIMEOUT } else { timeout }
}

/// `GET <url>` with [`DEFAULT_USER_AGENT`] and no body.
pub fn default_request(url: &Url) -> std::result::Result<Request, BoxError> {
    let mut request = Request::new(Method::GET, url.clone());
    request
        .headers_mut()
        .insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    Ok(request)
}
