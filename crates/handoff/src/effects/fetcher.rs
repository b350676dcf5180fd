use std::io;
use std::time::Instant;

use futures_util::TryStreamExt;
use reqwest::Client;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::io::StreamReader;
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, instrument, warn};

use super::copy::{PartialCopy, copy_with_context};
use super::http::{HttpClient, default_client};
use super::reader::ProgressReader;
use super::staging::StagingFile;
use crate::core::{Context, content_length};
use crate::data::{DownloadRequest, Downloaded, ProgressHandler};
use crate::error::{Error, Result};

/// Runs downloads over a shared HTTP transport.
///
/// Each call to [`Fetcher::fetch`] runs on its own worker task with its own
/// staging file; only the transport is shared.
#[derive(Debug, Clone)]
pub struct Fetcher<C> {
    client: C,
}

impl Default for Fetcher<Client> {
    fn default() -> Self { Self::new(default_client()) }
}

impl<C> Fetcher<C>
where
    C: HttpClient + Clone + 'static,
{
    pub fn new(client: C) -> Self { Self { client } }

    /// Download `request.source` into `request.dest`.
    ///
    /// The body is read into a private staging file first and copied into the
    /// destination only once it has been received in full, so a failed network
    /// read never touches the destination. `ctx` bounds the whole download;
    /// the read and copy phases additionally get their own timeouts.
    ///
    /// Dropping the returned future aborts the worker.
    pub async fn fetch<W>(&self, ctx: &Context, request: DownloadRequest<W>) -> Result<Downloaded<W>>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let worker = tokio::spawn(run(self.client.clone(), ctx.clone(), request));
        match AbortOnDropHandle::new(worker).await {
            Ok(result) => result,
            Err(e) => Err(Error::Worker(e)),
        }
    }
}

/// Download with the process-wide default client.
///
/// # Examples
///
/// ```no_run
/// use handoff::{Context, DownloadRequest, download, status_equals};
/// use reqwest::StatusCode;
/// use std::time::Duration;
///
/// # async fn example() -> handoff::Result<()> {
/// let url = "https://example.com/archive.tar.gz".parse().unwrap();
/// let file = tokio::fs::File::create("archive.tar.gz").await?;
///
/// let ctx = Context::background().with_timeout(Duration::from_secs(30));
/// let request = DownloadRequest::new(url, file).validate_response(status_equals(StatusCode::OK));
///
/// let done = download(&ctx, request).await?;
/// println!("{} bytes in {:?}", done.file_size, done.duration);
/// # Ok(())
/// # }
/// ```
pub async fn download<W>(ctx: &Context, request: DownloadRequest<W>) -> Result<Downloaded<W>>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    Fetcher::default().fetch(ctx, request).await
}

#[instrument(skip_all, fields(url = %request.source))]
async fn run<C, W>(client: C, ctx: Context, mut request: DownloadRequest<W>) -> Result<Downloaded<W>>
where
    C: HttpClient,
    W: AsyncWrite + Unpin + Send,
{
    let start = Instant::now();
    let read_timeout = request.effective_read_timeout();
    let copy_timeout = request.effective_copy_timeout();

    ctx.check()?;
    let outbound = request.build_request().map_err(Error::Request)?;

    ctx.check()?;
    let response = ctx
        .run(client.execute(outbound))
        .await?
        .map_err(|e| Error::Transport(Box::new(e)))?;
    debug!(status = %response.status(), "received response");

    ctx.check()?;
    if let Some(validate) = &request.validate_response {
        validate(&response)?;
    }

    ctx.check()?;
    let expected = content_length(response.headers());
    if let Some(progress) = request.progress.as_deref_mut() {
        progress.expected(expected);
    }

    let staging_dir = request.staging_dir.clone().unwrap_or_else(std::env::temp_dir);
    let mut staging = StagingFile::create_in(&staging_dir).map_err(Error::Staging)?;

    let staged = {
        let body = Box::pin(response.bytes_stream().map_err(io::Error::other));
        let progress = request
            .progress
            .as_deref_mut()
            .map(|p| p as &mut dyn ProgressHandler);
        let mut reader = ProgressReader::new(StreamReader::new(body), progress);
        let read_ctx = ctx.with_timeout(read_timeout);
        copy_with_context(&read_ctx, staging.file_mut(), &mut reader)
            .await
            .map_err(PartialCopy::into_error)?
    };
    debug!(bytes = staged, expected, "body staged");

    ctx.check()?;
    staging.rewind().await.map_err(Error::Staging)?;

    let copy_ctx = ctx.with_timeout(copy_timeout);
    let file_size = copy_with_context(&copy_ctx, &mut request.dest, staging.file_mut())
        .await
        .map_err(PartialCopy::into_error)?;
    copy_ctx.run(request.dest.flush()).await??;
    debug!(bytes = file_size, "body delivered");

    if let Err(e) = staging.close() {
        warn!(error = %e, "failed to remove staging file");
    }

    Ok(Downloaded {
        file_size,
        duration: start.elapsed(),
        dest: request.dest,
    })
}
