use std::io;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::core::Context;
use crate::error::Error;

/// Chunk size for [`copy_with_context`].
pub const COPY_BUFFER_SIZE: usize = 32 * 1024;

/// A copy that stopped early, with the bytes written before it stopped.
#[derive(Debug, Error)]
#[error("copy stopped after {written} bytes: {error}")]
pub struct PartialCopy {
    pub written: u64,
    #[source]
    pub error:   Error,
}

impl PartialCopy {
    fn new(written: u64, error: impl Into<Error>) -> Self {
        Self {
            written,
            error: error.into(),
        }
    }

    pub fn into_error(self) -> Error { self.error }
}

/// Copy `src` into `dst` until end of stream, bounded by `ctx`.
///
/// The context is checked before every read, and every read and write is
/// raced against it. Each chunk is handed to exactly one `write` call, which
/// must accept the whole chunk: a shorter result is [`Error::ShortWrite`], a
/// longer one [`Error::InvalidWrite`].
///
/// Returns the number of bytes written.
pub async fn copy_with_context<R, W>(ctx: &Context, dst: &mut W, src: &mut R) -> Result<u64, PartialCopy>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut written = 0u64;

    loop {
        if let Some(reason) = ctx.err() {
            return Err(PartialCopy::new(written, reason));
        }

        let read = tokio::select! {
            biased;
            reason = ctx.done() => return Err(PartialCopy::new(written, reason)),
            read = src.read(&mut buf) => read,
        };
        let nr = match read {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(PartialCopy::new(written, e)),
        };

        let write = tokio::select! {
            biased;
            reason = ctx.done() => return Err(PartialCopy::new(written, reason)),
            write = dst.write(&buf[..nr]) => write,
        };
        let nw = match write {
            Ok(n) if n > nr => return Err(PartialCopy::new(written, Error::InvalidWrite)),
            Ok(n) => n,
            Err(e) => return Err(PartialCopy::new(written, e)),
        };

        written += nw as u64;
        if nw != nr {
            return Err(PartialCopy::new(written, Error::ShortWrite));
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context as TaskContext, Poll};
    use std::time::Duration;

    /// Writer that misreports how much it accepted.
    struct LyingWriter {
        report: fn(usize) -> usize,
        buf:    Vec<u8>,
    }

    impl AsyncWrite for LyingWriter {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut TaskContext<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            let n = (self.report)(buf.len());
            let take = n.min(buf.len());
            self.buf.extend_from_slice(&buf[..take]);
            Poll::Ready(Ok(n))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut TaskContext<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut TaskContext<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    /// Reader that never produces data.
    struct Stalled;

    impl AsyncRead for Stalled {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut TaskContext<'_>,
            _buf: &mut tokio::io::ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Pending
        }
    }

    /// Reader that yields one chunk and then fails.
    struct FailsAfter {
        data: Option<Vec<u8>>,
    }

    impl AsyncRead for FailsAfter {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut TaskContext<'_>,
            buf: &mut tokio::io::ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            match self.data.take() {
                Some(data) => {
                    buf.put_slice(&data);
                    Poll::Ready(Ok(()))
                }
                None => Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))),
            }
        }
    }

    #[tokio::test]
    async fn test_copies_everything() {
        let data: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        let mut src = &data[..];
        let mut dst = Vec::new();

        let n = copy_with_context(&Context::background(), &mut dst, &mut src)
            .await
            .unwrap();

        assert_eq!(n, data.len() as u64);
        assert_eq!(dst, data);
    }

    #[tokio::test]
    async fn test_empty_source() {
        let mut src: &[u8] = &[];
        let mut dst = Vec::new();

        let n = copy_with_context(&Context::background(), &mut dst, &mut src)
            .await
            .unwrap();
        assert_eq!(n, 0);
        assert!(dst.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_first_read() {
        let ctx = Context::background();
        ctx.cancel();

        let mut src: &[u8] = b"never copied";
        let mut dst = Vec::new();

        let err = copy_with_context(&ctx, &mut dst, &mut src).await.unwrap_err();
        assert_eq!(err.written, 0);
        assert!(matches!(err.error, Error::Cancelled));
        assert!(dst.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_interrupts_stalled_read() {
        let ctx = Context::background().with_timeout(Duration::from_millis(100));
        let mut dst = Vec::new();

        let err = copy_with_context(&ctx, &mut dst, &mut Stalled).await.unwrap_err();
        assert!(matches!(err.error, Error::DeadlineExceeded));
        assert_eq!(err.written, 0);
    }

    #[tokio::test]
    async fn test_short_write() {
        let mut src: &[u8] = &[7u8; 64];
        let mut dst = LyingWriter {
            report: |n| n / 2,
            buf:    Vec::new(),
        };

        let err = copy_with_context(&Context::background(), &mut dst, &mut src)
            .await
            .unwrap_err();
        assert!(matches!(err.error, Error::ShortWrite));
        assert_eq!(err.written, 32);
    }

    #[tokio::test]
    async fn test_overlong_write() {
        let mut src: &[u8] = &[7u8; 64];
        let mut dst = LyingWriter {
            report: |n| n + 1,
            buf:    Vec::new(),
        };

        let err = copy_with_context(&Context::background(), &mut dst, &mut src)
            .await
            .unwrap_err();
        assert!(matches!(err.error, Error::InvalidWrite));
        assert_eq!(err.written, 0);
    }

    #[tokio::test]
    async fn test_read_error_keeps_partial_count() {
        let mut src = FailsAfter {
            data: Some(vec![1u8; 10]),
        };
        let mut dst = Vec::new();

        let err = copy_with_context(&Context::background(), &mut dst, &mut src)
            .await
            .unwrap_err();
        assert_eq!(err.written, 10);
        match err.into_error() {
            Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
            other => panic!("unexpected error: {other}"),
        }
    }
}
