use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::io::{AsyncRead, ReadBuf};

use crate::data::ProgressHandler;

/// Reader that reports every non-empty read to a progress handler.
/// Wraps any `AsyncRead` source; bytes pass through untouched.
pub struct ProgressReader<'a, R> {
    inner:   R,
    handler: Option<&'a mut dyn ProgressHandler>,
}

impl<'a, R> ProgressReader<'a, R> {
    pub fn new(inner: R, handler: Option<&'a mut dyn ProgressHandler>) -> Self {
        Self { inner, handler }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ProgressReader<'_, R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        ready!(Pin::new(&mut this.inner).poll_read(cx, buf))?;

        let n = buf.filled().len() - before;
        if n > 0
            && let Some(handler) = this.handler.as_deref_mut()
        {
            handler.receive(n);
        }
        Poll::Ready(Ok(()))
    }
}
