use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// Why a [`Context`] is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    Cancelled,
    DeadlineExceeded,
}

/// Cancellation scope for a download.
///
/// A context pairs a [`CancellationToken`] with an optional deadline. Child
/// contexts created with [`Context::with_timeout`] observe the parent's
/// cancellation and never outlive the parent's deadline, while cancelling a
/// child leaves the parent untouched.
///
/// # Examples
///
/// ```
/// use handoff::Context;
/// use std::time::Duration;
///
/// let root = Context::background();
/// let phase = root.with_timeout(Duration::from_secs(30));
///
/// root.cancel();
/// assert!(phase.err().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    token:    CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never done unless cancelled.
    pub fn background() -> Self { Self::default() }

    /// Derive a child that expires `timeout` from now, or at the parent's
    /// deadline if that comes first.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a child that expires at `deadline`, clamped to the parent's.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(parent) => parent.min(deadline),
            None => deadline,
        };
        Self {
            token:    self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> { self.deadline }

    /// Cancel this context and every context derived from it.
    pub fn cancel(&self) { self.token.cancel() }

    /// `None` while the context is live.
    pub fn err(&self) -> Option<ContextError> {
        if self.token.is_cancelled() {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Fail fast with the context's error if it is already done.
    pub fn check(&self) -> Result<()> {
        match self.err() {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> ContextError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.token.cancelled() => ContextError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => ContextError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                ContextError::Cancelled
            }
        }
    }

    /// Drive `fut` to completion unless the context finishes first.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output> {
        self.check()?;
        tokio::select! {
            biased;
            reason = self.done() => Err(reason.into()),
            out = fut => Ok(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_is_live() {
        let ctx = Context::background();
        assert_eq!(ctx.err(), None);
        assert!(ctx.deadline().is_none());
        assert!(ctx.check().is_ok());
    }

    #[tokio::test]
    async fn test_parent_cancel_reaches_child() {
        let parent = Context::background();
        let child = parent.with_timeout(Duration::from_secs(60));

        parent.cancel();

        assert_eq!(child.err(), Some(ContextError::Cancelled));
        assert_eq!(child.done().await, ContextError::Cancelled);
    }

    #[tokio::test]
    async fn test_child_cancel_leaves_parent_live() {
        let parent = Context::background();
        let child = parent.with_timeout(Duration::from_secs(60));

        child.cancel();

        assert_eq!(child.err(), Some(ContextError::Cancelled));
        assert_eq!(parent.err(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires() {
        let ctx = Context::background().with_timeout(Duration::from_millis(50));
        assert_eq!(ctx.err(), None);

        assert_eq!(ctx.done().await, ContextError::DeadlineExceeded);
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_child_never_outlives_parent_deadline() {
        let parent = Context::background().with_timeout(Duration::from_millis(10));
        let child = parent.with_timeout(Duration::from_secs(3600));

        assert_eq!(child.deadline(), parent.deadline());
        assert_eq!(child.done().await, ContextError::DeadlineExceeded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_races_future() {
        let ctx = Context::background().with_timeout(Duration::from_millis(10));

        let fast = ctx.run(async { 7 }).await;
        assert_eq!(fast.ok(), Some(7));

        let slow = ctx
            .run(tokio::time::sleep(Duration::from_secs(1)))
            .await;
        assert!(matches!(slow, Err(crate::Error::DeadlineExceeded)));
    }
}
