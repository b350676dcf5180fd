use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::core::UNKNOWN_LENGTH;

/// Receives download progress events.
///
/// `expected` is called once per download, before any body bytes are read,
/// with the parsed `Content-Length` or [`UNKNOWN_LENGTH`]. `receive` is called
/// for every non-empty chunk read from the response body.
///
/// Handlers run on the download worker between reads, so they must return
/// promptly.
pub trait ProgressHandler: Send {
    fn expected(&mut self, total: i64);

    fn receive(&mut self, n: usize);
}

/// Running totals of a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressState {
    /// Declared body size, [`UNKNOWN_LENGTH`] if not declared.
    pub expected: i64,

    /// Bytes read from the response body so far.
    pub received: i64,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            expected: UNKNOWN_LENGTH,
            received: 0,
        }
    }
}

impl ProgressState {
    pub fn is_known(&self) -> bool { self.expected >= 0 }

    /// Completion percentage, if the total is known.
    pub fn percentage(&self) -> Option<f64> {
        if !self.is_known() {
            return None;
        }
        if self.expected == 0 {
            return Some(100.0);
        }
        Some(self.received as f64 / self.expected as f64 * 100.0)
    }
}

impl ProgressHandler for ProgressState {
    fn expected(&mut self, total: i64) { self.expected = total; }

    fn receive(&mut self, n: usize) { self.received += n as i64; }
}

/// Shared handlers let the caller keep observing state after handing a clone
/// to the download.
impl<P: ProgressHandler> ProgressHandler for Arc<Mutex<P>> {
    fn expected(&mut self, total: i64) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .expected(total)
    }

    fn receive(&mut self, n: usize) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .receive(n)
    }
}

/// Adapts a `(expected, received)` callback into a [`ProgressHandler`].
///
/// The callback is invoked on every event with the running totals.
pub struct ProgressFn<F> {
    state: ProgressState,
    f:     F,
}

impl<F> ProgressFn<F>
where
    F: FnMut(i64, i64) + Send,
{
    pub fn new(f: F) -> Self {
        Self {
            state: ProgressState::default(),
            f,
        }
    }

    pub fn state(&self) -> ProgressState { self.state }
}

impl<F> ProgressHandler for ProgressFn<F>
where
    F: FnMut(i64, i64) + Send,
{
    fn expected(&mut self, total: i64) {
        self.state.expected(total);
        (self.f)(self.state.expected, self.state.received);
    }

    fn receive(&mut self, n: usize) {
        self.state.receive(n);
        (self.f)(self.state.expected, self.state.received);
    }
}

impl<F> fmt::Debug for ProgressFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressFn")
            .field("state", &self.state)
            .field("f", &"{ ... }")
            .finish()
    }
}

/// Shorthand for [`ProgressFn::new`].
///
/// # Examples
///
/// ```
/// use handoff::progress_fn;
///
/// let handler = progress_fn(|expected, received| {
///     eprintln!("{received}/{expected} bytes");
/// });
/// ```
pub fn progress_fn<F>(f: F) -> ProgressFn<F>
where
    F: FnMut(i64, i64) + Send,
{
    ProgressFn::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_defaults_to_unknown() {
        let state = ProgressState::default();
        assert_eq!(state.expected, UNKNOWN_LENGTH);
        assert_eq!(state.received, 0);
        assert_eq!(state.percentage(), None);
    }

    #[test]
    fn test_state_percentage() {
        let mut state = ProgressState::default();
        state.expected(200);
        state.receive(50);
        assert_eq!(state.percentage(), Some(25.0));

        let mut empty = ProgressState::default();
        empty.expected(0);
        assert_eq!(empty.percentage(), Some(100.0));
    }

    #[test]
    fn test_progress_fn_reports_running_totals() {
        let mut events = Vec::new();
        {
            let mut handler = progress_fn(|expected, received| events.push((expected, received)));
            handler.expected(100);
            handler.receive(30);
            handler.receive(70);
            assert_eq!(handler.state().received, 100);
        }

        assert_eq!(events, vec![(100, 0), (100, 30), (100, 100)]);
    }

    #[test]
    fn test_shared_handler_is_observable() {
        let shared = Arc::new(Mutex::new(ProgressState::default()));
        let mut handle = Arc::clone(&shared);

        handle.expected(10);
        handle.receive(4);

        let state = *shared.lock().unwrap();
        assert_eq!(state, ProgressState { expected: 10, received: 4 });
    }
}
