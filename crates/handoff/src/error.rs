//! Error types for handoff.

use std::io;

use reqwest::StatusCode;
use thiserror::Error;

use crate::core::{ContextError, HttpResponseError};

/// Boxed error used for caller-supplied collaborators (request factories,
/// transports).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("download cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("failed to build request: {0}")]
    Request(#[source] BoxError),

    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// The writer reported more bytes than it was handed.
    #[error("invalid write result")]
    InvalidWrite,

    /// The writer accepted fewer bytes than it was handed without an error.
    #[error("short write")]
    ShortWrite,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("staging file error: {0}")]
    Staging(#[source] io::Error),

    #[error("download worker failed: {0}")]
    Worker(#[source] tokio::task::JoinError),
}

impl Error {
    /// Status code carried by a rejected response, if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Response(e) => Some(e.status),
            _ => None,
        }
    }
}

impl From<ContextError> for Error {
    fn from(e: ContextError) -> Self {
        match e {
            ContextError::Cancelled => Error::Cancelled,
            ContextError::DeadlineExceeded => Error::DeadlineExceeded,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
