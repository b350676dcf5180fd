use std::future::Future;

use once_cell::sync::Lazy;
use reqwest::{Client, Request, Response};

/// Asynchronous HTTP transport.
///
/// The pipeline hands a fully built request to the transport and reads the
/// response it gets back. Implementations own redirect handling, proxies,
/// TLS and connection reuse, and must be safe to share between concurrent
/// downloads.
///
/// # Implementations
///
/// - [`reqwest::Client`]: production transport
/// - Mock implementations for testing
pub trait HttpClient: Send + Sync {
    /// Error type for failed requests.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send `request` and return the response once its headers arrive.
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response, Self::Error>> + Send;
}

impl HttpClient for Client {
    type Error = reqwest::Error;

    fn execute(&self, request: Request) -> impl Future<Output = Result<Response, Self::Error>> + Send {
        Client::execute(self, request)
    }
}

static DEFAULT_CLIENT: Lazy<Client> = Lazy::new(Client::new);

/// Process-wide client used when the caller does not supply one.
pub fn default_client() -> Client { DEFAULT_CLIENT.clone() }
