//! The HTTP seam. The client only needs "GET a URL" and "POST a body", so tests and
//! embedding applications can swap in their own [`Transport`].

use std::sync::Arc;

pub use error::TransportError;

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::ReqwestTransport;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            reason: String::new(),
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// `"404 Not Found"`, or just the code when no reason phrase was given.
    pub fn status_line(&self) -> String {
        if self.reason.is_empty() {
            self.status.to_string()
        } else {
            format!("{} {}", self.status, self.reason)
        }
    }
}

/// Blocking HTTP collaborator. One call per request, no retries.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;

    fn post(
        &self,
        url: &str,
        body: &str,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        (**self).get(url)
    }

    fn post(
        &self,
        url: &str,
        body: &str,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, TransportError> {
        (**self).post(url, body, headers)
    }
}

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum TransportError {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),
        #[cfg(feature = "http")]
        #[error("HTTP error: {0}")]
        Http(#[from] reqwest::Error),
        #[error("{0}")]
        Other(String),
    }
}
