use reqwest::Client;
use tokio::runtime::Runtime;
use tracing::{debug, instrument};

use super::{HttpResponse, Transport, TransportError};

/// [`Transport`] backed by `reqwest`, driven on its own tokio runtime.
///
/// Every request blocks the calling thread until the response body has arrived.
///
/// # Panics
///
/// `get` and `post` panic when called from inside an async runtime, since tokio refuses to
/// block a thread that is driving tasks. Call them from plain threads, or from
/// `tokio::task::spawn_blocking` in async code.
#[derive(Debug)]
pub struct ReqwestTransport {
    runtime: Runtime,
    client: Client,
}

impl ReqwestTransport {
    /// Transport with a default `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Fails when the tokio runtime cannot be started.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_client(Client::new())
    }

    /// Use a preconfigured client, e.g. one with timeouts set.
    pub fn with_client(client: Client) -> Result<Self, TransportError> {
        let runtime = Runtime::new()?;
        Ok(Self { runtime, client })
    }

    fn finish(&self, request: reqwest::RequestBuilder) -> Result<HttpResponse, TransportError> {
        self.runtime.block_on(async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            debug!(status = status.as_u16(), bytes = body.len(), "Response received");
            Ok(HttpResponse {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_owned(),
                body,
            })
        })
    }
}

impl Transport for ReqwestTransport {
    #[instrument(name = "HTTP GET", skip(self), level = "debug")]
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.finish(self.client.get(url))
    }

    #[instrument(name = "HTTP POST", skip(self, body, headers), level = "debug")]
    fn post(
        &self,
        url: &str,
        body: &str,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, TransportError> {
        let request = headers
            .iter()
            .fold(self.client.post(url), |request, (name, value)| {
                request.header(name.as_str(), value.as_str())
            })
            .body(body.to_owned());
        self.finish(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "Cannot start a runtime from within a runtime")]
    fn test_blocking_from_async_context_panics() {
        let transport = ReqwestTransport::new().unwrap();
        let outer = Runtime::new().unwrap();
        outer.block_on(async {
            let _ = transport.get("http://127.0.0.1:9/");
        });
    }

    #[test]
    fn test_get_returns_status_and_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/2011-02-01/search?q=x&size=10")
            .with_status(200)
            .with_body(r#"{"hits":{"found":0,"start":0,"hit":[]}}"#)
            .create();

        let transport = ReqwestTransport::new().unwrap();
        let response = transport
            .get(&format!("{}/2011-02-01/search?q=x&size=10", server.url()))
            .unwrap();

        mock.assert();
        assert!(response.is_success());
        assert_eq!(response.body, r#"{"hits":{"found":0,"start":0,"hit":[]}}"#);
    }

    #[test]
    fn test_post_sends_headers_and_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/documents/batch")
            .match_header("content-type", "application/json")
            .match_body(r#"[{"type":"delete","id":"1","version":1}]"#)
            .with_status(500)
            .with_body("boom")
            .create();

        let transport = ReqwestTransport::new().unwrap();
        let response = transport
            .post(
                &format!("{}/documents/batch", server.url()),
                r#"[{"type":"delete","id":"1","version":1}]"#,
                &[("Content-Type".to_owned(), "application/json".to_owned())],
            )
            .unwrap();

        mock.assert();
        assert_eq!(response.status, 500);
        assert_eq!(response.status_line(), "500 Internal Server Error");
        assert_eq!(response.body, "boom");
    }

    #[test]
    fn test_connection_failure_is_an_error() {
        let transport = ReqwestTransport::new().unwrap();
        assert!(matches!(
            transport.get("http://127.0.0.1:1/unreachable"),
            Err(TransportError::Http(_))
        ));
    }
}
