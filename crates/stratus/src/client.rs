//! The CloudSearch client: compiles searches, runs them through a [`Transport`] and turns
//! the responses into pages; encodes and posts document batches.
//!
//! ```rust
//! use stratus::{Client, ClientConfigBuilder, FilterExpression, SearchOptions};
//!
//! // Sandbox mode never touches the network.
//! let client = Client::new(ClientConfigBuilder::sandbox().build())?;
//! let page = client.search(
//!     "donuts",
//!     &SearchOptions::new().filter(FilterExpression::new().with("fried", true)),
//! )?;
//! assert_eq!(page.total_pages(), 1);
//! # Ok::<(), stratus::error::StratusError>(())
//! ```

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "http")]
use crate::transport::ReqwestTransport;
use crate::{
    config::ClientConfig,
    document::{DocumentOperation, FieldValue},
    error::{Result, StratusError},
    page::SearchPage,
    request::{SearchOptions, SearchRequest, build_document_request, build_search_request},
    transport::Transport,
};

/// CloudSearch client over a pluggable [`Transport`]. Cheap to share by reference; it holds
/// no per-request state.
pub struct Client<T> {
    config: ClientConfig,
    transport: T,
}

#[cfg(feature = "http")]
impl Client<ReqwestTransport> {
    /// Client using the default `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Fails when the transport's tokio runtime cannot be started.
    ///
    /// # Panics
    ///
    /// The returned client blocks on every request. [`Client::search`] and the write
    /// methods panic when called from inside an async runtime; wrap them in
    /// `tokio::task::spawn_blocking` there.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self::with_transport(config, ReqwestTransport::new()?))
    }
}

impl<T: Transport> Client<T> {
    /// Client sending its requests through `transport`.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Assemble the search request without sending it.
    pub fn search_request(&self, term: &str, options: &SearchOptions) -> Result<SearchRequest> {
        let endpoint = self.config.search_url()?;
        Ok(build_search_request(
            &endpoint,
            term,
            options,
            self.config.dialect(),
        )?)
    }

    /// Run a search.
    ///
    /// In sandbox mode an empty page comes back without any request being made.
    #[instrument(name = "Search", skip(self, options), level = "info")]
    pub fn search(&self, term: &str, options: &SearchOptions) -> Result<SearchPage> {
        if self.config.is_sandbox() {
            debug!("Sandbox mode, returning an empty page");
            return Ok(SearchPage::sandbox());
        }
        let SearchRequest { url, .. } = self.search_request(term, options)?;
        info!(%url, "Sending search");

        let response = self.transport.get(&url).map_err(|err| {
            warn!(%url, error = %err, "Search transport failed");
            StratusError::SearchFailure {
                message: err.to_string(),
                url: url.clone(),
            }
        })?;
        if !response.is_success() {
            warn!(%url, status = response.status, "Search rejected");
            return Err(StratusError::SearchFailure {
                message: format!("{}: {}", response.status_line(), response.body),
                url,
            });
        }

        let page = SearchPage::from_json(&response.body, options.per_page()).map_err(|err| {
            StratusError::SearchFailure {
                message: format!("Unreadable search response: {err}"),
                url: url.clone(),
            }
        })?;
        debug!(
            found = page.total_entries(),
            hits = page.len(),
            "Search complete"
        );
        Ok(page)
    }

    /// Index one document, replacing any older version with the same id.
    ///
    /// # Arguments
    ///
    /// * `id` - Document id
    /// * `fields` - Field values; nulls follow the configured [`NullFieldPolicy`](crate::NullFieldPolicy)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stratus::{Client, ClientConfigBuilder, FieldValue};
    ///
    /// let client = Client::new(ClientConfigBuilder::sandbox().build())?;
    /// client.add_item("1", [("name", FieldValue::from("Glazed"))])?;
    /// # Ok::<(), stratus::error::StratusError>(())
    /// ```
    pub fn add_item<I, K>(&self, id: impl Into<String>, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        self.batch(&[self.config.encoder().add(id, fields, version())])
    }

    /// CloudSearch has no partial updates, so this re-adds the whole document.
    pub fn update_item<I, K>(&self, id: impl Into<String>, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        self.batch(&[self.config.encoder().update(id, fields, version())])
    }

    /// Delete one document by id.
    pub fn remove_item(&self, id: impl Into<String>) -> Result<()> {
        self.batch(&[self.config.encoder().delete(id, version())])
    }

    /// Add several documents in one batch.
    pub fn add_items<D, S, I, K>(&self, documents: D) -> Result<()>
    where
        D: IntoIterator<Item = (S, I)>,
        S: Into<String>,
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        let encoder = self.config.encoder();
        let version = version();
        let operations: Vec<_> = documents
            .into_iter()
            .map(|(id, fields)| encoder.add(id, fields, version))
            .collect();
        self.batch(&operations)
    }

    pub fn remove_items<S: Into<String>>(&self, ids: impl IntoIterator<Item = S>) -> Result<()> {
        let encoder = self.config.encoder();
        let version = version();
        let operations: Vec<_> = ids
            .into_iter()
            .map(|id| encoder.delete(id, version))
            .collect();
        self.batch(&operations)
    }

    /// Post `operations` as one batch. Empty batches and sandbox mode send nothing.
    #[instrument(name = "Document batch", skip_all, fields(operations = operations.len()), level = "info")]
    pub fn batch(&self, operations: &[DocumentOperation]) -> Result<()> {
        if operations.is_empty() {
            return Ok(());
        }
        if self.config.is_sandbox() {
            debug!("Sandbox mode, dropping document batch");
            return Ok(());
        }
        let request = build_document_request(&self.config.document_url()?, operations)?;
        info!(url = %request.url, "Posting document batch");

        let response = self
            .transport
            .post(&request.url, &request.body, &request.headers)
            .map_err(|err| {
                warn!(url = %request.url, error = %err, "Document batch transport failed");
                StratusError::WriteFailure {
                    message: err.to_string(),
                    url: request.url.clone(),
                    body: request.body.clone(),
                }
            })?;
        if !response.is_success() {
            warn!(url = %request.url, status = response.status, "Document batch rejected");
            return Err(StratusError::WriteFailure {
                message: format!("{}: {}", response.status_line(), response.body),
                url: request.url,
                body: request.body,
            });
        }
        Ok(())
    }
}

/// Document versions are wall-clock seconds.
fn version() -> i64 {
    Utc::now().timestamp()
}
