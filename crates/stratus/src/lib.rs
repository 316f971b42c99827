//! Stratus - Amazon CloudSearch query compiler and client
//!
//! Stratus turns nested filter expressions, geographic constraints and ranking options into
//! the exact query syntax CloudSearch expects, and turns search responses back into pages.
//! Both query dialects are supported: the `2011-02-01` boolean query API and the
//! `2013-01-01` structured query API.
//!
//! # Quick Start
//!
//! ```rust
//! use stratus::{Dialect, FilterExpression, SearchOptions, build_search_request};
//!
//! let options = SearchOptions::new().filter(
//!     FilterExpression::new().or(FilterExpression::new()
//!         .with("is_donut", true)
//!         .with("categories", vec!["glazed", "filled"])),
//! );
//!
//! let request = build_search_request(
//!     "http://search-bakery.us-east-1.cloudsearch.amazonaws.com/2013-01-01/search",
//!     "nom",
//!     &options,
//!     Dialect::Structured,
//! )?;
//! assert_eq!(
//!     request.param("q"),
//!     Some(
//!         "(and 'nom' (or (term field=is_donut 'true') \
//!          (or (term field=categories 'glazed') (term field=categories 'filled'))))"
//!     )
//! );
//! # Ok::<(), stratus::filter::CompileError>(())
//! ```
//!
//! # Features
//!
//! - **Filter compiler**: `and`/`or`/`not` groups, implicit OR over lists, open and
//!   half-open ranges, `*_or` field groups
//! - **Geo queries**: bounding boxes from a point and radius, distance sorting
//! - **Pagination**: result pages with total/current page arithmetic
//! - **Document batches**: add, update and delete records for the write endpoint
//! - **Pluggable transport**: a blocking `reqwest` transport ships behind the `http` feature
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod client;
mod config;
pub mod dialect;
mod document;
pub mod domain;
pub mod error;
pub mod filter;
pub mod geo;
mod page;
pub mod request;
mod schema;
pub mod transport;

pub use client::Client;
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_AWS_REGION, Mode};
pub use dialect::Dialect;
pub use document::{DocumentEncoder, DocumentOperation, FieldValue, NullFieldPolicy};
pub use domain::{DomainDiscovery, DomainResolver};
pub use filter::{FilterExpression, FilterValue, RangeSpec};
pub use geo::{DistanceUnit, GeoQuery};
pub use page::{HitFields, Hits, Page, SearchPage};
pub use request::{
    Rank, SearchOptions, SearchRequest, SortDirection, build_document_request,
    build_search_request,
};
pub use schema::IndexSchema;
pub use stratus_geo as coordinates;
#[cfg(feature = "http")]
pub use transport::ReqwestTransport;
pub use transport::{HttpResponse, Transport};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the Stratus library.
///
/// Installs a `tracing` subscriber honouring `RUST_LOG`, falling back to `level`. HTTP
/// client internals are capped at `warn`. Later calls are no-ops.
///
/// # Examples
///
/// ```rust
/// use stratus::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), stratus::error::StratusError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::StratusError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("hyper_util=warn".parse()?)
            .add_directive("reqwest=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .map_err(|err| anyhow::anyhow!(err))?;
        Ok(())
    })
}
