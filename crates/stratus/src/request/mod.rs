//! Request assembly: search URLs and document batch bodies.
//!
//! Nothing here performs I/O. The functions return request descriptors that a
//! [`Transport`](crate::Transport) executes.

use std::fmt;

use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

mod batch;
mod search;

pub use batch::{DocumentRequest, build_document_request};
pub use search::{SearchRequest, build_search_request};

use crate::{filter::FilterExpression, geo::GeoQuery};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
/// Bucket cap sent with every facet request; the endpoint has no "all buckets" option.
pub const MAX_FACETS_SIZE: u32 = 999;

/// Form encoding: unreserved characters pass through and spaces become `+`.
const FORM_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b' ');

pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, FORM_ENCODE_SET)
        .to_string()
        .replace(' ', "+")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field to rank results by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rank {
    pub field: String,
    pub direction: SortDirection,
}

impl From<&str> for Rank {
    fn from(field: &str) -> Self {
        Self {
            field: field.to_owned(),
            direction: SortDirection::Asc,
        }
    }
}

impl From<String> for Rank {
    fn from(field: String) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }
}

impl<S: Into<String>> From<(S, SortDirection)> for Rank {
    fn from((field, direction): (S, SortDirection)) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Everything about a search besides the free-text term.
///
/// ```rust
/// use stratus::{FilterExpression, SearchOptions, SortDirection};
///
/// let options = SearchOptions::new()
///     .filter(FilterExpression::new().with("genre", "jazz"))
///     .rank(("year", SortDirection::Desc))
///     .page(2)
///     .page_size(25);
/// assert_eq!(options.offset(), 25);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub(crate) filter: Option<FilterExpression>,
    pub(crate) geo: Option<GeoQuery>,
    pub(crate) page: Option<u64>,
    pub(crate) page_size: u64,
    pub(crate) rank: Option<Rank>,
    pub(crate) facets: Vec<String>,
    pub(crate) field_weights: IndexMap<String, f64>,
    pub(crate) return_fields: Vec<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            filter: None,
            geo: None,
            page: None,
            page_size: DEFAULT_PAGE_SIZE,
            rank: None,
            facets: Vec::new(),
            field_weights: IndexMap::new(),
            return_fields: Vec::new(),
        }
    }
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict hits to those matching `filter`.
    pub fn filter(mut self, filter: FilterExpression) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn geo(mut self, geo: GeoQuery) -> Self {
        self.geo = Some(geo);
        self
    }

    /// 1-based page number.
    pub fn page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    /// Results per page, at least 1.
    pub fn page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Order by a field. A bare name sorts ascending.
    ///
    /// ```rust
    /// use stratus::{SearchOptions, SortDirection};
    ///
    /// let newest_first = SearchOptions::new().rank(("created_at", SortDirection::Desc));
    /// let by_name = SearchOptions::new().rank("name");
    /// ```
    pub fn rank(mut self, rank: impl Into<Rank>) -> Self {
        self.rank = Some(rank.into());
        self
    }

    /// Request bucket counts for each of `facets`.
    pub fn facets<I, S>(mut self, facets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.facets = facets.into_iter().map(Into::into).collect();
        self
    }

    /// Per-field relevance weight, kept in insertion order.
    pub fn weight(mut self, field: impl Into<String>, weight: f64) -> Self {
        self.field_weights.insert(field.into(), weight);
        self
    }

    pub fn return_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.return_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub const fn current_page(&self) -> u64 {
        match self.page {
            Some(page) => page,
            None => 1,
        }
    }

    pub const fn per_page(&self) -> u64 {
        self.page_size
    }

    /// Index of the first requested hit. Page 0 is treated as page 1.
    pub const fn offset(&self) -> u64 {
        self.current_page()
            .saturating_sub(1)
            .saturating_mul(self.page_size)
    }
}
