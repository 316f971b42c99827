//! Per-API-version formatting rules.
//!
//! CloudSearch speaks two incompatible query syntaxes. The `2011-02-01` API takes a free-text
//! `q` plus a boolean query in `bq` written as `field:'value'` terms. The `2013-01-01` API
//! takes a single structured query in `q` (with `q.parser=structured`) written as
//! `(term field=f 'value')` and `(range field=f [a,b])` clauses.

use std::ops::Bound;

use chrono::SecondsFormat;

use crate::{
    filter::{CompileError, RangeEndpoint, RangeSpec, Scalar, quote},
    request::SortDirection,
};

pub const LEGACY_API_VERSION: &str = "2011-02-01";
pub const STRUCTURED_API_VERSION: &str = "2013-01-01";

/// Query syntax spoken by a CloudSearch API version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `2011-02-01` boolean query syntax.
    #[default]
    Legacy,
    /// `2013-01-01` structured query syntax.
    Structured,
}

impl Dialect {
    /// Resolve a dialect from an API version string; anything unrecognised is legacy.
    pub fn from_api_version(version: &str) -> Self {
        match version.trim() {
            STRUCTURED_API_VERSION => Self::Structured,
            _ => Self::Legacy,
        }
    }

    pub const fn api_version(self) -> &'static str {
        match self {
            Self::Legacy => LEGACY_API_VERSION,
            Self::Structured => STRUCTURED_API_VERSION,
        }
    }

    /// Query parameter carrying the compiled filter.
    pub const fn filter_param(self) -> &'static str {
        match self {
            Self::Legacy => "bq",
            Self::Structured => "q",
        }
    }

    /// Query parameter carrying the comma-separated ordering.
    pub const fn rank_param(self) -> &'static str {
        match self {
            Self::Legacy => "rank",
            Self::Structured => "sort",
        }
    }

    /// Query parameter listing the fields to return with each hit.
    pub const fn return_fields_param(self) -> &'static str {
        match self {
            Self::Legacy => "return-fields",
            Self::Structured => "return",
        }
    }

    /// Whether the free-text term and the filter travel together in one parameter.
    pub const fn combines_term_and_filter(self) -> bool {
        matches!(self, Self::Structured)
    }

    /// Name of the parameter defining a named rank expression.
    pub fn expression_param(self, name: &str) -> String {
        match self {
            Self::Legacy => format!("rank-{name}"),
            Self::Structured => format!("expr.{name}"),
        }
    }

    pub fn format_rank(self, field: &str, direction: SortDirection) -> String {
        match (self, direction) {
            (Self::Legacy, SortDirection::Asc) => field.to_owned(),
            (Self::Legacy, SortDirection::Desc) => format!("-{field}"),
            (Self::Structured, direction) => format!("{field} {}", direction.as_str()),
        }
    }

    /// A single `field = value` match in this dialect's syntax.
    pub fn format_term(self, field: &str, value: &Scalar) -> String {
        let token = match value {
            Scalar::Bool(b) => quote(&b.to_string()),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Str(s) => quote(s),
            Scalar::DateTime(dt) => quote(&dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
        };
        match self {
            Self::Legacy => format!("{field}:{token}"),
            Self::Structured => format!("(term field={field} {token})"),
        }
    }

    pub fn format_range(self, field: &str, range: &RangeSpec) -> Result<String, CompileError> {
        if range.is_unbounded() {
            return Err(CompileError::UnboundedRange(field.to_owned()));
        }
        match self {
            Self::Structured => {
                let (open, lower) = match range.lower() {
                    Bound::Included(v) => ('[', endpoint_token(v)),
                    Bound::Excluded(v) => ('{', endpoint_token(v)),
                    Bound::Unbounded => ('{', String::new()),
                };
                let (upper, close) = match range.upper() {
                    Bound::Included(v) => (endpoint_token(v), ']'),
                    Bound::Excluded(v) => (endpoint_token(v), '}'),
                    Bound::Unbounded => (String::new(), '}'),
                };
                Ok(format!("(range field={field} {open}{lower},{upper}{close})"))
            }
            Self::Legacy => {
                let lower = legacy_bound(field, range.lower(), Side::Lower)?;
                let upper = legacy_bound(field, range.upper(), Side::Upper)?;
                Ok(format!("{field}:{lower}..{upper}"))
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Side {
    Lower,
    Upper,
}

/// Legacy ranges are inclusive only, so exclusive integer bounds are tightened by one.
fn legacy_bound(
    field: &str,
    bound: &Bound<RangeEndpoint>,
    side: Side,
) -> Result<String, CompileError> {
    let exclusive = || CompileError::ExclusiveBound {
        field: field.to_owned(),
        side: match side {
            Side::Lower => "lower",
            Side::Upper => "upper",
        },
    };
    match bound {
        Bound::Unbounded => Ok(String::new()),
        Bound::Included(v) => Ok(endpoint_token(v)),
        Bound::Excluded(RangeEndpoint::Int(i)) => {
            let tightened = match side {
                Side::Lower => i.checked_add(1),
                Side::Upper => i.checked_sub(1),
            };
            tightened.map(|i| i.to_string()).ok_or_else(exclusive)
        }
        Bound::Excluded(_) => Err(exclusive()),
    }
}

fn endpoint_token(endpoint: &RangeEndpoint) -> String {
    match endpoint {
        RangeEndpoint::Int(i) => i.to_string(),
        RangeEndpoint::Float(f) => f.to_string(),
        RangeEndpoint::Str(s) => quote(s),
        RangeEndpoint::DateTime(dt) => quote(&dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
    }
}
