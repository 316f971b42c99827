//! Boolean/range filter language and its compiler.
//!
//! A [`FilterExpression`] is an ordered set of `key => value` entries. Keys are either
//! boolean operators (`and`, `or`, `not`) wrapping a nested expression, a field group
//! ending in [`OR_SUFFIX`] whose nested fields are expanded into one explicit OR group,
//! or plain field names. Values may be scalars, ranges, lists (an implicit OR over the
//! same field) or `Null`/blank strings, which are dropped.
//!
//! Compilation happens in two passes: [`parse`] classifies the shorthand into an explicit
//! [`Clause`] tree, and [`render`] turns that tree into wire syntax for a [`Dialect`].
//!
//! ```rust
//! use stratus::{Dialect, FilterExpression, filter};
//!
//! let expression = FilterExpression::new().and(
//!     FilterExpression::new()
//!         .with("foo", "bar")
//!         .with("baz", "bug"),
//! );
//!
//! assert_eq!(
//!     filter::compile(&expression, Dialect::Legacy)?,
//!     "(and foo:'bar' baz:'bug')"
//! );
//! assert_eq!(
//!     filter::compile(&expression, Dialect::Structured)?,
//!     "(and (term field=foo 'bar') (term field=baz 'bug'))"
//! );
//! # Ok::<(), stratus::filter::CompileError>(())
//! ```

use std::fmt;

pub use error::CompileError;
use error::Result;
mod parse;
mod render;
mod value;

pub use parse::{Clause, Scalar, parse};
pub use render::{quote, render};
pub use value::{RangeEndpoint, RangeSpec};

use crate::dialect::Dialect;

/// Suffix marking a key as an explicit OR group over its nested fields.
pub const OR_SUFFIX: &str = "_or";

/// Boolean operator keys of a filter expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Or,
    Not,
}

impl BoolOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "not" => Some(Self::Not),
            _ => None,
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an expression key is interpreted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyKind<'a> {
    /// `and` / `or` / `not`.
    Operator(BoolOp),
    /// A `*_or` key holding `field => values` pairs.
    OrShorthand {
        name: &'a str,
        terms: &'a FilterExpression,
    },
    Field(&'a str),
}

impl<'a> KeyKind<'a> {
    pub fn classify(key: &'a str, value: &'a FilterValue) -> Self {
        if let Some(op) = BoolOp::from_key(key) {
            return Self::Operator(op);
        }
        match value {
            FilterValue::Expr(terms) if key.ends_with(OR_SUFFIX) => Self::OrShorthand {
                name: key,
                terms,
            },
            _ => Self::Field(key),
        }
    }
}

/// An ordered, immutable filter tree.
///
/// Built by chaining [`FilterExpression::with`] (or collected from `(key, value)` pairs);
/// entries render in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpression {
    entries: Vec<(String, FilterValue)>,
}

impl FilterExpression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Duplicate keys are kept, in order.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    pub fn and(self, nested: Self) -> Self {
        self.with(BoolOp::And.as_str(), nested)
    }

    pub fn or(self, nested: Self) -> Self {
        self.with(BoolOp::Or.as_str(), nested)
    }

    pub fn not(self, nested: Self) -> Self {
        self.with(BoolOp::Not.as_str(), nested)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for FilterExpression {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Anything that can sit on the right-hand side of a filter entry.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    DateTime(chrono::DateTime<chrono::Utc>),
    Range(RangeSpec),
    List(Vec<FilterValue>),
    Expr(FilterExpression),
}

/// Compile an expression into wire syntax for `dialect`.
pub fn compile(expression: &FilterExpression, dialect: Dialect) -> Result<String> {
    render(&parse(expression)?, dialect)
}

/// Merge a free-text term with compiled clauses into one structured-parser query.
///
/// With both present the result is `(and '<term>' <filter>)`. A filter on its own is sent
/// as-is when it is a single clause and wrapped in `(and ...)` when it has several
/// top-level clauses. Without clauses the raw term is returned. A whitespace-only term counts
/// as no term.
pub fn structured_query(term: &str, clauses: &[Clause]) -> Result<String> {
    if clauses.is_empty() {
        return Ok(term.to_owned());
    }
    let filter = render(clauses, Dialect::Structured)?;
    Ok(if !term.trim().is_empty() {
        format!("(and {} {filter})", quote(term))
    } else if clauses.len() > 1 {
        format!("(and {filter})")
    } else {
        filter
    })
}

mod error {
    use thiserror::Error;

    use super::BoolOp;

    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum CompileError {
        #[error("Operator `{0}` expects a nested expression")]
        OperatorNeedsExpression(BoolOp),
        #[error("Filter keys must not be empty")]
        EmptyFieldName,
        #[error("Field `{0}` cannot hold a nested expression")]
        NestedExpression(String),
        #[error("Field `{0}` holds a list nested inside a list")]
        NestedList(String),
        #[error("Field `{0}` holds a number that is not finite")]
        NonFinite(String),
        #[error("Range on `{0}` has neither a lower nor an upper bound")]
        UnboundedRange(String),
        #[error("Group `{0}` may only hold fields with scalar, range or list values")]
        OrShorthandShape(String),
        #[error("Range on `{field}` has an exclusive {side} bound the legacy dialect cannot express")]
        ExclusiveBound { field: String, side: &'static str },
        #[error("Number `{0}` does not fit a signed 64-bit integer")]
        IntegerOutOfRange(String),
        #[error("Expected a JSON object for a filter expression, found `{0}`")]
        NotAnExpression(String),
        #[error("Geo error: {0}")]
        Geo(#[from] stratus_geo::GeoError),
    }
    pub type Result<T> = std::result::Result<T, CompileError>;
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    fn donuts(round: impl Into<FilterValue>) -> FilterExpression {
        FilterExpression::new().or(FilterExpression::new()
            .with("is_donut", true)
            .and(
                FilterExpression::new()
                    .with("round", round)
                    .with("frosting", FilterValue::Null)
                    .with("fried", FilterValue::Null),
            ))
    }

    #[test]
    fn test_legacy_and_group_keeps_key_order() {
        let expression = FilterExpression::new().and(
            FilterExpression::new()
                .with("foo", "bar")
                .with("baz", "bug"),
        );
        assert_eq!(
            compile(&expression, Dialect::Legacy).unwrap(),
            "(and foo:'bar' baz:'bug')"
        );
    }

    #[test]
    fn test_structured_and_group() {
        let expression = FilterExpression::new().and(
            FilterExpression::new()
                .with("foo", "bar")
                .with("baz", "bug"),
        );
        assert_eq!(
            compile(&expression, Dialect::Structured).unwrap(),
            "(and (term field=foo 'bar') (term field=baz 'bug'))"
        );
    }

    #[test]
    fn test_blank_and_null_values_vanish() {
        assert_eq!(
            compile(&donuts(""), Dialect::Legacy).unwrap(),
            "(or is_donut:'true')"
        );
        assert_eq!(
            compile(&donuts(""), Dialect::Structured).unwrap(),
            "(or (term field=is_donut 'true'))"
        );
    }

    #[test]
    fn test_nested_groups() {
        let expression = FilterExpression::new().or(FilterExpression::new()
            .with("is_donut", true)
            .and(
                FilterExpression::new()
                    .with("round", true)
                    .with("frosting", true)
                    .with("fried", true),
            ));
        assert_eq!(
            compile(&expression, Dialect::Legacy).unwrap(),
            "(or is_donut:'true' (and round:'true' frosting:'true' fried:'true'))"
        );
    }

    #[test]
    fn test_all_empty_expression_compiles_to_nothing() {
        let expression = FilterExpression::new().and(
            FilterExpression::new()
                .with("a", "")
                .or(FilterExpression::new().with("b", FilterValue::Null)),
        );
        assert_eq!(compile(&expression, Dialect::Legacy).unwrap(), "");
    }

    #[test]
    fn test_list_values_become_implicit_or() {
        let expression =
            FilterExpression::new().with("categories", vec!["Painting", "Sculpture"]);
        assert_eq!(
            compile(&expression, Dialect::Legacy).unwrap(),
            "(or categories:'Painting' categories:'Sculpture')"
        );
        assert_eq!(
            compile(&expression, Dialect::Structured).unwrap(),
            "(or (term field=categories 'Painting') (term field=categories 'Sculpture'))"
        );
    }

    #[test]
    fn test_single_and_empty_lists() {
        let single = FilterExpression::new().with("categories", vec!["Painting"]);
        assert_eq!(
            compile(&single, Dialect::Legacy).unwrap(),
            "categories:'Painting'"
        );

        let empty = FilterExpression::new()
            .with("categories", Vec::<String>::new())
            .with("year", 1999);
        assert_eq!(compile(&empty, Dialect::Legacy).unwrap(), "year:1999");
    }

    #[test]
    fn test_or_shorthand_expands_fields() {
        let expression = FilterExpression::new().with(
            "medium_or",
            FilterExpression::new()
                .with("medium", vec!["oil", "acrylic"])
                .with("style", "cubist"),
        );
        assert_eq!(
            compile(&expression, Dialect::Legacy).unwrap(),
            "(or medium:'oil' medium:'acrylic' style:'cubist')"
        );
        assert_eq!(
            compile(&expression, Dialect::Structured).unwrap(),
            "(or (term field=medium 'oil') (term field=medium 'acrylic') (term field=style 'cubist'))"
        );
    }

    #[test]
    fn test_ranges_per_dialect() {
        let expression = FilterExpression::new()
            .with("year", 1990..=2000)
            .with("price", RangeSpec::at_least(10))
            .with("rating", RangeSpec::at_most(5.5));
        assert_eq!(
            compile(&expression, Dialect::Legacy).unwrap(),
            "year:1990..2000 price:10.. rating:..5.5"
        );
        assert_eq!(
            compile(&expression, Dialect::Structured).unwrap(),
            "(range field=year [1990,2000]) (range field=price [10,}) (range field=rating {,5.5])"
        );
    }

    #[test]
    fn test_exclusive_ranges() {
        let expression = FilterExpression::new().with("year", 1990..2000);
        assert_eq!(
            compile(&expression, Dialect::Structured).unwrap(),
            "(range field=year [1990,2000})"
        );
        assert_eq!(
            compile(&expression, Dialect::Legacy).unwrap(),
            "year:1990..1999"
        );

        let float = FilterExpression::new().with("score", 0.5..1.0);
        assert_eq!(
            compile(&float, Dialect::Legacy),
            Err(CompileError::ExclusiveBound {
                field: "score".into(),
                side: "upper",
            })
        );
    }

    #[test]
    fn test_date_ranges_are_quoted_iso_timestamps() {
        let start = Utc.with_ymd_and_hms(2012, 4, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2012, 5, 1, 12, 30, 0).unwrap();
        let expression = FilterExpression::new().with("published", start..=end);
        assert_eq!(
            compile(&expression, Dialect::Structured).unwrap(),
            "(range field=published ['2012-04-01T00:00:00Z','2012-05-01T12:30:00Z'])"
        );
        assert_eq!(
            compile(&expression, Dialect::Legacy).unwrap(),
            "published:'2012-04-01T00:00:00Z'..'2012-05-01T12:30:00Z'"
        );
    }

    #[test]
    fn test_not_with_several_children_wraps_in_and() {
        let expression = FilterExpression::new().not(
            FilterExpression::new()
                .with("color", "red")
                .with("size", 3),
        );
        assert_eq!(
            compile(&expression, Dialect::Structured).unwrap(),
            "(not (and (term field=color 'red') (term field=size 3)))"
        );
    }

    #[test]
    fn test_quotes_are_escaped() {
        let expression = FilterExpression::new().with("title", "Rosie's \\ Diner");
        assert_eq!(
            compile(&expression, Dialect::Legacy).unwrap(),
            r"title:'Rosie\'s \\ Diner'"
        );
    }

    #[test]
    fn test_malformed_shapes_fail_fast() {
        let nested_list =
            FilterExpression::new().with("tags", vec![FilterValue::List(vec!["a".into()])]);
        assert_eq!(
            compile(&nested_list, Dialect::Legacy),
            Err(CompileError::NestedList("tags".into()))
        );

        let nested_expr =
            FilterExpression::new().with("tags", FilterExpression::new().with("a", 1));
        assert_eq!(
            compile(&nested_expr, Dialect::Legacy),
            Err(CompileError::NestedExpression("tags".into()))
        );

        let scalar_operator = FilterExpression::new().with("and", "oops");
        assert_eq!(
            compile(&scalar_operator, Dialect::Legacy),
            Err(CompileError::OperatorNeedsExpression(BoolOp::And))
        );

        let nan = FilterExpression::new().with("score", f64::NAN);
        assert_eq!(
            compile(&nan, Dialect::Legacy),
            Err(CompileError::NonFinite("score".into()))
        );

        let open = FilterExpression::new().with("score", RangeSpec::unbounded());
        assert_eq!(
            compile(&open, Dialect::Legacy),
            Err(CompileError::UnboundedRange("score".into()))
        );
    }

    #[test]
    fn test_json_expressions_keep_order() {
        let expression = FilterExpression::try_from(json!({
            "and": { "zeta": "z", "alpha": 1, "mid": ["x", "y"] }
        }))
        .unwrap();
        assert_eq!(
            compile(&expression, Dialect::Legacy).unwrap(),
            "(and zeta:'z' alpha:1 (or mid:'x' mid:'y'))"
        );
    }

    #[test]
    fn test_structured_query_combination() {
        let clauses = parse(&donuts(true)).unwrap();
        assert_eq!(
            structured_query("nom", &clauses).unwrap(),
            "(and 'nom' (or (term field=is_donut 'true') (and (term field=round 'true'))))"
        );
        assert_eq!(
            structured_query("", &clauses).unwrap(),
            "(or (term field=is_donut 'true') (and (term field=round 'true')))"
        );

        let flat = parse(
            &FilterExpression::new()
                .with("foo", "bar")
                .with("baz", 2),
        )
        .unwrap();
        assert_eq!(
            structured_query("", &flat).unwrap(),
            "(and (term field=foo 'bar') (term field=baz 2))"
        );
        assert_eq!(structured_query("plain", &[]).unwrap(), "plain");
    }

    #[test]
    fn test_structured_query_ignores_blank_term() {
        let clauses = parse(&FilterExpression::new().with("a", 1)).unwrap();
        assert_eq!(
            structured_query("   ", &clauses).unwrap(),
            "(term field=a 1)"
        );
    }

    #[test]
    fn test_key_classification() {
        let nested = FilterValue::Expr(FilterExpression::new());
        let scalar = FilterValue::from("x");
        assert_eq!(
            KeyKind::classify("not", &nested),
            KeyKind::Operator(BoolOp::Not)
        );
        assert!(matches!(
            KeyKind::classify("medium_or", &nested),
            KeyKind::OrShorthand {
                name: "medium_or",
                ..
            }
        ));
        assert_eq!(
            KeyKind::classify("medium_or", &scalar),
            KeyKind::Field("medium_or")
        );
        assert_eq!(KeyKind::classify("title", &scalar), KeyKind::Field("title"));
    }
}
