use itertools::Itertools;
use tracing::debug;

use super::{MAX_FACETS_SIZE, SearchOptions, encode};
use crate::{
    dialect::Dialect,
    filter::{CompileError, parse, render, structured_query},
};

/// A fully assembled search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub url: String,
    /// Unencoded query parameters, in wire order.
    pub params: Vec<(String, String)>,
}

impl SearchRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Build the search URL for `term` and `options` against `endpoint`.
pub fn build_search_request(
    endpoint: &str,
    term: &str,
    options: &SearchOptions,
    dialect: Dialect,
) -> Result<SearchRequest, CompileError> {
    if let Some((field, _)) = options
        .field_weights
        .iter()
        .find(|(_, weight)| !weight.is_finite())
    {
        return Err(CompileError::NonFinite(field.clone()));
    }
    let mut clauses = match &options.filter {
        Some(filter) => parse(filter)?,
        None => Vec::new(),
    };
    let geo = match &options.geo {
        Some(geo) => geo.compile(dialect)?,
        None => None,
    };
    let distance = geo.and_then(|geo| {
        clauses.extend(geo.filter);
        geo.sort
    });

    let mut params: Vec<(String, String)> = Vec::new();
    let mut push = |key: &str, value: String| params.push((key.to_owned(), value));

    if dialect.combines_term_and_filter() {
        if clauses.is_empty() {
            push("q", term.to_owned());
        } else {
            push("q", structured_query(term, &clauses)?);
            push("q.parser", "structured".to_owned());
        }
    } else {
        push("q", term.to_owned());
        let filter = render(&clauses, dialect)?;
        if !filter.is_empty() {
            push(dialect.filter_param(), filter);
        }
    }

    match dialect {
        Dialect::Structured => {
            for facet in &options.facets {
                push(
                    &format!("facet.{facet}"),
                    format!("{{sort:'bucket',size:{MAX_FACETS_SIZE}}}"),
                );
            }
        }
        Dialect::Legacy => {
            if !options.facets.is_empty() {
                push("facet", options.facets.join(","));
            }
        }
    }

    push("size", options.page_size.to_string());

    if !options.return_fields.is_empty() {
        push(
            dialect.return_fields_param(),
            options.return_fields.join(","),
        );
    }

    if options.page.is_some() {
        push("start", options.offset().to_string());
    }

    let ranks = distance
        .iter()
        .map(|sort| sort.rank(dialect))
        .chain(
            options
                .rank
                .iter()
                .map(|rank| dialect.format_rank(&rank.field, rank.direction)),
        )
        .join(",");
    if !ranks.is_empty() {
        push(dialect.rank_param(), ranks);
    }

    if let Some(sort) = &distance {
        push(&dialect.expression_param(sort.name), sort.expression.clone());
    }

    if !options.field_weights.is_empty() {
        let fields = options
            .field_weights
            .iter()
            .map(|(field, weight)| format!("'{field}^{weight}'"))
            .join(",");
        push("q.options", format!("{{fields:[{fields}]}}"));
    }

    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
        .join("&");
    let url = format!("{endpoint}?{query}");
    debug!(%url, "Assembled search request");

    Ok(SearchRequest { url, params })
}
