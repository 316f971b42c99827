use chrono::{DateTime, Utc};

use super::{
    BoolOp, CompileError, FilterExpression, FilterValue, KeyKind, RangeSpec, error::Result,
};

/// A single comparable value in a term clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    DateTime(DateTime<Utc>),
}

/// The explicit clause tree produced by [`parse`].
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// `(and ...)`, `(or ...)` or `(not ...)` over nested clauses.
    Group { op: BoolOp, children: Vec<Self> },
    /// A `*_or` key expanded into one OR group of field terms.
    OrShorthand { name: String, clauses: Vec<Self> },
    Term { field: String, value: Scalar },
    Range { field: String, range: RangeSpec },
    /// A list value: the field matches any of the listed terms.
    AnyOf { field: String, clauses: Vec<Self> },
}

/// Classify every entry of `expression` into clauses.
///
/// Blank strings and nulls vanish, as do groups left without children. Shapes the wire
/// syntax cannot express are rejected.
pub fn parse(expression: &FilterExpression) -> Result<Vec<Clause>> {
    let mut clauses = Vec::with_capacity(expression.len());
    for (key, value) in expression.entries() {
        if key.is_empty() {
            return Err(CompileError::EmptyFieldName);
        }
        let clause = match KeyKind::classify(key, value) {
            KeyKind::Operator(op) => {
                let FilterValue::Expr(nested) = value else {
                    return Err(CompileError::OperatorNeedsExpression(op));
                };
                let children = parse(nested)?;
                (!children.is_empty()).then_some(Clause::Group { op, children })
            }
            KeyKind::OrShorthand { name, terms } => parse_or_shorthand(name, terms)?,
            KeyKind::Field(field) => parse_field(field, value)?,
        };
        clauses.extend(clause);
    }
    Ok(clauses)
}

fn parse_or_shorthand(name: &str, terms: &FilterExpression) -> Result<Option<Clause>> {
    let mut clauses = Vec::new();
    for (field, value) in terms.entries() {
        if field.is_empty() {
            return Err(CompileError::EmptyFieldName);
        }
        match value {
            FilterValue::Expr(_) => return Err(CompileError::OrShorthandShape(name.to_owned())),
            FilterValue::List(items) => clauses.extend(parse_list(field, items)?),
            other => clauses.extend(parse_leaf(field, other)?),
        }
    }
    Ok((!clauses.is_empty()).then(|| Clause::OrShorthand {
        name: name.to_owned(),
        clauses,
    }))
}

fn parse_field(field: &str, value: &FilterValue) -> Result<Option<Clause>> {
    let FilterValue::List(items) = value else {
        return parse_leaf(field, value);
    };
    let mut clauses = parse_list(field, items)?;
    Ok(match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(Clause::AnyOf {
            field: field.to_owned(),
            clauses,
        }),
    })
}

fn parse_list(field: &str, items: &[FilterValue]) -> Result<Vec<Clause>> {
    let mut clauses = Vec::with_capacity(items.len());
    for item in items {
        if matches!(item, FilterValue::List(_)) {
            return Err(CompileError::NestedList(field.to_owned()));
        }
        clauses.extend(parse_leaf(field, item)?);
    }
    Ok(clauses)
}

fn parse_leaf(field: &str, value: &FilterValue) -> Result<Option<Clause>> {
    let term = |value| {
        Some(Clause::Term {
            field: field.to_owned(),
            value,
        })
    };
    Ok(match value {
        FilterValue::Null => None,
        FilterValue::Str(s) if s.trim().is_empty() => None,
        FilterValue::Str(s) => term(Scalar::Str(s.clone())),
        FilterValue::Bool(b) => term(Scalar::Bool(*b)),
        FilterValue::Int(i) => term(Scalar::Int(*i)),
        FilterValue::Float(f) if !f.is_finite() => {
            return Err(CompileError::NonFinite(field.to_owned()));
        }
        FilterValue::Float(f) => term(Scalar::Float(*f)),
        FilterValue::DateTime(dt) => term(Scalar::DateTime(*dt)),
        FilterValue::Range(range) => {
            if range.is_unbounded() {
                return Err(CompileError::UnboundedRange(field.to_owned()));
            }
            if range.has_non_finite() {
                return Err(CompileError::NonFinite(field.to_owned()));
            }
            Some(Clause::Range {
                field: field.to_owned(),
                range: range.clone(),
            })
        }
        FilterValue::List(_) => return Err(CompileError::NestedList(field.to_owned())),
        FilterValue::Expr(_) => return Err(CompileError::NestedExpression(field.to_owned())),
    })
}
