use super::{BoolOp, Clause, error::Result};
use crate::dialect::Dialect;

/// Render clauses as wire syntax, joining top-level clauses with a single space.
pub fn render(clauses: &[Clause], dialect: Dialect) -> Result<String> {
    let rendered = clauses
        .iter()
        .map(|clause| render_clause(clause, dialect))
        .collect::<Result<Vec<_>>>()?;
    Ok(rendered.join(" "))
}

fn render_clause(clause: &Clause, dialect: Dialect) -> Result<String> {
    Ok(match clause {
        Clause::Group {
            op: BoolOp::Not,
            children,
        } if children.len() > 1 => {
            format!("(not (and {}))", render(children, dialect)?)
        }
        Clause::Group { op, children } => format!("({op} {})", render(children, dialect)?),
        Clause::OrShorthand { clauses, .. } | Clause::AnyOf { clauses, .. } => {
            format!("({} {})", BoolOp::Or, render(clauses, dialect)?)
        }
        Clause::Term { field, value } => dialect.format_term(field, value),
        Clause::Range { field, range } => dialect.format_range(field, range)?,
    })
}

/// Single-quote a value, escaping embedded quotes and backslashes.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if matches!(c, '\'' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}
