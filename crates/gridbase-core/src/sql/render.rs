//! Single serializer for predicate fragments.
//!
//! This is the only place identifiers are quoted and literals are escaped.
//! Output is a pure function of the input tree.

use crate::sql::{SqlExpr, SqlLiteral};
use std::borrow::Cow;

/// Render one fragment as PostgreSQL text.
#[must_use]
pub fn render(expr: &SqlExpr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr);

    out
}

/// Quote an identifier, doubling embedded double quotes.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Escape a raw literal body.
///
/// Non-JSON strings get single quotes doubled and backslashes doubled; JSON
/// looking payloads only get single quotes doubled so their own escapes
/// survive intact.
#[must_use]
pub fn escape_literal(raw: &str) -> Cow<'_, str> {
    let json = looks_like_json(raw);
    let needs_work = raw.contains('\'') || (!json && raw.contains('\\'));
    if !needs_work {
        return Cow::Borrowed(raw);
    }

    let mut escaped = String::with_capacity(raw.len() + 4);
    for ch in raw.chars() {
        match ch {
            '\'' => escaped.push_str("''"),
            '\\' if !json => escaped.push_str("\\\\"),
            other => escaped.push(other),
        }
    }

    Cow::Owned(escaped)
}

/// Quote a literal. Bodies whose backslashes were doubled use the `E''`
/// form so the server reads them back as single backslashes.
#[must_use]
pub fn quote_literal(raw: &str) -> String {
    let escaped = escape_literal(raw);
    if !looks_like_json(raw) && raw.contains('\\') {
        format!("E'{escaped}'")
    } else {
        format!("'{escaped}'")
    }
}

/// Escape `LIKE` wildcards so user text matches literally.
#[must_use]
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }

    escaped
}

fn looks_like_json(raw: &str) -> bool {
    let trimmed = raw.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}

fn write_expr(out: &mut String, expr: &SqlExpr) {
    match expr {
        SqlExpr::Literal(literal) => write_literal(out, literal),
        SqlExpr::Column(name) => out.push_str(&quote_ident(name)),
        SqlExpr::JsonText { column, key } => {
            out.push('(');
            out.push_str(&quote_ident(column));
            out.push_str(" ->> ");
            out.push_str(&quote_literal(key));
            out.push(')');
        }
        SqlExpr::Binary { op, left, right } => {
            write_operand(out, left);
            out.push(' ');
            out.push_str(op.symbol());
            out.push(' ');
            write_operand(out, right);
        }
        SqlExpr::Call { function, args } => {
            out.push_str(function);
            out.push('(');
            write_list(out, args, ", ");
            out.push(')');
        }
        SqlExpr::Concat(parts) => {
            out.push('(');
            write_list(out, parts, " || ");
            out.push(')');
        }
        SqlExpr::Array(items) => {
            out.push_str("ARRAY[");
            write_list(out, items, ", ");
            out.push(']');
        }
        SqlExpr::Not(inner) => {
            out.push_str("NOT ");
            write_operand(out, inner);
        }
        SqlExpr::IsNull { expr, negated } => {
            write_operand(out, expr);
            out.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
        }
        SqlExpr::Like {
            expr,
            pattern,
            negated,
        } => {
            write_operand(out, expr);
            out.push_str(if *negated { " NOT ILIKE " } else { " ILIKE " });
            write_operand(out, pattern);
        }
        SqlExpr::InList {
            expr,
            list,
            negated,
        } => {
            write_operand(out, expr);
            out.push_str(if *negated { " NOT IN (" } else { " IN (" });
            write_list(out, list, ", ");
            out.push(')');
        }
        SqlExpr::Junction {
            conjunction,
            children,
        } => {
            if children.is_empty() {
                out.push_str("TRUE");
                return;
            }

            let separator = format!(" {} ", conjunction.keyword());
            for (index, child) in children.iter().enumerate() {
                if index > 0 {
                    out.push_str(&separator);
                }
                out.push('(');
                write_expr(out, child);
                out.push(')');
            }
        }
    }
}

// Compound operands are parenthesized so precedence never depends on the
// surrounding operator.
fn write_operand(out: &mut String, expr: &SqlExpr) {
    if expr.is_atomic() {
        write_expr(out, expr);
    } else {
        out.push('(');
        write_expr(out, expr);
        out.push(')');
    }
}

fn write_list(out: &mut String, items: &[SqlExpr], separator: &str) {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.push_str(separator);
        }
        write_operand(out, item);
    }
}

fn write_literal(out: &mut String, literal: &SqlLiteral) {
    match literal {
        SqlLiteral::Bool(true) => out.push_str("TRUE"),
        SqlLiteral::Bool(false) => out.push_str("FALSE"),
        SqlLiteral::Number(number) => out.push_str(&number.to_string()),
        SqlLiteral::Text(text) => out.push_str(&quote_literal(text)),
        SqlLiteral::Json(document) => {
            out.push('\'');
            out.push_str(&escape_literal(document));
            out.push_str("'::jsonb");
        }
        SqlLiteral::Timestamp(instant) => {
            out.push_str(&quote_literal(instant));
            out.push_str("::timestamptz");
        }
    }
}
