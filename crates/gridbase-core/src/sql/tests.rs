use crate::sql::{
    BinaryOp, SqlExpr, SqlLiteral, escape_like, escape_literal, quote_ident, quote_literal,
    render,
};
use proptest::prelude::*;

#[test]
fn identifiers_double_embedded_quotes() {
    assert_eq!(quote_ident("title"), "\"title\"");
    assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
}

#[test]
fn plain_text_escapes_quotes_and_backslashes() {
    assert_eq!(escape_literal("plain"), "plain");
    assert_eq!(escape_literal("O'Brien\\"), "O''Brien\\\\");
    assert_eq!(quote_literal("O'Brien\\"), "E'O''Brien\\\\'");
    assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
}

#[test]
fn json_payloads_keep_their_backslashes() {
    let document = r#"["it's", "a\"b"]"#;
    assert_eq!(escape_literal(document), r#"["it''s", "a\"b"]"#);
    assert_eq!(
        render(&SqlExpr::json(document)),
        r#"'["it''s", "a\"b"]'::jsonb"#
    );
}

#[test]
fn like_wildcards_are_escaped() {
    assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
}

#[test]
fn junction_parenthesizes_every_child() {
    let expr = SqlExpr::and(vec![
        SqlExpr::or(vec![
            SqlExpr::is_null(SqlExpr::column("a")),
            SqlExpr::eq(SqlExpr::column("a"), SqlExpr::text("")),
        ]),
        SqlExpr::binary(BinaryOp::Gt, SqlExpr::column("n"), SqlExpr::number(3)),
    ]);

    assert_eq!(
        render(&expr),
        "((\"a\" IS NULL) OR (\"a\" = '')) AND (\"n\" > 3)"
    );
    assert_eq!(render(&SqlExpr::and(Vec::new())), "TRUE");
}

#[test]
fn compound_operands_are_parenthesized() {
    let expr = SqlExpr::not(SqlExpr::call(
        "jsonb_exists_any",
        vec![
            SqlExpr::column("tags"),
            SqlExpr::Array(vec![SqlExpr::text("a"), SqlExpr::text("b")]),
        ],
    ));
    assert_eq!(
        render(&expr),
        "NOT jsonb_exists_any(\"tags\", ARRAY['a', 'b'])"
    );

    let negated_junction = SqlExpr::not(SqlExpr::or(vec![
        SqlExpr::is_null(SqlExpr::column("a")),
        SqlExpr::column("b"),
    ]));
    assert_eq!(
        render(&negated_junction),
        "NOT ((\"a\" IS NULL) OR (\"b\"))"
    );
}

#[test]
fn literals_render_with_their_sql_types() {
    assert_eq!(render(&SqlExpr::Literal(SqlLiteral::Bool(false))), "FALSE");
    assert_eq!(
        render(&SqlExpr::Literal(SqlLiteral::Timestamp(
            "2024-03-05T00:00:00Z".to_string()
        ))),
        "'2024-03-05T00:00:00Z'::timestamptz"
    );
    assert_eq!(
        render(&SqlExpr::json_text("addr", "city")),
        "(\"addr\" ->> 'city')"
    );
    assert_eq!(
        render(&SqlExpr::Concat(vec![
            SqlExpr::text("%"),
            SqlExpr::column("other"),
            SqlExpr::text("%"),
        ])),
        "('%' || \"other\" || '%')"
    );
}

// Undo the renderer's text quoting the way PostgreSQL reads it back.
fn unquote(sql: &str) -> String {
    let (escape_form, body) = match sql.strip_prefix('E') {
        Some(rest) => (true, rest),
        None => (false, sql),
    };
    let body = &body[1..body.len() - 1];

    let mut out = String::new();
    let mut chars = body.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\'' if chars.peek() == Some(&'\'') => {
                chars.next();
                out.push('\'');
            }
            '\\' if escape_form && chars.peek() == Some(&'\\') => {
                chars.next();
                out.push('\\');
            }
            other => out.push(other),
        }
    }

    out
}

proptest! {
    #[test]
    fn quoted_text_reads_back_unchanged(raw in "[a-zA-Z0-9 '\\\\%_{}\\[\\]\"]{0,24}") {
        prop_assert_eq!(unquote(&quote_literal(&raw)), raw);
    }

    #[test]
    fn rendering_is_deterministic(raw in "[a-z'\\\\]{0,12}") {
        let expr = SqlExpr::and(vec![
            SqlExpr::eq(SqlExpr::column("c"), SqlExpr::text(raw.clone())),
            SqlExpr::like(SqlExpr::column("c"), SqlExpr::text(escape_like(&raw)), true),
        ]);
        prop_assert_eq!(render(&expr), render(&expr.clone()));
    }
}
