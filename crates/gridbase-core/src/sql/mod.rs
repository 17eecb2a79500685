//! Predicate fragment AST and its renderer.

mod ast;
mod render;

pub use ast::{BinaryOp, SqlExpr, SqlLiteral};
pub use render::{escape_like, escape_literal, quote_ident, quote_literal, render};

#[cfg(test)]
mod tests;
