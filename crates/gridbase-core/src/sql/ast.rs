use crate::filter::Conjunction;
use serde_json::Number;

///
/// SqlLiteral
///
/// Literal payloads. Text and JSON are stored raw; escaping happens only in
/// the renderer.
///

#[derive(Clone, Debug, PartialEq)]
pub enum SqlLiteral {
    Bool(bool),
    Number(Number),
    Text(String),

    /// Serialized JSON document, rendered as a `jsonb` literal.
    Json(String),

    /// RFC 3339 instant, rendered as a `timestamptz` literal.
    Timestamp(String),
}

///
/// BinaryOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,

    /// JSON containment (`@>`).
    Contains,
}

impl BinaryOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Contains => "@>",
        }
    }
}

///
/// SqlExpr
///
/// Predicate fragment AST. Every string that reaches SQL text passes
/// through `sql::render`, which owns quoting and escaping.
///

#[derive(Clone, Debug, PartialEq)]
pub enum SqlExpr {
    Literal(SqlLiteral),
    Column(String),

    /// `column ->> 'key'`
    JsonText {
        column: String,
        key: String,
    },

    Binary {
        op: BinaryOp,
        left: Box<Self>,
        right: Box<Self>,
    },

    Call {
        function: &'static str,
        args: Vec<Self>,
    },

    /// String concatenation (`a || b || c`).
    Concat(Vec<Self>),

    /// `ARRAY[...]`
    Array(Vec<Self>),

    Not(Box<Self>),

    IsNull {
        expr: Box<Self>,
        negated: bool,
    },

    /// Case-insensitive pattern match (`ILIKE`).
    Like {
        expr: Box<Self>,
        pattern: Box<Self>,
        negated: bool,
    },

    InList {
        expr: Box<Self>,
        list: Vec<Self>,
        negated: bool,
    },

    Junction {
        conjunction: Conjunction,
        children: Vec<Self>,
    },
}

impl SqlExpr {
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(name.into())
    }

    #[must_use]
    pub fn json_text(column: impl Into<String>, key: impl Into<String>) -> Self {
        Self::JsonText {
            column: column.into(),
            key: key.into(),
        }
    }

    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Literal(SqlLiteral::Text(value.into()))
    }

    #[must_use]
    pub fn number(value: impl Into<Number>) -> Self {
        Self::Literal(SqlLiteral::Number(value.into()))
    }

    #[must_use]
    pub fn json(document: impl Into<String>) -> Self {
        Self::Literal(SqlLiteral::Json(document.into()))
    }

    #[must_use]
    pub fn binary(op: BinaryOp, left: Self, right: Self) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn eq(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::Eq, left, right)
    }

    #[must_use]
    pub fn ne(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::Ne, left, right)
    }

    #[must_use]
    pub fn contains(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::Contains, left, right)
    }

    #[must_use]
    pub const fn call(function: &'static str, args: Vec<Self>) -> Self {
        Self::Call { function, args }
    }

    #[must_use]
    #[expect(clippy::should_implement_trait)]
    pub fn not(expr: Self) -> Self {
        Self::Not(Box::new(expr))
    }

    #[must_use]
    pub fn is_null(expr: Self) -> Self {
        Self::IsNull {
            expr: Box::new(expr),
            negated: false,
        }
    }

    #[must_use]
    pub fn is_not_null(expr: Self) -> Self {
        Self::IsNull {
            expr: Box::new(expr),
            negated: true,
        }
    }

    #[must_use]
    pub fn like(expr: Self, pattern: Self, negated: bool) -> Self {
        Self::Like {
            expr: Box::new(expr),
            pattern: Box::new(pattern),
            negated,
        }
    }

    #[must_use]
    pub fn in_list(expr: Self, list: Vec<Self>, negated: bool) -> Self {
        Self::InList {
            expr: Box::new(expr),
            list,
            negated,
        }
    }

    #[must_use]
    pub const fn and(children: Vec<Self>) -> Self {
        Self::Junction {
            conjunction: Conjunction::And,
            children,
        }
    }

    #[must_use]
    pub const fn or(children: Vec<Self>) -> Self {
        Self::Junction {
            conjunction: Conjunction::Or,
            children,
        }
    }

    /// Atomic expressions never need parentheses as operands.
    #[must_use]
    pub const fn is_atomic(&self) -> bool {
        matches!(
            self,
            Self::Literal(_)
                | Self::Column(_)
                | Self::JsonText { .. }
                | Self::Call { .. }
                | Self::Concat(_)
                | Self::Array(_)
        )
    }
}
