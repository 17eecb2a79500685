use crate::filter::Operator;
use std::fmt;

/// Sub-keys of an address cell.
pub const ADDRESS_KEYS: &[&str] = &["street", "city", "state", "zip", "country"];

/// Sub-keys of a phone cell.
pub const PHONE_KEYS: &[&str] = &["countryCode", "number"];

///
/// ScalarKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ScalarKind {
    Text,
    Number,
    Bool,
    Timestamp,
}

impl ScalarKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::Timestamp => "timestamptz",
        }
    }
}

///
/// StorageCategory
///
/// Physical shape of a field's column. Every predicate strategy dispatches
/// on this, never on the user-facing field type.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StorageCategory {
    Scalar(ScalarKind),

    /// JSON object with a fixed set of allowed keys.
    JsonObject(&'static [&'static str]),

    /// JSON array of plain scalars (multi-select, tags).
    JsonArrayOfScalars,

    /// JSON array of `{ id, label }` objects.
    JsonArrayOfObjects,
}

impl StorageCategory {
    /// Allowed sub-keys for object storage; empty for every other shape.
    #[must_use]
    pub const fn object_keys(&self) -> &'static [&'static str] {
        match self {
            Self::JsonObject(keys) => keys,
            Self::Scalar(_) | Self::JsonArrayOfScalars | Self::JsonArrayOfObjects => &[],
        }
    }

    /// Whether a leaf on this shape may use `operator`, independent of the
    /// leaf's value.
    #[must_use]
    pub const fn supports(&self, operator: Operator) -> bool {
        use Operator as Op;

        if operator.is_empty_check() {
            return true;
        }

        match self {
            Self::Scalar(ScalarKind::Text) | Self::JsonObject(_) => matches!(
                operator,
                Op::Is
                    | Op::IsNot
                    | Op::Contains
                    | Op::DoesNotContain
                    | Op::IsAnyOf
                    | Op::IsNoneOf
            ),
            Self::Scalar(ScalarKind::Number) => matches!(
                operator,
                Op::Is
                    | Op::IsNot
                    | Op::IsGreater
                    | Op::IsGreaterEqual
                    | Op::IsLess
                    | Op::IsLessEqual
            ),
            Self::Scalar(ScalarKind::Bool) => matches!(operator, Op::Is),
            Self::Scalar(ScalarKind::Timestamp) => matches!(
                operator,
                Op::Is
                    | Op::IsNot
                    | Op::IsBefore
                    | Op::IsAfter
                    | Op::IsOnOrBefore
                    | Op::IsOnOrAfter
                    | Op::IsGreater
                    | Op::IsGreaterEqual
                    | Op::IsLess
                    | Op::IsLessEqual
                    | Op::IsWithin
            ),
            Self::JsonArrayOfScalars | Self::JsonArrayOfObjects => matches!(
                operator,
                Op::Is
                    | Op::IsNot
                    | Op::IsAnyOf
                    | Op::IsNoneOf
                    | Op::HasAnyOf
                    | Op::HasAllOf
                    | Op::HasNoneOf
                    | Op::IsExactly
            ),
        }
    }
}

impl fmt::Display for StorageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "scalar {}", kind.label()),
            Self::JsonObject(_) => write!(f, "json object"),
            Self::JsonArrayOfScalars => write!(f, "json array of scalars"),
            Self::JsonArrayOfObjects => write!(f, "json array of objects"),
        }
    }
}
