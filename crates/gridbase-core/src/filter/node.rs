use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{collections::BTreeSet, fmt};

///
/// Conjunction
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }

    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::And => 0x01,
            Self::Or => 0x02,
        }
    }
}

///
/// Operator
///
/// Closed operator catalogue. Which operators a leaf may use is decided by
/// the referenced field's storage category at compile time.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum Operator {
    Is = 0x01,
    IsNot = 0x02,
    Contains = 0x03,
    DoesNotContain = 0x04,
    IsEmpty = 0x05,
    IsNotEmpty = 0x06,
    IsAnyOf = 0x07,
    IsNoneOf = 0x08,
    IsGreater = 0x09,
    IsGreaterEqual = 0x0a,
    IsLess = 0x0b,
    IsLessEqual = 0x0c,
    IsBefore = 0x0d,
    IsAfter = 0x0e,
    IsOnOrBefore = 0x0f,
    IsOnOrAfter = 0x10,
    IsWithin = 0x11,
    HasAnyOf = 0x12,
    HasAllOf = 0x13,
    HasNoneOf = 0x14,
    IsExactly = 0x15,
}

impl Operator {
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Emptiness checks are the only operators that need no value.
    #[must_use]
    pub const fn is_empty_check(self) -> bool {
        matches!(self, Self::IsEmpty | Self::IsNotEmpty)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Is => "is",
            Self::IsNot => "isNot",
            Self::Contains => "contains",
            Self::DoesNotContain => "doesNotContain",
            Self::IsEmpty => "isEmpty",
            Self::IsNotEmpty => "isNotEmpty",
            Self::IsAnyOf => "isAnyOf",
            Self::IsNoneOf => "isNoneOf",
            Self::IsGreater => "isGreater",
            Self::IsGreaterEqual => "isGreaterEqual",
            Self::IsLess => "isLess",
            Self::IsLessEqual => "isLessEqual",
            Self::IsBefore => "isBefore",
            Self::IsAfter => "isAfter",
            Self::IsOnOrBefore => "isOnOrBefore",
            Self::IsOnOrAfter => "isOnOrAfter",
            Self::IsWithin => "isWithin",
            Self::HasAnyOf => "hasAnyOf",
            Self::HasAllOf => "hasAllOf",
            Self::HasNoneOf => "hasNoneOf",
            Self::IsExactly => "isExactly",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// FilterValue
///
/// Right-hand side of a leaf. A `FieldRef` compares against another column
/// of the same row, never a joined one.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterValue {
    Literal(Value),
    FieldRef(String),
    #[default]
    Null,
}

impl FilterValue {
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    #[must_use]
    pub fn field_ref(field_id: impl Into<String>) -> Self {
        Self::FieldRef(field_id.into())
    }

    /// A JSON `null` literal counts as no value at all.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null | Self::Literal(Value::Null))
    }
}

///
/// FilterLeaf
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterLeaf {
    pub field_id: String,
    pub operator: Operator,

    #[serde(default, deserialize_with = "nullable_value")]
    pub value: FilterValue,

    /// Targets one key of an object-shaped column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_key: Option<String>,
}

impl FilterLeaf {
    #[must_use]
    pub fn new(field_id: impl Into<String>, operator: Operator, value: FilterValue) -> Self {
        Self {
            field_id: field_id.into(),
            operator,
            value,
            sub_key: None,
        }
    }

    #[must_use]
    pub fn with_sub_key(mut self, key: impl Into<String>) -> Self {
        self.sub_key = Some(key.into());
        self
    }
}

// Accept an explicit JSON `null` for the value slot.
fn nullable_value<'de, D>(deserializer: D) -> Result<FilterValue, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<FilterValue>::deserialize(deserializer)?.unwrap_or_default())
}

///
/// FilterNode
///
/// Arbitrarily nested boolean filter tree as it arrives from a request.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterNode {
    Group {
        conjunction: Conjunction,
        children: Vec<Self>,
    },
    Leaf(FilterLeaf),
}

impl FilterNode {
    #[must_use]
    pub const fn and(children: Vec<Self>) -> Self {
        Self::Group {
            conjunction: Conjunction::And,
            children,
        }
    }

    #[must_use]
    pub const fn or(children: Vec<Self>) -> Self {
        Self::Group {
            conjunction: Conjunction::Or,
            children,
        }
    }

    /// The empty group; compiles to "no restriction".
    #[must_use]
    pub const fn all() -> Self {
        Self::and(Vec::new())
    }

    #[must_use]
    pub fn leaf(field_id: impl Into<String>, operator: Operator, value: FilterValue) -> Self {
        Self::Leaf(FilterLeaf::new(field_id, operator, value))
    }

    /// Nesting depth; a bare leaf has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Group { children, .. } => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
        }
    }

    /// Number of leaves in the tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Group { children, .. } => children.iter().map(Self::leaf_count).sum(),
        }
    }

    /// Every field id the tree reads, including field-reference targets.
    #[must_use]
    pub fn referenced_field_ids(&self) -> BTreeSet<String> {
        let mut ids = BTreeSet::new();
        self.collect_field_ids(&mut ids);
        ids
    }

    fn collect_field_ids(&self, ids: &mut BTreeSet<String>) {
        match self {
            Self::Leaf(leaf) => {
                ids.insert(leaf.field_id.clone());
                if let FilterValue::FieldRef(target) = &leaf.value {
                    ids.insert(target.clone());
                }
            }
            Self::Group { children, .. } => {
                for child in children {
                    child.collect_field_ids(ids);
                }
            }
        }
    }
}

impl From<FilterLeaf> for FilterNode {
    fn from(leaf: FilterLeaf) -> Self {
        Self::Leaf(leaf)
    }
}
