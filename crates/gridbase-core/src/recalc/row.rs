use crate::model::SystemColumn;
use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

///
/// RowState
///
/// `column -> value` view of one row. Built per mutation and never
/// persisted as its own entity.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RowState(BTreeMap<String, Value>);

impl RowState {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// `current ∪ pending`; pending values win on conflict.
    #[must_use]
    pub fn merged(current: &Self, pending: &Self) -> Self {
        let mut merged = current.clone();
        merged.extend(pending.iter().map(|(column, value)| (column.clone(), value.clone())));

        merged
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(column.into(), value.into());
    }

    /// Record id held in the `__id` system column, when present.
    #[must_use]
    pub fn record_id(&self) -> Option<&str> {
        self.0.get(SystemColumn::Id.name()).and_then(Value::as_str)
    }
}

impl From<BTreeMap<String, Value>> for RowState {
    fn from(values: BTreeMap<String, Value>) -> Self {
        Self(values)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for RowState {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(column, value)| (column.into(), value))
                .collect(),
        )
    }
}
