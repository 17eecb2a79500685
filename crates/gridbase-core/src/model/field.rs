use crate::model::storage::{ADDRESS_KEYS, PHONE_KEYS, ScalarKind, StorageCategory};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, btree_map};

///
/// FieldType
///
/// User-facing column type. Adding a variant forces every storage dispatch
/// site to be revisited through [`Field::storage_category`].
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    Address,
    AutoNumber,
    Checkbox,
    CreatedTime,
    Date,
    Dropdown,
    Email,
    Formula,
    LastModifiedTime,
    LongText,
    MultipleSelect,
    Number,
    Phone,
    Rating,
    SingleLineText,
    SingleSelect,
    Tags,
    Url,
}

///
/// DateGranularity
///
/// Precision at which a timestamp column is compared for equality.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateGranularity {
    #[default]
    Day,
    Minute,
    Second,
}

///
/// CellValueType
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CellValueType {
    Text,
    Number,
    Boolean,
    DateTime,
}

///
/// FormulaResult
///
/// Declared output shape of a formula column.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaResult {
    pub value_type: CellValueType,
    #[serde(default)]
    pub is_multiple: bool,
}

///
/// FieldOptions
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOptions {
    #[serde(default)]
    pub granularity: DateGranularity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<FormulaResult>,
}

///
/// ComputedSpec
///
/// Expression metadata for a computed column. `has_error` is set by the
/// field-definition subsystem when the expression failed to parse or
/// references something that no longer exists.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedSpec {
    pub expression: String,

    #[serde(default)]
    pub upstream_columns: Vec<String>,

    #[serde(default)]
    pub has_error: bool,
}

impl ComputedSpec {
    #[must_use]
    pub fn new<I, S>(expression: impl Into<String>, upstream_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expression: expression.into(),
            upstream_columns: upstream_columns.into_iter().map(Into::into).collect(),
            has_error: false,
        }
    }

    #[must_use]
    pub const fn with_error(mut self) -> Self {
        self.has_error = true;
        self
    }
}

///
/// Field
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    pub db_column_name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub options: FieldOptions,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed: Option<ComputedSpec>,
}

impl Field {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        db_column_name: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self {
            id: id.into(),
            db_column_name: db_column_name.into(),
            field_type,
            options: FieldOptions::default(),
            computed: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_computed(mut self, computed: ComputedSpec) -> Self {
        self.computed = Some(computed);
        self
    }

    #[must_use]
    pub const fn is_computed(&self) -> bool {
        self.computed.is_some()
    }

    /// Derive the physical storage shape of this field's column.
    #[must_use]
    pub const fn storage_category(&self) -> StorageCategory {
        match self.field_type {
            FieldType::SingleLineText
            | FieldType::LongText
            | FieldType::Email
            | FieldType::Url
            | FieldType::SingleSelect => StorageCategory::Scalar(ScalarKind::Text),
            FieldType::Number | FieldType::Rating | FieldType::AutoNumber => {
                StorageCategory::Scalar(ScalarKind::Number)
            }
            FieldType::Checkbox => StorageCategory::Scalar(ScalarKind::Bool),
            FieldType::Date | FieldType::CreatedTime | FieldType::LastModifiedTime => {
                StorageCategory::Scalar(ScalarKind::Timestamp)
            }
            FieldType::MultipleSelect | FieldType::Tags => StorageCategory::JsonArrayOfScalars,
            FieldType::Dropdown => StorageCategory::JsonArrayOfObjects,
            FieldType::Address => StorageCategory::JsonObject(ADDRESS_KEYS),
            FieldType::Phone => StorageCategory::JsonObject(PHONE_KEYS),
            FieldType::Formula => formula_category(self.options.result),
        }
    }
}

// Formula columns are stored in the shape of their declared result.
const fn formula_category(result: Option<FormulaResult>) -> StorageCategory {
    match result {
        None => StorageCategory::Scalar(ScalarKind::Text),
        Some(FormulaResult {
            is_multiple: true, ..
        }) => StorageCategory::JsonArrayOfScalars,
        Some(FormulaResult { value_type, .. }) => match value_type {
            CellValueType::Text => StorageCategory::Scalar(ScalarKind::Text),
            CellValueType::Number => StorageCategory::Scalar(ScalarKind::Number),
            CellValueType::Boolean => StorageCategory::Scalar(ScalarKind::Bool),
            CellValueType::DateTime => StorageCategory::Scalar(ScalarKind::Timestamp),
        },
    }
}

///
/// FieldMap
///
/// Read-only `id -> Field` snapshot with a secondary column-name index.
///

#[derive(Clone, Debug, Default)]
pub struct FieldMap {
    fields: BTreeMap<String, Field>,
    columns: BTreeMap<String, String>,
}

impl FieldMap {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
            columns: BTreeMap::new(),
        }
    }

    /// Insert a field, replacing any previous definition with the same id.
    pub fn insert(&mut self, field: Field) {
        if let Some(previous) = self.fields.get(&field.id) {
            self.columns.remove(&previous.db_column_name);
        }
        self.columns
            .insert(field.db_column_name.clone(), field.id.clone());
        self.fields.insert(field.id.clone(), field);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Field> {
        self.fields.get(id)
    }

    /// Look a field up by its physical column name.
    #[must_use]
    pub fn by_column(&self, column: &str) -> Option<&Field> {
        self.columns.get(column).and_then(|id| self.fields.get(id))
    }

    /// Computed spec of the field stored in `column`, if it is computed.
    #[must_use]
    pub fn computed_by_column(&self, column: &str) -> Option<&ComputedSpec> {
        self.by_column(column).and_then(|field| field.computed.as_ref())
    }

    pub fn computed_fields(&self) -> impl Iterator<Item = (&Field, &ComputedSpec)> {
        self.fields
            .values()
            .filter_map(|field| field.computed.as_ref().map(|spec| (field, spec)))
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, Field> {
        self.fields.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<Field> for FieldMap {
    fn from_iter<T: IntoIterator<Item = Field>>(iter: T) -> Self {
        let mut map = Self::new();
        for field in iter {
            map.insert(field);
        }
        map
    }
}
