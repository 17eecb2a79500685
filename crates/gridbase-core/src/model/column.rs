///
/// SystemColumn
///
/// Columns every table row carries next to its user-field columns.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum SystemColumn {
    Id,
    Status,
    CreatedTime,
    LastModifiedTime,
    CreatedBy,
    LastUpdatedBy,
    Version,
    AutoNumber,
}

impl SystemColumn {
    pub const ALL: [Self; 8] = [
        Self::Id,
        Self::Status,
        Self::CreatedTime,
        Self::LastModifiedTime,
        Self::CreatedBy,
        Self::LastUpdatedBy,
        Self::Version,
        Self::AutoNumber,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "__id",
            Self::Status => "__status",
            Self::CreatedTime => "__created_time",
            Self::LastModifiedTime => "__last_modified_time",
            Self::CreatedBy => "__created_by",
            Self::LastUpdatedBy => "__last_updated_by",
            Self::Version => "__version",
            Self::AutoNumber => "__auto_number",
        }
    }

    /// Resolve a physical column name back to its system column.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|col| col.name() == name)
    }
}

/// Prefix of the per-view order column.
pub const ORDER_COLUMN_PREFIX: &str = "_row_view";

/// Physical name of the column holding a view's order keys.
#[must_use]
pub fn order_column_name(view_id: &str) -> String {
    format!("{ORDER_COLUMN_PREFIX}{view_id}")
}
