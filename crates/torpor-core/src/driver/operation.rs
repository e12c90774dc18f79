mod delete_by_key;
pub use delete_by_key::DeleteByKey;

mod get_by_key;
pub use get_by_key::GetByKey;

mod insert;
pub use insert::Insert;

mod query_by_column;
pub use query_by_column::QueryByColumn;

mod update_by_key;
pub use update_by_key::UpdateByKey;

/// A single storage operation.
///
/// Operations address whole rows by primary key or by one column value. The
/// runtime never sends anything richer than this; query planning is out of
/// scope.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Insert one row.
    Insert(Insert),

    /// Fetch one row by primary key.
    GetByKey(GetByKey),

    /// Fetch every row whose column equals a value.
    QueryByColumn(QueryByColumn),

    /// Replace one row, addressed by primary key.
    UpdateByKey(UpdateByKey),

    /// Delete one row by primary key.
    DeleteByKey(DeleteByKey),
}
