use super::Operation;
use crate::{
    schema::{ColumnId, ModelId},
    Value,
};

/// Fetches every row whose column equals a value.
///
/// Used to resolve associations whose foreign key lives on the target side.
#[derive(Debug, Clone)]
pub struct QueryByColumn {
    /// The model whose table is queried.
    pub model: ModelId,

    /// The column to filter on.
    pub column: ColumnId,

    /// The value rows must match.
    pub value: Value,
}

impl From<QueryByColumn> for Operation {
    fn from(value: QueryByColumn) -> Operation {
        Operation::QueryByColumn(value)
    }
}
