use super::Operation;
use crate::{schema::ModelId, Value};

/// Deletes one row by primary key.
#[derive(Debug, Clone)]
pub struct DeleteByKey {
    /// The model whose table is deleted from.
    pub model: ModelId,

    /// Primary key of the row to delete.
    pub key: Value,
}

impl From<DeleteByKey> for Operation {
    fn from(value: DeleteByKey) -> Operation {
        Operation::DeleteByKey(value)
    }
}
