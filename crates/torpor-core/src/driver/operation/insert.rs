use super::Operation;
use crate::{schema::ModelId, Row};

/// Inserts one row into a model's table.
#[derive(Debug, Clone)]
pub struct Insert {
    /// The model whose table receives the row.
    pub model: ModelId,

    /// Column values in model column order. The key column may be `null`
    /// when the store allocates it.
    pub row: Row,
}

impl From<Insert> for Operation {
    fn from(value: Insert) -> Operation {
        Operation::Insert(value)
    }
}
