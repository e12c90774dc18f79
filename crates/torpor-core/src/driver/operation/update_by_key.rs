use super::Operation;
use crate::{schema::ModelId, Row, Value};

/// Replaces the row stored under a key with new column values.
#[derive(Debug, Clone)]
pub struct UpdateByKey {
    /// The model whose table is updated.
    pub model: ModelId,

    /// Primary key of the row to replace.
    pub key: Value,

    /// The full replacement row, in model column order.
    pub row: Row,
}

impl From<UpdateByKey> for Operation {
    fn from(value: UpdateByKey) -> Operation {
        Operation::UpdateByKey(value)
    }
}
