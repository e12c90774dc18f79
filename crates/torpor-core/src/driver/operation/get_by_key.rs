use super::Operation;
use crate::{schema::ModelId, Value};

/// Fetches one row by primary key.
#[derive(Debug, Clone)]
pub struct GetByKey {
    /// The model whose table is queried.
    pub model: ModelId,

    /// Primary key of the row to fetch.
    pub key: Value,
}

impl From<GetByKey> for Operation {
    fn from(value: GetByKey) -> Operation {
        Operation::GetByKey(value)
    }
}
