use torpor_core::{
    driver::{operation, Driver},
    schema::{ColumnId, ModelId, Schema},
    Error, Result, Row, Value,
};

use std::sync::Arc;

/// Reads rows for entities about to enter the persistence context.
#[derive(Debug, Clone)]
pub struct Loader {
    schema: Arc<Schema>,
    driver: Arc<dyn Driver>,
}

impl Loader {
    pub(crate) fn new(schema: Arc<Schema>, driver: Arc<dyn Driver>) -> Loader {
        Loader { schema, driver }
    }

    /// Loads the row under `key`, failing if no such row exists.
    pub async fn load(&self, model: ModelId, key: Value) -> Result<Row> {
        let op = operation::GetByKey {
            model,
            key: key.clone(),
        };
        let response = self.driver.exec(&self.schema, op.into()).await?;

        match response.rows.into_values().into_iter().next() {
            Some(row) => Ok(row),
            None => Err(Error::record_not_found(format!(
                "table={} key={:?}",
                self.schema.model(model).table,
                key
            ))),
        }
    }

    /// Loads every row whose `column` equals `value`. An empty result is not
    /// an error.
    pub async fn load_by_column(
        &self,
        model: ModelId,
        column: ColumnId,
        value: Value,
    ) -> Result<Vec<Row>> {
        let op = operation::QueryByColumn {
            model,
            column,
            value,
        };
        let response = self.driver.exec(&self.schema, op.into()).await?;
        Ok(response.rows.into_values())
    }
}
