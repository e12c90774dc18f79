use torpor_core::{
    bail,
    driver::{operation, Driver, Rows},
    schema::{ModelId, Schema},
    Error, Result, Row, Value,
};

use std::sync::Arc;

/// Executes row writes for managed entities.
///
/// One persister serves every model; operations carry the model identifier
/// and the schema supplies the mapping.
#[derive(Debug, Clone)]
pub struct Persister {
    schema: Arc<Schema>,
    driver: Arc<dyn Driver>,
}

impl Persister {
    pub(crate) fn new(schema: Arc<Schema>, driver: Arc<dyn Driver>) -> Persister {
        Persister { schema, driver }
    }

    /// Inserts a row and returns the stored key, which the driver may have
    /// allocated.
    pub async fn insert(&self, model: ModelId, row: Row) -> Result<Value> {
        let op = operation::Insert { model, row };
        let response = self.driver.exec(&self.schema, op.into()).await?;

        let Rows::Values(rows) = response.rows else {
            bail!("driver returned a count for an insert");
        };
        let Some(stored) = rows.into_iter().next() else {
            bail!("driver returned no row for an insert");
        };

        let pk = self.schema.model(model).primary_key;
        Ok(stored[pk.0].clone())
    }

    /// Replaces the row under `key`. Returns `false` if no row was there.
    pub async fn update(&self, model: ModelId, key: Value, row: Row) -> Result<bool> {
        let op = operation::UpdateByKey { model, key, row };
        let response = self.driver.exec(&self.schema, op.into()).await?;
        Ok(response.rows.into_count() > 0)
    }

    /// Deletes the row under `key`, failing if no such row exists.
    pub async fn delete(&self, model: ModelId, key: Value) -> Result<()> {
        let op = operation::DeleteByKey {
            model,
            key: key.clone(),
        };
        let response = self.driver.exec(&self.schema, op.into()).await?;

        if response.rows.into_count() == 0 {
            return Err(Error::record_not_found(format!(
                "table={} key={:?}",
                self.schema.model(model).table,
                key
            )));
        }
        Ok(())
    }
}
