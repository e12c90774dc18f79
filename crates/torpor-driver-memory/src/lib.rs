use torpor_core::{
    async_trait, bail,
    driver::{operation, Driver, Operation, Response},
    schema::{ModelId, Schema},
    Error, Result, Row, Value,
};

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, MutexGuard},
};

/// An in-memory driver that stores rows in per-model ordered maps.
///
/// Enforces primary key uniqueness, column types, and nullability. It does
/// not enforce referential integrity; dangling foreign keys read back as
/// empty associations.
#[derive(Debug, Default)]
pub struct Memory {
    tables: Mutex<HashMap<ModelId, Table>>,
}

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<Value, Row>,
    next_key: i64,
}

impl Memory {
    pub fn new() -> Memory {
        Memory::default()
    }

    fn tables(&self) -> MutexGuard<'_, HashMap<ModelId, Table>> {
        self.tables.lock().expect("memory driver state poisoned")
    }

    fn insert(&self, schema: &Schema, op: operation::Insert) -> Result<Response> {
        let model = schema.model(op.model);
        let mut row = op.row;

        assert_eq!(
            row.len(),
            model.columns.len(),
            "row width does not match model `{}`",
            model.name
        );

        let mut tables = self.tables();
        let Some(table) = tables.get_mut(&op.model) else {
            bail!("table for model `{}` is not registered", model.name);
        };

        let pk = model.primary_key.0;

        if model.primary_key_column().auto {
            if row[pk].is_null() {
                table.next_key += 1;
                row[pk] = Value::I64(table.next_key);
            } else if let Some(key) = row[pk].as_i64() {
                // Keep the allocator ahead of explicitly provided keys.
                table.next_key = table.next_key.max(key);
            }
        }

        for column in &model.columns {
            if !column.accepts(&row[column.id.0]) {
                return Err(Error::constraint_violation(format!(
                    "column `{}.{}` does not accept {:?}",
                    model.table,
                    column.name,
                    row[column.id.0]
                )));
            }
        }

        let key = row[pk].clone();

        if table.rows.contains_key(&key) {
            return Err(Error::constraint_violation(format!(
                "duplicate primary key {:?} for table `{}`",
                key, model.table
            )));
        }

        tracing::trace!(table = %model.table, key = ?key, "insert");
        table.rows.insert(key, row.clone());
        Ok(Response::values(vec![row]))
    }

    fn get_by_key(&self, schema: &Schema, op: operation::GetByKey) -> Result<Response> {
        let model = schema.model(op.model);
        let tables = self.tables();
        let Some(table) = tables.get(&op.model) else {
            bail!("table for model `{}` is not registered", model.name);
        };

        let rows: Vec<_> = table.rows.get(&op.key).cloned().into_iter().collect();
        tracing::trace!(table = %model.table, key = ?op.key, found = !rows.is_empty(), "get_by_key");
        Ok(Response::values(rows))
    }

    fn query_by_column(&self, schema: &Schema, op: operation::QueryByColumn) -> Result<Response> {
        let model = schema.model(op.model);
        let tables = self.tables();
        let Some(table) = tables.get(&op.model) else {
            bail!("table for model `{}` is not registered", model.name);
        };

        let rows: Vec<_> = table
            .rows
            .values()
            .filter(|row| row[op.column.0] == op.value)
            .cloned()
            .collect();
        tracing::trace!(
            table = %model.table,
            column = %model.column(op.column).name,
            matched = rows.len(),
            "query_by_column"
        );
        Ok(Response::values(rows))
    }

    fn update_by_key(&self, schema: &Schema, op: operation::UpdateByKey) -> Result<Response> {
        let model = schema.model(op.model);

        assert_eq!(
            op.row.len(),
            model.columns.len(),
            "row width does not match model `{}`",
            model.name
        );

        if op.row[model.primary_key.0] != op.key {
            return Err(Error::constraint_violation(format!(
                "key column does not match addressed row in table `{}`",
                model.table
            )));
        }

        for column in &model.columns {
            if !column.accepts(&op.row[column.id.0]) {
                return Err(Error::constraint_violation(format!(
                    "column `{}.{}` does not accept {:?}",
                    model.table,
                    column.name,
                    op.row[column.id.0]
                )));
            }
        }

        let mut tables = self.tables();
        let Some(table) = tables.get_mut(&op.model) else {
            bail!("table for model `{}` is not registered", model.name);
        };

        let count = match table.rows.get_mut(&op.key) {
            Some(existing) => {
                *existing = op.row;
                1
            }
            None => 0,
        };

        tracing::trace!(table = %model.table, key = ?op.key, count, "update_by_key");
        Ok(Response::count(count))
    }

    fn delete_by_key(&self, schema: &Schema, op: operation::DeleteByKey) -> Result<Response> {
        let model = schema.model(op.model);
        let mut tables = self.tables();
        let Some(table) = tables.get_mut(&op.model) else {
            bail!("table for model `{}` is not registered", model.name);
        };

        let count = table.rows.remove(&op.key).is_some() as u64;
        tracing::trace!(table = %model.table, key = ?op.key, count, "delete_by_key");
        Ok(Response::count(count))
    }
}

#[async_trait]
impl Driver for Memory {
    async fn register_schema(&mut self, schema: &Schema) -> Result<()> {
        let mut tables = self.tables();
        for model in &schema.models {
            tables.entry(model.id).or_default();
        }
        Ok(())
    }

    async fn exec(&self, schema: &Arc<Schema>, op: Operation) -> Result<Response> {
        match op {
            Operation::Insert(op) => self.insert(schema, op),
            Operation::GetByKey(op) => self.get_by_key(schema, op),
            Operation::QueryByColumn(op) => self.query_by_column(schema, op),
            Operation::UpdateByKey(op) => self.update_by_key(schema, op),
            Operation::DeleteByKey(op) => self.delete_by_key(schema, op),
        }
    }
}
