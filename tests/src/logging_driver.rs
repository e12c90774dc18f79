use crate::exec_log::ExecLog;

use torpor_core::{
    async_trait,
    driver::{Operation, Response},
    schema::Schema,
    Driver, Result,
};

use std::sync::{Arc, Mutex};

/// A driver wrapper that records every operation it executes, for asserting
/// exact driver traffic in tests.
#[derive(Debug)]
pub struct LoggingDriver {
    inner: Box<dyn Driver>,
    ops: Arc<Mutex<Vec<DriverOp>>>,
}

#[derive(Debug)]
pub struct DriverOp {
    pub operation: Operation,
    pub response: Response,
}

impl LoggingDriver {
    pub fn new(inner: Box<dyn Driver>) -> LoggingDriver {
        LoggingDriver {
            inner,
            ops: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A handle to the log. Stays valid after the driver moves into the
    /// database.
    pub fn log(&self) -> ExecLog {
        ExecLog::new(self.ops.clone())
    }
}

#[async_trait]
impl Driver for LoggingDriver {
    async fn register_schema(&mut self, schema: &Schema) -> Result<()> {
        self.inner.register_schema(schema).await
    }

    async fn exec(&self, schema: &Arc<Schema>, op: Operation) -> Result<Response> {
        let operation = op.clone();

        // Failed operations are not logged; the log records what the store
        // actually executed.
        let response = self.inner.exec(schema, op).await?;

        self.ops
            .lock()
            .expect("failed to acquire ops log lock")
            .push(DriverOp {
                operation,
                response: response.clone(),
            });

        Ok(response)
    }
}
