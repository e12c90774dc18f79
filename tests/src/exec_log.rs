use crate::logging_driver::DriverOp;

use torpor_core::driver::Operation;

use std::sync::{Arc, Mutex};

/// Assertion-friendly view of the operations a `LoggingDriver` recorded.
///
/// The log shares the driver's buffer, so it stays live after the driver
/// moves into the database and reflects every operation executed since the
/// last `clear`.
pub struct ExecLog {
    ops: Arc<Mutex<Vec<DriverOp>>>,
}

impl ExecLog {
    pub(crate) fn new(ops: Arc<Mutex<Vec<DriverOp>>>) -> ExecLog {
        ExecLog { ops }
    }

    /// Number of recorded operations.
    pub fn len(&self) -> usize {
        self.ops.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.lock().unwrap().is_empty()
    }

    /// Counts recorded operations matching `predicate`.
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Operation) -> bool,
    {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .filter(|op| predicate(&op.operation))
            .count()
    }

    pub fn has_insert(&self) -> bool {
        self.count(|op| matches!(op, Operation::Insert(_))) > 0
    }

    pub fn has_get_by_key(&self) -> bool {
        self.count(|op| matches!(op, Operation::GetByKey(_))) > 0
    }

    pub fn has_query_by_column(&self) -> bool {
        self.count(|op| matches!(op, Operation::QueryByColumn(_))) > 0
    }

    pub fn has_update_by_key(&self) -> bool {
        self.count(|op| matches!(op, Operation::UpdateByKey(_))) > 0
    }

    pub fn has_delete_by_key(&self) -> bool {
        self.count(|op| matches!(op, Operation::DeleteByKey(_))) > 0
    }

    /// Forgets everything recorded so far. Scenarios call this after
    /// seeding so assertions see only the operations under test.
    pub fn clear(&mut self) {
        self.ops.lock().unwrap().clear();
    }

    /// Runs `f` over the recorded operations, for assertions that need to
    /// inspect operation payloads or ordering.
    pub fn with_ops<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[DriverOp]) -> R,
    {
        let ops = self.ops.lock().unwrap();
        f(&ops)
    }
}
