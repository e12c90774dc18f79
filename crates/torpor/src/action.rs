use crate::entity::Slot;

use torpor_core::schema::{ColumnId, ModelId};

/// A deferred write recorded by an event listener and executed by
/// [`Session::flush`](crate::Session::flush).
#[derive(Debug, Clone, Copy)]
pub enum Action {
    Insert(InsertAction),
    Update(UpdateAction),
    Delete(DeleteAction),
}

#[derive(Debug, Clone, Copy)]
pub struct InsertAction {
    pub model: ModelId,
    pub slot: Slot,
    /// Set for cascaded inserts whose foreign key points at a parent staged
    /// in the same queue. The parent's key does not exist until its own
    /// insert executes, so the column is filled in at flush time.
    pub pending_fk: Option<PendingFk>,
}

/// A foreign-key assignment resolved at flush time from the parent's
/// stored key.
#[derive(Debug, Clone, Copy)]
pub struct PendingFk {
    pub column: ColumnId,
    pub parent: Slot,
}

#[derive(Debug, Clone, Copy)]
pub struct UpdateAction {
    pub model: ModelId,
    pub slot: Slot,
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteAction {
    pub model: ModelId,
    pub slot: Slot,
}

/// Buffered writes, bucketed by kind.
///
/// Flush drains inserts first, then updates, then deletes, so a delete of a
/// still-referenced row never lands before the dependent inserts and a
/// child never lands before its parent. Within a bucket, actions keep their
/// enqueue order.
#[derive(Debug, Default)]
pub struct ActionQueue {
    pub(crate) inserts: Vec<InsertAction>,
    pub(crate) updates: Vec<UpdateAction>,
    pub(crate) deletes: Vec<DeleteAction>,
}

impl ActionQueue {
    pub fn push(&mut self, action: impl Into<Action>) {
        match action.into() {
            Action::Insert(insert) => self.inserts.push(insert),
            Action::Update(update) => self.updates.push(update),
            Action::Delete(delete) => self.deletes.push(delete),
        }
    }

    pub fn len(&self) -> usize {
        self.inserts.len() + self.updates.len() + self.deletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<InsertAction> for Action {
    fn from(value: InsertAction) -> Action {
        Action::Insert(value)
    }
}

impl From<UpdateAction> for Action {
    fn from(value: UpdateAction) -> Action {
        Action::Update(value)
    }
}

impl From<DeleteAction> for Action {
    fn from(value: DeleteAction) -> Action {
        Action::Delete(value)
    }
}
