use crate::action::{ActionQueue, DeleteAction, InsertAction, PendingFk, UpdateAction};
use crate::entity::Slot;

use torpor_core::schema::ModelId;
use torpor_core::Result;

use std::fmt::Debug;

/// A lifecycle request observed on a managed entity, before any write has
/// been decided.
#[derive(Debug, Clone, Copy)]
pub struct EntityEvent {
    pub kind: EventKind,
    pub model: ModelId,
    pub slot: Slot,
    /// Carried through to the insert action for cascaded persists.
    pub pending_fk: Option<PendingFk>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Persist,
    Merge,
    Remove,
}

/// Translates a lifecycle event into deferred actions.
///
/// Listeners run synchronously at staging time and must not touch the
/// store; the store is only reached when the queue flushes.
pub trait EntityListener: Debug + Send + Sync + 'static {
    fn on_event(&self, event: &EntityEvent, queue: &mut ActionQueue) -> Result<()>;
}

/// One translating listener per event kind.
#[derive(Debug)]
pub(crate) struct Listeners {
    persist: Box<dyn EntityListener>,
    merge: Box<dyn EntityListener>,
    remove: Box<dyn EntityListener>,
}

impl Default for Listeners {
    fn default() -> Listeners {
        Listeners {
            persist: Box::new(PersistListener),
            merge: Box::new(MergeListener),
            remove: Box::new(RemoveListener),
        }
    }
}

impl Listeners {
    pub(crate) fn dispatch(&self, event: &EntityEvent, queue: &mut ActionQueue) -> Result<()> {
        match event.kind {
            EventKind::Persist => self.persist.on_event(event, queue),
            EventKind::Merge => self.merge.on_event(event, queue),
            EventKind::Remove => self.remove.on_event(event, queue),
        }
    }
}

/// Queues an insert for a persist request.
#[derive(Debug)]
pub struct PersistListener;

impl EntityListener for PersistListener {
    fn on_event(&self, event: &EntityEvent, queue: &mut ActionQueue) -> Result<()> {
        queue.push(InsertAction {
            model: event.model,
            slot: event.slot,
            pending_fk: event.pending_fk,
        });
        Ok(())
    }
}

/// Queues an update for a merge request. Whether the row is actually dirty
/// is re-checked at flush time.
#[derive(Debug)]
pub struct MergeListener;

impl EntityListener for MergeListener {
    fn on_event(&self, event: &EntityEvent, queue: &mut ActionQueue) -> Result<()> {
        queue.push(UpdateAction {
            model: event.model,
            slot: event.slot,
        });
        Ok(())
    }
}

/// Queues a delete for a remove request.
#[derive(Debug)]
pub struct RemoveListener;

impl EntityListener for RemoveListener {
    fn on_event(&self, event: &EntityEvent, queue: &mut ActionQueue) -> Result<()> {
        queue.push(DeleteAction {
            model: event.model,
            slot: event.slot,
        });
        Ok(())
    }
}
