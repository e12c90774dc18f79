mod entry;
pub use entry::{EntityEntry, EntityState};

mod snapshot;
pub use snapshot::Snapshot;

use crate::{
    entity::{EntityKey, Slot},
    schema::registry::Instance,
};

use torpor_core::{Error, Result, Row, Value};

use indexmap::IndexMap;
use std::any::Any;
use std::fmt;

/// First-level cache and identity map for one session.
///
/// Entities live in an arena indexed by [`Slot`]. Slots are never reused;
/// evicting an entity tombstones its slot so stale handles fail instead of
/// aliasing a newer entity. The identity map points identities at live
/// slots and is what find consults before touching the store.
#[derive(Default)]
pub struct PersistenceContext {
    entities: Vec<Option<ManagedEntity>>,
    identity: IndexMap<EntityKey, Slot>,
}

struct ManagedEntity {
    key: EntityKey,
    instance: Instance,
    snapshot: Option<Snapshot>,
    entry: Option<EntityEntry>,
}

impl PersistenceContext {
    pub fn new() -> PersistenceContext {
        PersistenceContext::default()
    }

    /// Number of live (not yet evicted) entities.
    pub fn len(&self) -> usize {
        self.entities.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up the slot mapped for an identity.
    pub fn entity(&self, key: &EntityKey) -> Option<Slot> {
        self.identity.get(key).copied()
    }

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.identity.contains_key(key)
    }

    /// Registers an instance under its identity.
    ///
    /// Every registration is a distinct instance, so a second registration
    /// under a mapped identity is always a violation.
    pub(crate) fn add_entity(
        &mut self,
        key: EntityKey,
        instance: Instance,
        model_name: &str,
    ) -> Result<Slot> {
        if self.identity.contains_key(&key) {
            return Err(Error::duplicate_identity(model_name, key.key));
        }
        let slot = self.push(key.clone(), instance);
        self.identity.insert(key, slot);
        Ok(slot)
    }

    /// Registers an instance with no identity yet. Staged inserts receive
    /// their key, and join the identity map, at flush time.
    pub(crate) fn add_pending(&mut self, model_key: EntityKey, instance: Instance) -> Slot {
        self.push(model_key, instance)
    }

    /// Maps an identity for a slot added via [`Self::add_pending`].
    pub(crate) fn assign_key(&mut self, slot: Slot, key: Value, model_name: &str) -> Result<()> {
        let model = self.live(slot)?.key.model;
        let entity_key = EntityKey {
            model,
            key: key.clone(),
        };
        if self.identity.contains_key(&entity_key) {
            return Err(Error::duplicate_identity(model_name, key));
        }
        self.identity.insert(entity_key.clone(), slot);
        self.live_mut(slot)?.key = entity_key;
        Ok(())
    }

    pub(crate) fn instance(&self, slot: Slot) -> Result<&(dyn Any + Send)> {
        Ok(&*self.live(slot)?.instance)
    }

    pub(crate) fn instance_mut(&mut self, slot: Slot) -> Result<&mut (dyn Any + Send)> {
        Ok(&mut *self.live_mut(slot)?.instance)
    }

    pub fn key_of(&self, slot: Slot) -> Option<&EntityKey> {
        self.slot_ref(slot).map(|entity| &entity.key)
    }

    /// The stored snapshot, if one has been captured.
    pub fn cached_snapshot(&self, slot: Slot) -> Option<&Snapshot> {
        self.slot_ref(slot)?.snapshot.as_ref()
    }

    /// Captures a snapshot unless one is already stored. The first capture
    /// wins; the snapshot only changes through [`Self::set_snapshot`].
    pub(crate) fn snapshot_or_capture(&mut self, slot: Slot, row: Row) -> Result<&Snapshot> {
        let entity = self.live_mut(slot)?;
        Ok(entity
            .snapshot
            .get_or_insert_with(|| Snapshot::from_row(row)))
    }

    /// Replaces the stored snapshot after a successful write.
    pub(crate) fn set_snapshot(&mut self, slot: Slot, row: Row) -> Result<()> {
        self.live_mut(slot)?.snapshot = Some(Snapshot::from_row(row));
        Ok(())
    }

    pub(crate) fn set_entry(&mut self, slot: Slot, entry: EntityEntry) -> Result<()> {
        self.live_mut(slot)?.entry = Some(entry);
        Ok(())
    }

    pub fn entry(&self, slot: Slot) -> Option<&EntityEntry> {
        self.slot_ref(slot)?.entry.as_ref()
    }

    pub(crate) fn entry_mut(&mut self, slot: Slot) -> Option<&mut EntityEntry> {
        self.entities.get_mut(slot.0)?.as_mut()?.entry.as_mut()
    }

    /// Unmaps an identity while keeping the slot alive. Removal uses this
    /// so the entity stops being findable before the physical delete lands.
    pub(crate) fn detach_identity(&mut self, key: &EntityKey) -> Option<Slot> {
        self.identity.shift_remove(key)
    }

    /// Evicts a slot entirely. The slot is tombstoned, never reused.
    pub(crate) fn remove_entity(&mut self, slot: Slot) -> Result<()> {
        let entity = self
            .entities
            .get_mut(slot.0)
            .and_then(Option::take)
            .ok_or_else(|| not_managed(slot))?;
        // The identity may already have been detached.
        self.identity.shift_remove(&entity.key);
        Ok(())
    }

    fn push(&mut self, key: EntityKey, instance: Instance) -> Slot {
        let slot = Slot(self.entities.len());
        self.entities.push(Some(ManagedEntity {
            key,
            instance,
            snapshot: None,
            entry: None,
        }));
        slot
    }

    fn slot_ref(&self, slot: Slot) -> Option<&ManagedEntity> {
        self.entities.get(slot.0)?.as_ref()
    }

    fn live(&self, slot: Slot) -> Result<&ManagedEntity> {
        self.slot_ref(slot).ok_or_else(|| not_managed(slot))
    }

    fn live_mut(&mut self, slot: Slot) -> Result<&mut ManagedEntity> {
        self.entities
            .get_mut(slot.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| not_managed(slot))
    }
}

fn not_managed(slot: Slot) -> Error {
    Error::not_managed(format!("slot {} has no managed entity", slot.0))
}

impl fmt::Debug for PersistenceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceContext")
            .field("entities", &self.len())
            .field("identities", &self.identity.len())
            .finish()
    }
}
