use crate::{
    action::{ActionQueue, DeleteAction, InsertAction, PendingFk},
    context::{EntityEntry, EntityState, PersistenceContext},
    entity::{EntityKey, Managed, Slot},
    event::{EntityEvent, EventKind, Listeners},
    loader::Loader,
    persister::Persister,
    schema::registry::{Instance, Registry},
    Entity,
};

use torpor_core::{
    bail, err,
    schema::{ModelId, Relation, RelationId, RelationKind, Schema},
    Driver, Error, Result, Row, Value,
};

use async_recursion::async_recursion;
use std::sync::Arc;

/// A unit of work: one persistence context plus the machinery to read and
/// write entities through it.
///
/// Sessions are cheap to open and are meant to be discarded when the unit
/// of work ends. A session is single-writer; every mutating operation takes
/// `&mut self`.
#[derive(Debug)]
pub struct Session {
    schema: Arc<Schema>,
    registry: Arc<Registry>,
    persister: Persister,
    loader: Loader,
    context: PersistenceContext,
    queue: ActionQueue,
    listeners: Arc<Listeners>,
}

impl Session {
    pub(crate) fn new(
        schema: Arc<Schema>,
        registry: Arc<Registry>,
        driver: Arc<dyn Driver>,
        listeners: Arc<Listeners>,
    ) -> Session {
        Session {
            persister: Persister::new(schema.clone(), driver.clone()),
            loader: Loader::new(schema.clone(), driver),
            schema,
            registry,
            context: PersistenceContext::new(),
            queue: ActionQueue::default(),
            listeners,
        }
    }

    /// Returns the managed entity under `key`, loading it on an identity
    /// map miss.
    ///
    /// Loading caches the entity and, transitively, every eager
    /// association. Lazy associations stay unloaded until resolved through
    /// [`Session::load_many`] and friends. Fails with `record not found`
    /// if the store has no such row.
    pub async fn find<M: Entity>(&mut self, key: impl Into<Value>) -> Result<Managed<M>> {
        let schema = self.schema.clone();
        let model = self.registry.model_of::<M>()?;
        let identity = EntityKey {
            model,
            key: key.into(),
        };

        if let Some(slot) = self.context.entity(&identity) {
            tracing::debug!(
                model = %schema.model(model).name,
                key = ?identity.key,
                "identity map hit"
            );
            return Ok(Managed::new(slot));
        }

        tracing::debug!(
            model = %schema.model(model).name,
            key = ?identity.key,
            "identity map miss"
        );
        let row = self.loader.load(model, identity.key).await?;
        let slot = self.cache_loaded_row(model, row).await?;
        Ok(Managed::new(slot))
    }

    /// Accesses a managed instance through its handle.
    pub fn get<M: Entity>(&self, handle: &Managed<M>) -> Result<&M> {
        let instance = self.context.instance(handle.slot())?;
        instance
            .downcast_ref::<M>()
            .ok_or_else(|| wrong_type::<M>(handle.slot()))
    }

    /// Accesses a managed instance mutably. Changes become visible to the
    /// store through [`Session::merge`] or [`Session::stage_merge`].
    pub fn get_mut<M: Entity>(&mut self, handle: &Managed<M>) -> Result<&mut M> {
        let slot = handle.slot();
        let instance = self.context.instance_mut(slot)?;
        instance
            .downcast_mut::<M>()
            .ok_or_else(|| wrong_type::<M>(slot))
    }

    /// The session's persistence context, for inspection.
    pub fn context(&self) -> &PersistenceContext {
        &self.context
    }

    /// Actions staged but not yet flushed.
    pub fn queue(&self) -> &ActionQueue {
        &self.queue
    }

    /// Inserts the entity and manages it.
    ///
    /// When the key column is store-allocated the generated key is written
    /// back into the instance. Values attached to associations are inserted
    /// along with their owner, each child's foreign-key column set to the
    /// owner's key first. A freshly persisted entity's eager associations
    /// resolve from the context alone; the store is not consulted.
    pub async fn persist<M: Entity>(&mut self, entity: M) -> Result<Managed<M>> {
        let model = self.registry.model_of::<M>()?;
        let slot = self.persist_boxed(model, Box::new(entity)).await?;
        Ok(Managed::new(slot))
    }

    /// Writes the entity's current values if they differ from its snapshot.
    ///
    /// Equal values make this a no-op; no statement reaches the store.
    pub async fn merge<M: Entity>(&mut self, handle: &Managed<M>) -> Result<Managed<M>> {
        let identity = self.identity_of::<M>(handle.slot())?;
        self.update_if_dirty(identity.model, handle.slot()).await?;
        Ok(*handle)
    }

    /// Deletes the entity's row and evicts it from the context.
    ///
    /// The identity is surrendered before the delete executes, so a
    /// concurrent `find` within this session re-consults the store. If the
    /// delete fails the entry stays `Deleted`, the identity stays
    /// surrendered, and the error propagates.
    pub async fn remove<M: Entity>(&mut self, handle: &Managed<M>) -> Result<()> {
        let slot = handle.slot();
        let identity = self.identity_of::<M>(slot)?;

        self.transition(slot, EntityState::Deleted)?;
        self.context.detach_identity(&identity);

        self.persister
            .delete(identity.model, identity.key)
            .await?;

        self.transition(slot, EntityState::Gone)?;
        self.context.remove_entity(slot)
    }

    /// Resolves a to-many association by name, loading it on first access.
    /// Subsequent calls return the cached handles without touching the
    /// store.
    pub async fn load_many<M: Entity, T: Entity>(
        &mut self,
        handle: &Managed<M>,
        name: &str,
    ) -> Result<Vec<Managed<T>>> {
        let relation = self.named_relation::<M, T>(handle.slot(), name)?;
        if !matches!(relation.kind, RelationKind::HasMany { .. }) {
            bail!("association `{}` is not to-many", name);
        }
        let slots = self.resolve_relation(handle.slot(), relation.id).await?;
        Ok(slots.into_iter().map(Managed::new).collect())
    }

    /// Resolves a to-one association by name, loading it on first access.
    pub async fn load_one<M: Entity, T: Entity>(
        &mut self,
        handle: &Managed<M>,
        name: &str,
    ) -> Result<Option<Managed<T>>> {
        let relation = self.named_relation::<M, T>(handle.slot(), name)?;
        if !matches!(relation.kind, RelationKind::HasOne { .. }) {
            bail!("association `{}` is not to-one", name);
        }
        let slots = self.resolve_relation(handle.slot(), relation.id).await?;
        Ok(slots.first().copied().map(Managed::new))
    }

    /// Resolves an owning-side association by name, loading it on first
    /// access. A `null` foreign key resolves to `None`.
    pub async fn load_parent<M: Entity, T: Entity>(
        &mut self,
        handle: &Managed<M>,
        name: &str,
    ) -> Result<Option<Managed<T>>> {
        let relation = self.named_relation::<M, T>(handle.slot(), name)?;
        if !matches!(relation.kind, RelationKind::BelongsTo { .. }) {
            bail!("association `{}` is not an owning side", name);
        }
        let slots = self.resolve_relation(handle.slot(), relation.id).await?;
        Ok(slots.first().copied().map(Managed::new))
    }

    /// Queues an insert without touching the store.
    ///
    /// The entity is tracked immediately but joins the identity map only
    /// when [`Session::flush`] executes the insert and the stored key is
    /// known. Attached children are staged behind their owner and their
    /// foreign keys resolve at flush time.
    pub fn stage_persist<M: Entity>(&mut self, entity: M) -> Result<Managed<M>> {
        let model = self.registry.model_of::<M>()?;
        let slot = self.stage_persist_boxed(model, Box::new(entity), None)?;
        Ok(Managed::new(slot))
    }

    /// Queues an update. Dirtiness is re-checked when the action executes,
    /// so flushing a clean entity writes nothing.
    pub fn stage_merge<M: Entity>(&mut self, handle: &Managed<M>) -> Result<()> {
        let slot = handle.slot();
        let identity = self.identity_of::<M>(slot)?;
        let event = EntityEvent {
            kind: EventKind::Merge,
            model: identity.model,
            slot,
            pending_fk: None,
        };
        self.listeners.dispatch(&event, &mut self.queue)
    }

    /// Queues a delete. The identity is surrendered immediately, so later
    /// finds re-consult the store; the slot stays inspectable until the
    /// delete lands.
    pub fn stage_remove<M: Entity>(&mut self, handle: &Managed<M>) -> Result<()> {
        let slot = handle.slot();
        let identity = self.identity_of::<M>(slot)?;

        self.transition(slot, EntityState::Deleted)?;
        self.context.detach_identity(&identity);

        let event = EntityEvent {
            kind: EventKind::Remove,
            model: identity.model,
            slot,
            pending_fk: None,
        };
        self.listeners.dispatch(&event, &mut self.queue)
    }

    /// Executes every queued action: inserts first, then updates, then
    /// deletes, each bucket in enqueue order.
    ///
    /// A flush is not transactional. Actions that executed stay executed
    /// if a later one fails; the failing action and everything behind it
    /// stay queued so a later flush can retry.
    pub async fn flush(&mut self) -> Result<()> {
        tracing::debug!(
            inserts = self.queue.inserts.len(),
            updates = self.queue.updates.len(),
            deletes = self.queue.deletes.len(),
            "flushing queued actions"
        );

        let mut inserts = std::mem::take(&mut self.queue.inserts);
        let mut index = 0;
        while index < inserts.len() {
            let action = inserts[index];
            if let Err(err) = self.flush_insert(action).await {
                self.queue.inserts = inserts.split_off(index);
                return Err(err);
            }
            index += 1;
        }

        let mut updates = std::mem::take(&mut self.queue.updates);
        index = 0;
        while index < updates.len() {
            let action = updates[index];
            if let Err(err) = self.update_if_dirty(action.model, action.slot).await {
                self.queue.updates = updates.split_off(index);
                return Err(err);
            }
            index += 1;
        }

        let mut deletes = std::mem::take(&mut self.queue.deletes);
        index = 0;
        while index < deletes.len() {
            let action = deletes[index];
            if let Err(err) = self.flush_delete(action).await {
                self.queue.deletes = deletes.split_off(index);
                return Err(err);
            }
            index += 1;
        }

        Ok(())
    }

    #[async_recursion]
    async fn persist_boxed(&mut self, model: ModelId, mut instance: Instance) -> Result<Slot> {
        let schema = self.schema.clone();
        let registry = self.registry.clone();
        let m = schema.model(model);
        let vtable = registry.vtable(model);

        // Take attached children out before the instance moves into the
        // context; each batch remembers the relation it came from.
        let mut pending: Vec<(RelationId, Vec<Instance>)> = vec![];
        for relation in &m.relations {
            let assoc = vtable.association_mut(&mut *instance, relation.id);
            if assoc.is_transient() {
                pending.push((relation.id, assoc.take_transient()));
            }
        }

        let row = vtable.read_row(&*instance);
        let stored_key = self.persister.insert(model, row).await?;
        vtable.set_column(&mut *instance, m.primary_key, stored_key.clone())?;

        let identity = EntityKey {
            model,
            key: stored_key.clone(),
        };
        let slot = self.context.add_entity(identity, instance, &m.name)?;
        let snapshot_row = {
            let instance = self.context.instance(slot)?;
            vtable.read_row(instance)
        };
        self.context.snapshot_or_capture(slot, snapshot_row)?;
        self.context.set_entry(slot, EntityEntry::saving())?;

        // Children point back at the owner, then insert, then the
        // association resolves to the managed children.
        for (relation_id, children) in pending {
            let relation = m.relation(relation_id);
            let foreign_key = relation.foreign_key();
            let child_vtable = registry.vtable(relation.target);

            let mut child_slots = Vec::with_capacity(children.len());
            for mut child in children {
                child_vtable.set_column(&mut *child, foreign_key, stored_key.clone())?;
                child_slots.push(self.persist_boxed(relation.target, child).await?);
            }

            let owner = self.context.instance_mut(slot)?;
            vtable
                .association_mut(owner, relation_id)
                .set_loaded(child_slots);
        }

        // Remaining eager associations resolve from what the context
        // already holds; a fresh insert is trusted to have no stored
        // children and an uncached parent is left for lazy resolution.
        for relation in m.eager_relations() {
            let resolved = {
                let owner = self.context.instance(slot)?;
                vtable.association(owner, relation.id).is_loaded()
            };
            if resolved {
                continue;
            }

            let slots = match relation.kind {
                RelationKind::HasMany { .. } | RelationKind::HasOne { .. } => Some(vec![]),
                RelationKind::BelongsTo { .. } => {
                    let fk_value = {
                        let owner = self.context.instance(slot)?;
                        vtable.column_value(owner, relation.foreign_key())
                    };
                    if fk_value.is_null() {
                        Some(vec![])
                    } else {
                        self.context
                            .entity(&EntityKey {
                                model: relation.target,
                                key: fk_value,
                            })
                            .map(|parent| vec![parent])
                    }
                }
            };
            if let Some(slots) = slots {
                let owner = self.context.instance_mut(slot)?;
                vtable.association_mut(owner, relation.id).set_loaded(slots);
            }
        }

        self.transition(slot, EntityState::Managed)?;
        Ok(slot)
    }

    fn stage_persist_boxed(
        &mut self,
        model: ModelId,
        mut instance: Instance,
        pending_fk: Option<PendingFk>,
    ) -> Result<Slot> {
        let schema = self.schema.clone();
        let registry = self.registry.clone();
        let m = schema.model(model);
        let vtable = registry.vtable(model);

        let mut pending: Vec<(RelationId, Vec<Instance>)> = vec![];
        for relation in &m.relations {
            let assoc = vtable.association_mut(&mut *instance, relation.id);
            if assoc.is_transient() {
                pending.push((relation.id, assoc.take_transient()));
            }
        }

        let slot = self.context.add_pending(
            EntityKey {
                model,
                key: Value::Null,
            },
            instance,
        );
        self.context.set_entry(slot, EntityEntry::saving())?;

        let event = EntityEvent {
            kind: EventKind::Persist,
            model,
            slot,
            pending_fk,
        };
        self.listeners.dispatch(&event, &mut self.queue)?;

        // Children queue behind their owner; the foreign key resolves from
        // the owner's stored key when the owner's insert executes.
        for (relation_id, children) in pending {
            let relation = m.relation(relation_id);
            let child_fk = PendingFk {
                column: relation.foreign_key(),
                parent: slot,
            };

            let mut child_slots = Vec::with_capacity(children.len());
            for child in children {
                child_slots.push(self.stage_persist_boxed(relation.target, child, Some(child_fk))?);
            }

            let owner = self.context.instance_mut(slot)?;
            vtable
                .association_mut(owner, relation_id)
                .set_loaded(child_slots);
        }

        Ok(slot)
    }

    async fn flush_insert(&mut self, action: InsertAction) -> Result<()> {
        let schema = self.schema.clone();
        let registry = self.registry.clone();
        let m = schema.model(action.model);
        let vtable = registry.vtable(action.model);

        // An owner staged ahead of this action has flushed by now; its key
        // fills the child's foreign-key column.
        if let Some(pending) = action.pending_fk {
            let parent_key = match self.context.key_of(pending.parent) {
                Some(identity) => identity.key.clone(),
                None => return Err(evicted(pending.parent)),
            };
            if parent_key.is_null() {
                bail!(
                    "insert for table `{}` depends on a parent that has not flushed",
                    m.table
                );
            }
            let instance = self.context.instance_mut(action.slot)?;
            vtable.set_column(instance, pending.column, parent_key)?;
        }

        let row = {
            let instance = self.context.instance(action.slot)?;
            vtable.read_row(instance)
        };
        let stored_key = self.persister.insert(action.model, row).await?;

        let instance = self.context.instance_mut(action.slot)?;
        vtable.set_column(instance, m.primary_key, stored_key.clone())?;
        self.context.assign_key(action.slot, stored_key, &m.name)?;

        let snapshot_row = {
            let instance = self.context.instance(action.slot)?;
            vtable.read_row(instance)
        };
        self.context.snapshot_or_capture(action.slot, snapshot_row)?;
        self.transition(action.slot, EntityState::Managed)
    }

    async fn flush_delete(&mut self, action: DeleteAction) -> Result<()> {
        let identity = match self.context.key_of(action.slot) {
            Some(identity) => identity.clone(),
            None => return Err(evicted(action.slot)),
        };

        // The identity was surrendered when the remove was staged.
        self.persister.delete(action.model, identity.key).await?;

        self.transition(action.slot, EntityState::Gone)?;
        self.context.remove_entity(action.slot)
    }

    /// Writes the entity's row if its current values differ from the
    /// snapshot. Returns whether a write happened.
    async fn update_if_dirty(&mut self, model: ModelId, slot: Slot) -> Result<bool> {
        let schema = self.schema.clone();
        let registry = self.registry.clone();
        let m = schema.model(model);
        let vtable = registry.vtable(model);

        let identity = match self.context.key_of(slot) {
            Some(identity) => identity.clone(),
            None => return Err(evicted(slot)),
        };

        let current = {
            let instance = self.context.instance(slot)?;
            vtable.read_row(instance)
        };

        // Keys are immutable while managed; a changed key would split the
        // identity map from the store.
        if current[m.primary_key.0] != identity.key {
            bail!(
                "primary key of `{}` changed from {:?} to {:?} while managed",
                m.name,
                identity.key,
                current[m.primary_key.0]
            );
        }

        let clean = self
            .context
            .cached_snapshot(slot)
            .is_some_and(|snapshot| snapshot.matches(&current));
        if clean {
            tracing::debug!(model = %m.name, key = ?identity.key, "clean, skipping update");
            return Ok(false);
        }

        self.transition(slot, EntityState::Saving)?;
        tracing::debug!(model = %m.name, key = ?identity.key, "dirty, updating");

        let updated = self
            .persister
            .update(model, identity.key.clone(), current.clone())
            .await?;
        if !updated {
            return Err(Error::record_not_found(format!(
                "table={} key={:?}",
                m.table, identity.key
            )));
        }

        self.context.set_snapshot(slot, current)?;
        self.transition(slot, EntityState::Managed)?;
        Ok(true)
    }

    /// Caches a stored row as a managed entity, entering `Loading` until
    /// its eager associations are resolved.
    ///
    /// Cyclic association graphs re-enter here; the identity map check
    /// makes the second visit a no-op, which is what terminates the
    /// recursion.
    #[async_recursion]
    async fn cache_loaded_row(&mut self, model: ModelId, row: Row) -> Result<Slot> {
        let schema = self.schema.clone();
        let registry = self.registry.clone();
        let m = schema.model(model);
        let vtable = registry.vtable(model);

        let identity = EntityKey {
            model,
            key: row[m.primary_key.0].clone(),
        };
        if let Some(slot) = self.context.entity(&identity) {
            return Ok(slot);
        }

        let instance = vtable.instantiate(row.clone())?;
        let slot = self.context.add_entity(identity, instance, &m.name)?;
        self.context.snapshot_or_capture(slot, row)?;
        self.context.set_entry(slot, EntityEntry::loading())?;

        for relation in m.eager_relations() {
            self.resolve_relation(slot, relation.id).await?;
        }

        self.transition(slot, EntityState::Managed)?;
        Ok(slot)
    }

    /// Resolves one association to managed slots, loading rows on the
    /// first call and returning the cached slots afterwards.
    #[async_recursion]
    async fn resolve_relation(&mut self, slot: Slot, relation: RelationId) -> Result<Vec<Slot>> {
        let schema = self.schema.clone();
        let registry = self.registry.clone();

        let identity = match self.context.key_of(slot) {
            Some(identity) => identity.clone(),
            None => return Err(evicted(slot)),
        };
        let m = schema.model(identity.model);
        let rel = m.relation(relation);
        let vtable = registry.vtable(identity.model);

        {
            let instance = self.context.instance(slot)?;
            let assoc = vtable.association(instance, relation);
            if let Some(slots) = assoc.loaded_slots() {
                return Ok(slots.to_vec());
            }
            if assoc.is_transient() {
                bail!(
                    "association `{}` on `{}` holds transient values; persist the owner to save them",
                    rel.name,
                    m.name
                );
            }
        }

        let slots = match rel.kind {
            RelationKind::HasMany { foreign_key } | RelationKind::HasOne { foreign_key } => {
                let rows = self
                    .loader
                    .load_by_column(rel.target, foreign_key, identity.key)
                    .await?;
                let mut slots = Vec::with_capacity(rows.len());
                for row in rows {
                    slots.push(self.cache_loaded_row(rel.target, row).await?);
                }
                slots
            }
            RelationKind::BelongsTo { .. } => {
                let fk_value = {
                    let instance = self.context.instance(slot)?;
                    vtable.column_value(instance, rel.foreign_key())
                };
                if fk_value.is_null() {
                    vec![]
                } else {
                    let parent = EntityKey {
                        model: rel.target,
                        key: fk_value,
                    };
                    match self.context.entity(&parent) {
                        Some(parent_slot) => vec![parent_slot],
                        None => {
                            let row = self.loader.load(rel.target, parent.key).await?;
                            vec![self.cache_loaded_row(rel.target, row).await?]
                        }
                    }
                }
            }
        };

        let instance = self.context.instance_mut(slot)?;
        vtable
            .association_mut(instance, relation)
            .set_loaded(slots.clone());
        Ok(slots)
    }

    /// Looks up a relation by name and checks that the handle and target
    /// types line up.
    fn named_relation<M: Entity, T: Entity>(&self, slot: Slot, name: &str) -> Result<Relation> {
        let identity = self.identity_of::<M>(slot)?;
        let m = self.schema.model(identity.model);
        let relation = m
            .relation_by_name(name)
            .ok_or_else(|| err!("`{}` has no association named `{}`", m.name, name))?;

        let target = self.registry.model_of::<T>()?;
        if relation.target != target {
            return Err(err!(
                "association `{}` on `{}` targets `{}`, not `{}`",
                name,
                m.name,
                self.schema.model(relation.target).name,
                self.schema.model(target).name
            ));
        }
        Ok(relation.clone())
    }

    /// The identity under `slot`, checked against the handle's type.
    fn identity_of<M: Entity>(&self, slot: Slot) -> Result<EntityKey> {
        let model = self.registry.model_of::<M>()?;
        let identity = self.context.key_of(slot).ok_or_else(|| evicted(slot))?;
        if identity.model != model {
            return Err(wrong_type::<M>(slot));
        }
        Ok(identity.clone())
    }

    fn transition(&mut self, slot: Slot, to: EntityState) -> Result<()> {
        match self.context.entry_mut(slot) {
            Some(entry) => entry.transition(to),
            None => Err(evicted(slot)),
        }
    }
}

fn evicted(slot: Slot) -> Error {
    Error::not_managed(format!("slot {} was evicted", slot.index()))
}

fn wrong_type<M>(slot: Slot) -> Error {
    err!(
        "slot {} does not hold a `{}`",
        slot.index(),
        std::any::type_name::<M>()
    )
}
