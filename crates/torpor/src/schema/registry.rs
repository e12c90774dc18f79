use crate::{relation::AssociationValue, Entity};

use torpor_core::{
    err,
    schema::{ColumnId, ModelId, RelationId},
    Result, Row, Value,
};

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// A type-erased entity instance, as stored in the context arena.
pub(crate) type Instance = Box<dyn Any + Send>;

pub(crate) type ErasedGetter = Box<dyn Fn(&(dyn Any + Send)) -> Value + Send + Sync>;
pub(crate) type ErasedSetter = Box<dyn Fn(&mut (dyn Any + Send), Value) -> Result<()> + Send + Sync>;
pub(crate) type ErasedAssoc =
    Box<dyn for<'a> Fn(&'a (dyn Any + Send)) -> &'a AssociationValue + Send + Sync>;
pub(crate) type ErasedAssocMut =
    Box<dyn for<'a> Fn(&'a mut (dyn Any + Send)) -> &'a mut AssociationValue + Send + Sync>;
pub(crate) type NewInstance = Box<dyn Fn() -> Instance + Send + Sync>;

pub(crate) struct ErasedColumn {
    pub(crate) get: ErasedGetter,
    pub(crate) set: ErasedSetter,
}

pub(crate) struct ErasedRelation {
    pub(crate) assoc: ErasedAssoc,
    pub(crate) assoc_mut: ErasedAssocMut,
}

/// Type-erased accessors for one registered entity type.
///
/// Column order matches the model's schema columns, so rows read through
/// the vtable line up with rows coming back from the driver.
pub(crate) struct EntityVtable {
    pub(crate) model: ModelId,
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) columns: Vec<ErasedColumn>,
    pub(crate) relations: Vec<ErasedRelation>,
    pub(crate) new_instance: NewInstance,
}

impl EntityVtable {
    /// Reads every column into a row.
    pub(crate) fn read_row(&self, instance: &(dyn Any + Send)) -> Row {
        self.columns.iter().map(|column| (column.get)(instance)).collect()
    }

    /// Reads a single column.
    pub(crate) fn column_value(&self, instance: &(dyn Any + Send), column: ColumnId) -> Value {
        (self.columns[column.0].get)(instance)
    }

    /// Writes a row into the instance's column fields.
    pub(crate) fn write_row(&self, instance: &mut (dyn Any + Send), row: Row) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(err!(
                "row width {} does not match `{}` with {} columns",
                row.len(),
                self.type_name,
                self.columns.len()
            ));
        }
        for (column, value) in self.columns.iter().zip(row) {
            (column.set)(instance, value)?;
        }
        Ok(())
    }

    pub(crate) fn set_column(
        &self,
        instance: &mut (dyn Any + Send),
        column: ColumnId,
        value: Value,
    ) -> Result<()> {
        (self.columns[column.0].set)(instance, value)
    }

    /// Builds a fresh instance from a stored row. Associations start out
    /// unloaded.
    pub(crate) fn instantiate(&self, row: Row) -> Result<Instance> {
        let mut instance = (self.new_instance)();
        self.write_row(&mut *instance, row)?;
        Ok(instance)
    }

    pub(crate) fn association<'a>(
        &self,
        instance: &'a (dyn Any + Send),
        relation: RelationId,
    ) -> &'a AssociationValue {
        (self.relations[relation.0].assoc)(instance)
    }

    pub(crate) fn association_mut<'a>(
        &self,
        instance: &'a mut (dyn Any + Send),
        relation: RelationId,
    ) -> &'a mut AssociationValue {
        (self.relations[relation.0].assoc_mut)(instance)
    }
}

impl fmt::Debug for EntityVtable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityVtable")
            .field("model", &self.model)
            .field("type_name", &self.type_name)
            .field("columns", &self.columns.len())
            .field("relations", &self.relations.len())
            .finish()
    }
}

/// Immutable lookup from registered entity types to their vtables.
pub(crate) struct Registry {
    vtables: Vec<EntityVtable>,
    by_type: HashMap<TypeId, ModelId>,
}

impl Registry {
    pub(crate) fn new(vtables: Vec<EntityVtable>) -> Registry {
        let by_type = vtables
            .iter()
            .map(|vtable| (vtable.type_id, vtable.model))
            .collect();
        Registry { vtables, by_type }
    }

    pub(crate) fn vtable(&self, model: ModelId) -> &EntityVtable {
        &self.vtables[model.0]
    }

    /// The model registered for an entity type.
    pub(crate) fn model_of<M: Entity>(&self) -> Result<ModelId> {
        self.by_type
            .get(&TypeId::of::<M>())
            .copied()
            .ok_or_else(|| {
                err!(
                    "entity type `{}` is not registered",
                    std::any::type_name::<M>()
                )
            })
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("models", &self.vtables.len())
            .finish()
    }
}
