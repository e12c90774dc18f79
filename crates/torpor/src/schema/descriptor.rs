use super::registry::{EntityVtable, ErasedColumn, ErasedRelation, Instance};
use crate::{
    relation::{BelongsTo, HasMany, HasOne},
    Entity,
};

use torpor_core::{
    schema::{ColumnDef, Fetch, ModelDef, ModelId, RelationDef, RelationKindDef, Type},
    Result, Value,
};

use std::any::{Any, TypeId};

type Getter<M> = Box<dyn Fn(&M) -> Value + Send + Sync>;
type Setter<M> = Box<dyn Fn(&mut M, Value) -> Result<()> + Send + Sync>;
type Assoc<M> =
    Box<dyn for<'a> Fn(&'a M) -> &'a crate::relation::AssociationValue + Send + Sync>;
type AssocMut<M> =
    Box<dyn for<'a> Fn(&'a mut M) -> &'a mut crate::relation::AssociationValue + Send + Sync>;

/// Declarative column and association mapping for one entity type.
///
/// Targets and foreign keys are referenced by name so that mutually
/// referential types can describe each other without recursing into each
/// other's descriptors. Everything is resolved when the database is built.
///
/// ```ignore
/// impl Entity for Person {
///     fn descriptor() -> EntityDescriptor<Self> {
///         EntityDescriptor::new("Person", "person")
///             .auto_key("id",
///                 |p| p.id.into(),
///                 |p, v| { p.id = v.to_option_i64()?; Ok(()) })
///             .column("name", Type::Text,
///                 |p| p.name.as_str().into(),
///                 |p, v| { p.name = v.to_string()?; Ok(()) })
///     }
/// }
/// ```
pub struct EntityDescriptor<M: Entity> {
    name: String,
    table: String,
    columns: Vec<ColumnDescriptor<M>>,
    relations: Vec<RelationDescriptor<M>>,
}

struct ColumnDescriptor<M> {
    def: ColumnDef,
    get: Getter<M>,
    set: Setter<M>,
}

struct RelationDescriptor<M> {
    def: RelationDef,
    assoc: Assoc<M>,
    assoc_mut: AssocMut<M>,
}

impl<M: Entity> EntityDescriptor<M> {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> EntityDescriptor<M> {
        EntityDescriptor {
            name: name.into(),
            table: table.into(),
            columns: vec![],
            relations: vec![],
        }
    }

    /// Declares a store-allocated integer primary key.
    pub fn auto_key(
        self,
        name: impl Into<String>,
        get: impl Fn(&M) -> Value + Send + Sync + 'static,
        set: impl Fn(&mut M, Value) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.push_column(
            ColumnDef {
                name: name.into(),
                ty: Type::I64,
                nullable: false,
                auto: true,
                primary_key: true,
            },
            get,
            set,
        )
    }

    /// Declares an application-assigned primary key.
    pub fn key(
        self,
        name: impl Into<String>,
        ty: Type,
        get: impl Fn(&M) -> Value + Send + Sync + 'static,
        set: impl Fn(&mut M, Value) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.push_column(
            ColumnDef {
                name: name.into(),
                ty,
                nullable: false,
                auto: false,
                primary_key: true,
            },
            get,
            set,
        )
    }

    pub fn column(
        self,
        name: impl Into<String>,
        ty: Type,
        get: impl Fn(&M) -> Value + Send + Sync + 'static,
        set: impl Fn(&mut M, Value) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.push_column(
            ColumnDef {
                name: name.into(),
                ty,
                nullable: false,
                auto: false,
                primary_key: false,
            },
            get,
            set,
        )
    }

    pub fn nullable_column(
        self,
        name: impl Into<String>,
        ty: Type,
        get: impl Fn(&M) -> Value + Send + Sync + 'static,
        set: impl Fn(&mut M, Value) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.push_column(
            ColumnDef {
                name: name.into(),
                ty,
                nullable: true,
                auto: false,
                primary_key: false,
            },
            get,
            set,
        )
    }

    /// Declares a to-many association. `foreign_key` names a column on the
    /// target model.
    pub fn has_many<T: Entity>(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        foreign_key: impl Into<String>,
        fetch: Fetch,
        get: impl for<'a> Fn(&'a M) -> &'a HasMany<T> + Send + Sync + 'static,
        get_mut: impl for<'a> Fn(&'a mut M) -> &'a mut HasMany<T> + Send + Sync + 'static,
    ) -> Self {
        self.relations.push(RelationDescriptor {
            def: RelationDef {
                name: name.into(),
                target: target.into(),
                kind: RelationKindDef::HasMany {
                    foreign_key: foreign_key.into(),
                },
                fetch,
            },
            assoc: Box::new(move |entity| get(entity).raw()),
            assoc_mut: Box::new(move |entity| get_mut(entity).raw_mut()),
        });
        self
    }

    /// Declares a to-one association. `foreign_key` names a column on the
    /// target model.
    pub fn has_one<T: Entity>(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        foreign_key: impl Into<String>,
        fetch: Fetch,
        get: impl for<'a> Fn(&'a M) -> &'a HasOne<T> + Send + Sync + 'static,
        get_mut: impl for<'a> Fn(&'a mut M) -> &'a mut HasOne<T> + Send + Sync + 'static,
    ) -> Self {
        self.relations.push(RelationDescriptor {
            def: RelationDef {
                name: name.into(),
                target: target.into(),
                kind: RelationKindDef::HasOne {
                    foreign_key: foreign_key.into(),
                },
                fetch,
            },
            assoc: Box::new(move |entity| get(entity).raw()),
            assoc_mut: Box::new(move |entity| get_mut(entity).raw_mut()),
        });
        self
    }

    /// Declares the owning side of an association. `foreign_key` names a
    /// column on this model.
    pub fn belongs_to<T: Entity>(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        foreign_key: impl Into<String>,
        fetch: Fetch,
        get: impl for<'a> Fn(&'a M) -> &'a BelongsTo<T> + Send + Sync + 'static,
        get_mut: impl for<'a> Fn(&'a mut M) -> &'a mut BelongsTo<T> + Send + Sync + 'static,
    ) -> Self {
        self.relations.push(RelationDescriptor {
            def: RelationDef {
                name: name.into(),
                target: target.into(),
                kind: RelationKindDef::BelongsTo {
                    foreign_key: foreign_key.into(),
                },
                fetch,
            },
            assoc: Box::new(move |entity| get(entity).raw()),
            assoc_mut: Box::new(move |entity| get_mut(entity).raw_mut()),
        });
        self
    }

    fn push_column(
        mut self,
        def: ColumnDef,
        get: impl Fn(&M) -> Value + Send + Sync + 'static,
        set: impl Fn(&mut M, Value) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.columns.push(ColumnDescriptor {
            def,
            get: Box::new(get),
            set: Box::new(set),
        });
        self
    }

    /// Splits the descriptor into the schema definition and the type-erased
    /// accessor table.
    pub(crate) fn erase(self, model: ModelId) -> (ModelDef, EntityVtable) {
        let mut column_defs = Vec::with_capacity(self.columns.len());
        let mut columns = Vec::with_capacity(self.columns.len());

        for descriptor in self.columns {
            let ColumnDescriptor { def, get, set } = descriptor;
            column_defs.push(def);
            columns.push(ErasedColumn {
                get: Box::new(move |instance| get(concrete::<M>(instance))),
                set: Box::new(move |instance, value| set(concrete_mut::<M>(instance), value)),
            });
        }

        let mut relation_defs = Vec::with_capacity(self.relations.len());
        let mut relations = Vec::with_capacity(self.relations.len());

        for descriptor in self.relations {
            let RelationDescriptor {
                def,
                assoc,
                assoc_mut,
            } = descriptor;
            relation_defs.push(def);
            relations.push(ErasedRelation {
                assoc: Box::new(move |instance| assoc(concrete::<M>(instance))),
                assoc_mut: Box::new(move |instance| assoc_mut(concrete_mut::<M>(instance))),
            });
        }

        let def = ModelDef {
            name: self.name,
            table: self.table,
            columns: column_defs,
            relations: relation_defs,
        };

        let vtable = EntityVtable {
            model,
            type_id: TypeId::of::<M>(),
            type_name: std::any::type_name::<M>(),
            columns,
            relations,
            new_instance: Box::new(|| Box::new(M::default()) as Instance),
        };

        (def, vtable)
    }
}

fn concrete<M: Entity>(instance: &(dyn Any + Send)) -> &M {
    instance
        .downcast_ref::<M>()
        .expect("entity instance does not match descriptor type")
}

fn concrete_mut<M: Entity>(instance: &mut (dyn Any + Send)) -> &mut M {
    instance
        .downcast_mut::<M>()
        .expect("entity instance does not match descriptor type")
}
