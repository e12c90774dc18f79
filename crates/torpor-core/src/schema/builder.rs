use super::{Column, ColumnId, Fetch, Model, ModelId, Relation, RelationId, RelationKind, Schema, Type};
use crate::{Error, Result};

use indexmap::IndexMap;

/// Assembles and validates a [`Schema`] from unresolved model definitions.
///
/// Definitions reference other models and foreign key columns by name so
/// that models can be registered in any order, including mutually
/// referential pairs. `build` assigns identifiers in registration order and
/// resolves every name.
#[derive(Debug, Default)]
pub struct Builder {
    models: Vec<ModelDef>,
}

/// A model definition prior to identifier assignment and name resolution.
#[derive(Debug)]
pub struct ModelDef {
    pub name: String,
    pub table: String,
    pub columns: Vec<ColumnDef>,
    pub relations: Vec<RelationDef>,
}

#[derive(Debug)]
pub struct ColumnDef {
    pub name: String,
    pub ty: Type,
    pub nullable: bool,
    pub auto: bool,
    pub primary_key: bool,
}

#[derive(Debug)]
pub struct RelationDef {
    pub name: String,

    /// Name of the target model.
    pub target: String,

    pub kind: RelationKindDef,

    pub fetch: Fetch,
}

/// Relation kind with the foreign key still referenced by column name.
#[derive(Debug)]
pub enum RelationKindDef {
    HasMany { foreign_key: String },
    HasOne { foreign_key: String },
    BelongsTo { foreign_key: String },
}

impl Builder {
    /// Adds a model definition. Identifiers are assigned in call order.
    pub fn model(&mut self, def: ModelDef) -> &mut Self {
        self.models.push(def);
        self
    }

    pub fn build(&mut self) -> Result<Schema> {
        let defs = std::mem::take(&mut self.models);

        // Reserve identifiers up front so relations can reference models in
        // either direction, including models defined later.
        let mut lookup: IndexMap<String, ModelId> = IndexMap::new();
        for (index, def) in defs.iter().enumerate() {
            if lookup.insert(def.name.clone(), ModelId(index)).is_some() {
                return Err(Error::invalid_schema(format!(
                    "model `{}` registered more than once",
                    def.name
                )));
            }
        }

        let mut models = Vec::with_capacity(defs.len());
        for (index, def) in defs.iter().enumerate() {
            models.push(build_model(ModelId(index), def, &lookup, &defs)?);
        }

        let schema = Schema { models };
        schema.verify()?;
        Ok(schema)
    }
}

fn build_model(
    id: ModelId,
    def: &ModelDef,
    lookup: &IndexMap<String, ModelId>,
    defs: &[ModelDef],
) -> Result<Model> {
    let mut columns = Vec::with_capacity(def.columns.len());
    let mut primary_key = None;

    for (index, column) in def.columns.iter().enumerate() {
        if def.columns[..index].iter().any(|c| c.name == column.name) {
            return Err(Error::invalid_schema(format!(
                "duplicate column `{}` on model `{}`",
                column.name, def.name
            )));
        }

        if column.primary_key && primary_key.replace(ColumnId(index)).is_some() {
            return Err(Error::invalid_schema(format!(
                "model `{}` declares more than one primary key",
                def.name
            )));
        }

        columns.push(Column {
            id: ColumnId(index),
            name: column.name.clone(),
            ty: column.ty,
            nullable: column.nullable,
            auto: column.auto,
        });
    }

    let Some(primary_key) = primary_key else {
        return Err(Error::invalid_schema(format!(
            "model `{}` has no primary key",
            def.name
        )));
    };

    let mut relations = Vec::with_capacity(def.relations.len());

    for (index, relation) in def.relations.iter().enumerate() {
        if def.relations[..index].iter().any(|r| r.name == relation.name) {
            return Err(Error::invalid_schema(format!(
                "duplicate relation `{}` on model `{}`",
                relation.name, def.name
            )));
        }

        let Some(&target) = lookup.get(&relation.target) else {
            return Err(Error::invalid_schema(format!(
                "relation `{}.{}` references unknown model `{}`",
                def.name, relation.name, relation.target
            )));
        };

        // The foreign key lives on the target for has-many and has-one, and
        // on the defining model for belongs-to.
        let kind = match &relation.kind {
            RelationKindDef::HasMany { foreign_key } => RelationKind::HasMany {
                foreign_key: resolve_column(&defs[target.0], foreign_key, def, relation)?,
            },
            RelationKindDef::HasOne { foreign_key } => RelationKind::HasOne {
                foreign_key: resolve_column(&defs[target.0], foreign_key, def, relation)?,
            },
            RelationKindDef::BelongsTo { foreign_key } => RelationKind::BelongsTo {
                foreign_key: resolve_column(def, foreign_key, def, relation)?,
            },
        };

        relations.push(Relation {
            id: RelationId(index),
            name: relation.name.clone(),
            target,
            kind,
            fetch: relation.fetch,
        });
    }

    Ok(Model {
        id,
        name: def.name.clone(),
        table: def.table.clone(),
        columns,
        primary_key,
        relations,
    })
}

fn resolve_column(
    on: &ModelDef,
    name: &str,
    owner: &ModelDef,
    relation: &RelationDef,
) -> Result<ColumnId> {
    on.columns
        .iter()
        .position(|column| column.name == name)
        .map(ColumnId)
        .ok_or_else(|| {
            Error::invalid_schema(format!(
                "relation `{}.{}` references unknown foreign key `{}.{}`",
                owner.name, relation.name, on.name, name
            ))
        })
}
