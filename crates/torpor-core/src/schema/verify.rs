use super::{RelationKind, Schema, Type};
use crate::{Error, Result};

/// Structural checks applied after name resolution.
pub(crate) fn apply(schema: &Schema) -> Result<()> {
    for model in &schema.models {
        let pk = model.primary_key_column();

        if pk.nullable {
            return Err(Error::invalid_schema(format!(
                "primary key `{}.{}` must not be nullable",
                model.name, pk.name
            )));
        }

        if pk.auto && pk.ty != Type::I64 {
            return Err(Error::invalid_schema(format!(
                "auto-allocated key `{}.{}` must be I64",
                model.name, pk.name
            )));
        }

        for column in &model.columns {
            if column.auto && column.id != model.primary_key {
                return Err(Error::invalid_schema(format!(
                    "auto-allocated column `{}.{}` must be the primary key",
                    model.name, column.name
                )));
            }
        }

        for relation in &model.relations {
            // The foreign key must be able to hold the referenced key.
            let (fk_model, key_model) = match relation.kind {
                RelationKind::HasMany { .. } | RelationKind::HasOne { .. } => {
                    (schema.model(relation.target), model)
                }
                RelationKind::BelongsTo { .. } => (model, schema.model(relation.target)),
            };

            let fk = fk_model.column(relation.foreign_key());
            let key = key_model.primary_key_column();

            if fk.ty != key.ty {
                return Err(Error::invalid_schema(format!(
                    "foreign key `{}.{}` type does not match key `{}.{}`",
                    fk_model.name, fk.name, key_model.name, key.name
                )));
            }
        }
    }

    Ok(())
}
