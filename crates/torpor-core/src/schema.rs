mod builder;
pub use builder::{Builder, ColumnDef, ModelDef, RelationDef, RelationKindDef};

mod column;
pub use column::{Column, ColumnId, Type};

mod model;
pub use model::{Model, ModelId};

mod relation;
pub use relation::{Fetch, Relation, RelationId, RelationKind};

mod verify;

use crate::Result;

/// Fully resolved mapping metadata for every registered model.
///
/// A schema is immutable once built. Components hold it behind an `Arc` and
/// navigate by identifier.
#[derive(Debug, Default)]
pub struct Schema {
    pub models: Vec<Model>,
}

impl Schema {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Returns the model with the given identifier.
    ///
    /// # Panics
    ///
    /// Panics if the identifier is not part of this schema.
    pub fn model(&self, id: impl Into<ModelId>) -> &Model {
        &self.models[id.into().0]
    }

    pub fn model_by_name(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|model| model.name == name)
    }

    pub(crate) fn verify(&self) -> Result<()> {
        verify::apply(self)
    }
}
