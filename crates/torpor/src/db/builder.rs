use super::{Db, Shared};
use crate::{
    event::Listeners,
    schema::registry::{EntityVtable, Registry},
    Entity,
};

use torpor_core::{
    schema::{self, ModelId},
    Driver, Result,
};

use std::sync::Arc;

/// Registers entity types and builds the shared [`Db`] handle.
#[derive(Debug, Default)]
pub struct Builder {
    schema: schema::Builder,
    vtables: Vec<EntityVtable>,
}

impl Builder {
    /// Registers an entity type by consuming its descriptor. Registration
    /// order assigns model identifiers.
    pub fn register<M: Entity>(&mut self) -> &mut Self {
        let model = ModelId(self.vtables.len());
        let (def, vtable) = M::descriptor().erase(model);
        self.schema.model(def);
        self.vtables.push(vtable);
        self
    }

    /// Resolves and verifies the schema, registers it with the driver, and
    /// returns the database handle.
    pub async fn build(&mut self, mut driver: Box<dyn Driver>) -> Result<Db> {
        let schema = self.schema.build()?;
        let vtables = std::mem::take(&mut self.vtables);

        debug_assert!(
            schema
                .models
                .iter()
                .zip(&vtables)
                .all(|(model, vtable)| model.id == vtable.model),
            "schema and registry disagree on model order"
        );

        let schema = Arc::new(schema);
        driver.register_schema(&schema).await?;

        Ok(Db {
            shared: Arc::new(Shared {
                schema,
                registry: Arc::new(Registry::new(vtables)),
                driver: Arc::from(driver),
                listeners: Arc::new(Listeners::default()),
            }),
        })
    }
}
