mod builder;
pub use builder::Builder;

use crate::{event::Listeners, schema::Registry, Session};

use torpor_core::{schema::Schema, Driver};

use std::sync::Arc;

/// Shared handle to a configured database.
///
/// Holds the verified schema, the per-type accessor registry, and the
/// driver. Cloning is cheap; every clone opens sessions against the same
/// store.
#[derive(Debug, Clone)]
pub struct Db {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    schema: Arc<Schema>,
    registry: Arc<Registry>,
    driver: Arc<dyn Driver>,
    listeners: Arc<Listeners>,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Opens a unit of work. Each session carries its own persistence
    /// context; nothing is shared between sessions except the store.
    pub fn session(&self) -> Session {
        Session::new(
            self.shared.schema.clone(),
            self.shared.registry.clone(),
            self.shared.driver.clone(),
            self.shared.listeners.clone(),
        )
    }

    pub fn schema(&self) -> &Schema {
        &self.shared.schema
    }
}
