mod action;
pub use action::{Action, ActionQueue, DeleteAction, InsertAction, PendingFk, UpdateAction};

pub mod context;
pub use context::PersistenceContext;

mod db;
pub use db::{Builder, Db};

mod entity;
pub use entity::{Entity, EntityKey, Managed, Slot};

mod event;
pub use event::{
    EntityEvent, EntityListener, EventKind, MergeListener, PersistListener, RemoveListener,
};

mod loader;
pub use loader::Loader;

mod persister;
pub use persister::Persister;

pub mod relation;
pub use relation::{BelongsTo, HasMany, HasOne};

pub mod schema;
pub use schema::EntityDescriptor;

mod session;
pub use session::Session;

pub use torpor_core::{Driver, Error, Result, Row, Value};
