pub mod operation;
pub use operation::Operation;

mod response;
pub use response::{Response, Rows};

use crate::{schema::Schema, Result};

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

/// A storage backend for the entity runtime.
///
/// Drivers only see whole rows addressed by key or by a single column
/// value. Everything above that, identity, lifecycle, and dirty tracking,
/// happens in the runtime.
#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Called once at build time with the resolved schema so the driver can
    /// prepare per-table storage.
    async fn register_schema(&mut self, schema: &Schema) -> Result<()>;

    /// Executes a single operation against the store.
    async fn exec(&self, schema: &Arc<Schema>, op: Operation) -> Result<Response>;
}
