mod descriptor;
pub use descriptor::EntityDescriptor;

pub(crate) mod registry;
pub(crate) use registry::Registry;

pub use torpor_core::schema::{Fetch, Type};
