use crate::schema::EntityDescriptor;

use torpor_core::{schema::ModelId, Value};

use std::fmt;
use std::marker::PhantomData;

/// A type that can be managed by a session.
///
/// `Default` provides the blank instance that loaded rows are written into;
/// association fields start out unloaded.
pub trait Entity: Default + Send + Sized + 'static {
    /// The static column and association mapping for this type. Consumed
    /// once, at registration.
    fn descriptor() -> EntityDescriptor<Self>;
}

/// Index of an entity in a session's arena.
///
/// Slots are handed out sequentially and never reused, so a slot whose
/// entity was evicted stays invalid instead of aliasing a newer entity.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot(pub(crate) usize);

impl Slot {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({})", self.0)
    }
}

/// A typed handle to an entity managed by a session.
///
/// Handles are small and copyable; the session owns the instance. Access
/// goes through [`Session::get`](crate::Session::get) and
/// [`Session::get_mut`](crate::Session::get_mut). A handle is only
/// meaningful to the session that produced it.
pub struct Managed<M> {
    slot: Slot,
    _entity: PhantomData<fn() -> M>,
}

impl<M> Managed<M> {
    pub(crate) fn new(slot: Slot) -> Managed<M> {
        Managed {
            slot,
            _entity: PhantomData,
        }
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }
}

impl<M> Clone for Managed<M> {
    fn clone(&self) -> Managed<M> {
        *self
    }
}

impl<M> Copy for Managed<M> {}

impl<M> PartialEq for Managed<M> {
    fn eq(&self, other: &Managed<M>) -> bool {
        self.slot == other.slot
    }
}

impl<M> Eq for Managed<M> {}

impl<M> fmt::Debug for Managed<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = std::any::type_name::<M>();
        let name = full.rsplit("::").next().unwrap_or(full);
        write!(f, "Managed<{}>({})", name, self.slot.0)
    }
}

/// Identity of a managed entity: its model plus its primary key value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub model: ModelId,
    pub key: Value,
}
