use super::AssociationValue;
use crate::{Entity, Managed};

use std::fmt;
use std::marker::PhantomData;

/// A to-many association whose foreign key lives on the target model.
pub struct HasMany<T> {
    value: AssociationValue,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> HasMany<T> {
    pub fn new() -> HasMany<T> {
        HasMany::default()
    }

    /// Attaches a value to be persisted together with the owner.
    ///
    /// # Panics
    ///
    /// Panics if the association has already been resolved.
    #[track_caller]
    pub fn attach(&mut self, value: T) {
        if self.value.is_loaded() {
            panic!("cannot attach to a loaded association");
        }
        self.value.attach(Box::new(value));
    }

    pub fn is_loaded(&self) -> bool {
        self.value.is_loaded()
    }

    /// Handles for the resolved values.
    ///
    /// # Panics
    ///
    /// Panics if the association is not loaded.
    #[track_caller]
    pub fn get(&self) -> Vec<Managed<T>> {
        self.try_get().expect("association not loaded")
    }

    pub fn try_get(&self) -> Option<Vec<Managed<T>>> {
        let slots = self.value.loaded_slots()?;
        Some(slots.iter().copied().map(Managed::new).collect())
    }

    pub(crate) fn raw(&self) -> &AssociationValue {
        &self.value
    }

    pub(crate) fn raw_mut(&mut self) -> &mut AssociationValue {
        &mut self.value
    }
}

impl<T> Default for HasMany<T> {
    fn default() -> Self {
        Self {
            value: AssociationValue::Unloaded,
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for HasMany<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}
