use super::AssociationValue;
use crate::{Entity, Managed};

use std::fmt;
use std::marker::PhantomData;

/// A to-one association whose foreign key lives on the target model.
pub struct HasOne<T> {
    value: AssociationValue,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> HasOne<T> {
    pub fn new() -> HasOne<T> {
        HasOne::default()
    }

    /// Sets the value to be persisted together with the owner, replacing
    /// any previously attached value.
    ///
    /// # Panics
    ///
    /// Panics if the association has already been resolved.
    #[track_caller]
    pub fn set(&mut self, value: T) {
        if self.value.is_loaded() {
            panic!("cannot attach to a loaded association");
        }
        self.value = AssociationValue::Unloaded;
        self.value.attach(Box::new(value));
    }

    pub fn is_loaded(&self) -> bool {
        self.value.is_loaded()
    }

    /// Handle for the resolved value, or `None` if no target row exists.
    ///
    /// # Panics
    ///
    /// Panics if the association is not loaded.
    #[track_caller]
    pub fn get(&self) -> Option<Managed<T>> {
        let slots = self.value.loaded_slots().expect("association not loaded");
        slots.first().copied().map(Managed::new)
    }

    pub(crate) fn raw(&self) -> &AssociationValue {
        &self.value
    }

    pub(crate) fn raw_mut(&mut self) -> &mut AssociationValue {
        &mut self.value
    }
}

impl<T> Default for HasOne<T> {
    fn default() -> Self {
        Self {
            value: AssociationValue::Unloaded,
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for HasOne<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}
