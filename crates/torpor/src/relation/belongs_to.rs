use super::AssociationValue;
use crate::{Entity, Managed};

use std::fmt;
use std::marker::PhantomData;

/// The owning side of an association: this model carries the foreign key.
///
/// A belongs-to is resolved from the foreign key column; it never cascades
/// on persist. Assign the foreign key field directly to point an entity at
/// a different parent.
pub struct BelongsTo<T> {
    value: AssociationValue,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> BelongsTo<T> {
    pub fn new() -> BelongsTo<T> {
        BelongsTo::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.value.is_loaded()
    }

    /// Handle for the resolved parent, or `None` if the foreign key is
    /// `null`.
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

impl<T> Default for BelongsTo<T> {
    fn default() -> Self {
        Self {
            value: AssociationValue::Unloaded,
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for BelongsTo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}
