use crate::entity::Slot;

use std::any::Any;
use std::fmt;

/// Resolution state of an association field.
///
/// `Transient` holds values attached before the owner is persisted.
/// Persisting the owner moves those values into the context and replaces
/// the state with `Loaded` arena slots.
#[derive(Default)]
pub(crate) enum AssociationValue {
    /// Not resolved yet. Reading through the typed wrappers panics.
    #[default]
    Unloaded,

    /// Owned values attached prior to persist.
    Transient(Vec<Box<dyn Any + Send>>),

    /// Resolved against the persistence context.
    Loaded(Vec<Slot>),
}

impl AssociationValue {
    pub(crate) fn is_loaded(&self) -> bool {
        matches!(self, AssociationValue::Loaded(_))
    }

    pub(crate) fn is_transient(&self) -> bool {
        matches!(self, AssociationValue::Transient(_))
    }

    pub(crate) fn loaded_slots(&self) -> Option<&[Slot]> {
        match self {
            AssociationValue::Loaded(slots) => Some(slots),
            _ => None,
        }
    }

    /// Appends a transient value. Callers must not attach to a loaded
    /// association.
    pub(crate) fn attach(&mut self, value: Box<dyn Any + Send>) {
        match self {
            AssociationValue::Unloaded => *self = AssociationValue::Transient(vec![value]),
            AssociationValue::Transient(values) => values.push(value),
            AssociationValue::Loaded(_) => panic!("cannot attach to a loaded association"),
        }
    }

    /// Takes the transient values, leaving the state unloaded. Returns an
    /// empty vec for the other states.
    pub(crate) fn take_transient(&mut self) -> Vec<Box<dyn Any + Send>> {
        match std::mem::take(self) {
            AssociationValue::Transient(values) => values,
            other => {
                *self = other;
                vec![]
            }
        }
    }

    pub(crate) fn set_loaded(&mut self, slots: Vec<Slot>) {
        *self = AssociationValue::Loaded(slots);
    }
}

impl fmt::Debug for AssociationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssociationValue::Unloaded => write!(f, "<not loaded>"),
            AssociationValue::Transient(values) => write!(f, "<{} transient>", values.len()),
            AssociationValue::Loaded(slots) => slots.fmt(f),
        }
    }
}
