use torpor_core::{Error, Result};

/// Lifecycle state of a managed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    /// The entity and its eager associations are being read into the
    /// context.
    Loading,

    /// Tracked, with a snapshot to diff against.
    Managed,

    /// A write for this entity is in flight.
    Saving,

    /// Scheduled for removal; identity already surrendered.
    Deleted,

    /// Removed from the store. Terminal.
    Gone,
}

/// Tracks the lifecycle state of one managed entity.
///
/// Transitions only move forward: `Loading -> Managed`,
/// `Managed <-> Saving`, `Managed -> Deleted -> Gone`. Entities entering
/// the context through a write start at `Saving` and reach `Managed`
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityEntry {
    state: EntityState,
}

impl EntityEntry {
    /// Entry for an entity being read from the store.
    pub fn loading() -> EntityEntry {
        EntityEntry {
            state: EntityState::Loading,
        }
    }

    /// Entry for an entity entering the context through a write.
    pub fn saving() -> EntityEntry {
        EntityEntry {
            state: EntityState::Saving,
        }
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    /// Moves to `to`, failing if the state machine forbids it.
    pub fn transition(&mut self, to: EntityState) -> Result<()> {
        use EntityState::*;

        let allowed = matches!(
            (self.state, to),
            (Loading, Managed)
                | (Saving, Managed)
                | (Managed, Saving)
                | (Managed, Deleted)
                | (Deleted, Gone)
        );

        if !allowed {
            return Err(Error::illegal_state_transition(self.state.name(), to.name()));
        }

        self.state = to;
        Ok(())
    }
}

impl EntityState {
    fn name(&self) -> &'static str {
        match self {
            EntityState::Loading => "Loading",
            EntityState::Managed => "Managed",
            EntityState::Saving => "Saving",
            EntityState::Deleted => "Deleted",
            EntityState::Gone => "Gone",
        }
    }
}
