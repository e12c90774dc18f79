use super::Error;

/// Error when an entity lifecycle operation is applied in the wrong state.
#[derive(Debug)]
pub(super) struct IllegalStateError {
    kind: IllegalStateKind,
}

#[derive(Debug)]
enum IllegalStateKind {
    /// A lifecycle transition the state machine does not permit.
    Transition {
        from: &'static str,
        to: &'static str,
    },
    /// An operation on a handle that no longer points at a managed entity.
    NotManaged { context: Box<str> },
}

impl std::error::Error for IllegalStateError {}

impl core::fmt::Display for IllegalStateError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match &self.kind {
            IllegalStateKind::Transition { from, to } => {
                write!(f, "illegal state transition: {} to {}", from, to)
            }
            IllegalStateKind::NotManaged { context } => {
                write!(f, "entity is not managed: {}", context)
            }
        }
    }
}

impl Error {
    /// Creates an error for a lifecycle transition the state machine forbids.
    pub fn illegal_state_transition(from: &'static str, to: &'static str) -> Error {
        Error::from(super::ErrorKind::IllegalState(IllegalStateError {
            kind: IllegalStateKind::Transition { from, to },
        }))
    }

    /// Creates an error for an operation against an entity that is not
    /// managed by the session.
    pub fn not_managed(context: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::IllegalState(IllegalStateError {
            kind: IllegalStateKind::NotManaged {
                context: context.into().into(),
            },
        }))
    }

    /// Returns `true` if this error is a forbidden lifecycle transition.
    pub fn is_illegal_state_transition(&self) -> bool {
        matches!(
            self.kind(),
            super::ErrorKind::IllegalState(IllegalStateError {
                kind: IllegalStateKind::Transition { .. },
            })
        )
    }

    /// Returns `true` if this error is an operation on an unmanaged entity.
    pub fn is_not_managed(&self) -> bool {
        matches!(
            self.kind(),
            super::ErrorKind::IllegalState(IllegalStateError {
                kind: IllegalStateKind::NotManaged { .. },
            })
        )
    }
}
