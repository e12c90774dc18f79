use super::Error;
use crate::Value;

/// Error when a second entity instance is registered under an identity that
/// is already mapped.
#[derive(Debug)]
pub(super) struct DuplicateIdentityError {
    model: Box<str>,
    key: Value,
}

impl std::error::Error for DuplicateIdentityError {}

impl core::fmt::Display for DuplicateIdentityError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "duplicate identity: model={} key={:?}",
            self.model, self.key
        )
    }
}

impl Error {
    /// Creates a duplicate identity error for the given model name and key.
    pub fn duplicate_identity(model: impl Into<String>, key: Value) -> Error {
        Error::from(super::ErrorKind::DuplicateIdentity(DuplicateIdentityError {
            model: model.into().into(),
            key,
        }))
    }

    /// Returns `true` if this error is a duplicate identity error.
    pub fn is_duplicate_identity(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::DuplicateIdentity(_))
    }
}
