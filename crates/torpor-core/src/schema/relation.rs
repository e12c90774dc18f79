use super::{ColumnId, ModelId};

/// An association between two models.
#[derive(Debug, Clone)]
pub struct Relation {
    pub id: RelationId,

    pub name: String,

    /// The model on the other side of the association.
    pub target: ModelId,

    pub kind: RelationKind,

    pub fetch: Fetch,
}

/// Shape of an association and where its foreign key lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Any number of target rows carry a foreign key referencing this
    /// model's primary key. The column identifier is scoped to the target.
    HasMany { foreign_key: ColumnId },

    /// At most one target row carries a foreign key referencing this model's
    /// primary key. The column identifier is scoped to the target.
    HasOne { foreign_key: ColumnId },

    /// This model carries a foreign key referencing the target's primary
    /// key. The column identifier is scoped to this model.
    BelongsTo { foreign_key: ColumnId },
}

/// When association values are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    /// Resolved as part of loading the owner.
    Eager,
    /// Resolved on first access.
    Lazy,
}

/// Uniquely identifies a relation within a model.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationId(pub usize);

impl Relation {
    pub fn is_eager(&self) -> bool {
        matches!(self.fetch, Fetch::Eager)
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self.fetch, Fetch::Lazy)
    }

    /// The foreign key column, on whichever side the kind places it.
    pub fn foreign_key(&self) -> ColumnId {
        match self.kind {
            RelationKind::HasMany { foreign_key } => foreign_key,
            RelationKind::HasOne { foreign_key } => foreign_key,
            RelationKind::BelongsTo { foreign_key } => foreign_key,
        }
    }
}

impl core::fmt::Debug for RelationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "RelationId({})", self.0)
    }
}
