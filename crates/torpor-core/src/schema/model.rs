use super::{Column, ColumnId, Relation, RelationId};

/// A registered entity type and its table mapping.
#[derive(Debug, Clone)]
pub struct Model {
    pub id: ModelId,

    /// Entity type name, e.g. `Person`.
    pub name: String,

    /// Name of the backing table.
    pub table: String,

    /// Columns in row order.
    pub columns: Vec<Column>,

    /// The column holding the primary key.
    pub primary_key: ColumnId,

    /// Associations declared on this model.
    pub relations: Vec<Relation>,
}

/// Uniquely identifies a model within a schema.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModelId(pub usize);

impl Model {
    /// Returns the column with the given identifier.
    ///
    /// # Panics
    ///
    /// Panics if the identifier is not part of this model.
    pub fn column(&self, id: impl Into<ColumnId>) -> &Column {
        &self.columns[id.into().0]
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn primary_key_column(&self) -> &Column {
        self.column(self.primary_key)
    }

    /// Returns the relation with the given identifier.
    ///
    /// # Panics
    ///
    /// Panics if the identifier is not part of this model.
    pub fn relation(&self, id: impl Into<RelationId>) -> &Relation {
        &self.relations[id.into().0]
    }

    pub fn relation_by_name(&self, name: &str) -> Option<&Relation> {
        self.relations.iter().find(|relation| relation.name == name)
    }

    /// Relations resolved as part of loading this model.
    pub fn eager_relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.iter().filter(|relation| relation.is_eager())
    }
}

impl core::fmt::Debug for ModelId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ModelId({})", self.0)
    }
}
