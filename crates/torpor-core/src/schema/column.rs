use crate::Value;

/// A table column and the constraints its values must satisfy.
#[derive(Debug, Clone)]
pub struct Column {
    pub id: ColumnId,

    pub name: String,

    /// Storage type of the column.
    pub ty: Type,

    /// Whether `null` is an acceptable value.
    pub nullable: bool,

    /// Whether the store allocates the value on insert when none is given.
    pub auto: bool,
}

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Bool,
    I64,
    Text,
}

/// Uniquely identifies a column within a model.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnId(pub usize);

impl Column {
    /// Returns `true` if the column's constraints allow the value.
    pub fn accepts(&self, value: &Value) -> bool {
        match value {
            Value::Null => self.nullable,
            Value::Bool(_) => matches!(self.ty, Type::Bool),
            Value::I64(_) => matches!(self.ty, Type::I64),
            Value::String(_) => matches!(self.ty, Type::Text),
        }
    }
}

impl core::fmt::Debug for ColumnId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ColumnId({})", self.0)
    }
}
