use torpor_core::Row;

/// An immutable capture of an entity's column values.
///
/// Taken when an entity enters the context and replaced after each
/// successful write. Dirty checking compares the snapshot against freshly
/// read values; the snapshot itself never changes in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    row: Row,
}

impl Snapshot {
    pub fn from_row(row: Row) -> Snapshot {
        Snapshot { row }
    }

    pub fn row(&self) -> &Row {
        &self.row
    }

    /// Returns `true` if the captured values match `row`.
    pub fn matches(&self, row: &Row) -> bool {
        self.row == *row
    }
}
