use crate::Row;

/// The result of a driver operation.
#[derive(Debug, Clone)]
pub struct Response {
    pub rows: Rows,
}

/// Rows returned by an operation.
#[derive(Debug, Clone)]
pub enum Rows {
    /// Number of rows affected by a write.
    Count(u64),

    /// Rows produced by a read.
    Values(Vec<Row>),
}

impl Response {
    pub fn count(count: u64) -> Response {
        Response {
            rows: Rows::Count(count),
        }
    }

    pub fn values(rows: Vec<Row>) -> Response {
        Response {
            rows: Rows::Values(rows),
        }
    }

    pub fn empty() -> Response {
        Response::values(vec![])
    }
}

impl Rows {
    pub fn is_count(&self) -> bool {
        matches!(self, Rows::Count(_))
    }

    pub fn is_values(&self) -> bool {
        matches!(self, Rows::Values(_))
    }

    /// Consumes the rows, returning the affected-row count.
    ///
    /// # Panics
    ///
    /// Panics if the rows hold values.
    #[track_caller]
    pub fn into_count(self) -> u64 {
        match self {
            Rows::Count(count) => count,
            Rows::Values(_) => panic!("rows hold values, not a count"),
        }
    }

    /// Consumes the rows, returning the produced values.
    ///
    /// # Panics
    ///
    /// Panics if the rows hold a count.
    #[track_caller]
    pub fn into_values(self) -> Vec<Row> {
        match self {
            Rows::Values(rows) => rows,
            Rows::Count(_) => panic!("rows hold a count, not values"),
        }
    }
}
