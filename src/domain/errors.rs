use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0} not found")]
    NotFound(String),
    /// Lines whose listing could not be covered even after borrowing from
    /// sibling pharmacies. Sorted ascending, without duplicates.
    #[error("Insufficient stock for lines {line_ids:?}")]
    InsufficientStock { line_ids: Vec<i64> },
    #[error("Internal error: {0}")]
    Internal(String),
}
