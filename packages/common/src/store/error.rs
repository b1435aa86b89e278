use thiserror::Error;

/// Errors reported by a [`BatchesStore`](super::BatchesStore).
///
/// The `Display` output is the bare cause; callers prefix their own context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No row matched the lookup.
    #[error("{0} not found")]
    NotFound(String),
    /// The database rejected or failed the query.
    #[error("{0}")]
    Database(String),
    /// Any other backend failure.
    #[error("{0}")]
    Backend(String),
}
