//! # Domain Errors
//!
//! Failures raised at the domain boundary. Infrastructure crates map their
//! own error types into `RepositoryError` so that nothing above the ports
//! depends on a particular driver.

use thiserror::Error;

/// Rejected input, raised before anything reaches the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field: {field}")]
    Missing { field: &'static str },
}

/// Failure of the underlying persistence call.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Connection or pool failure (e.g., DB down, acquire timeout)
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected or failed a query
    #[error("store query failed: {0}")]
    Query(String),

    /// A stored value could not be mapped back to a domain model
    #[error("corrupt record: {0}")]
    Corrupt(String),
}
