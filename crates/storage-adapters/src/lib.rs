//! # storage-adapters
//!
//! Implementations of the `ThreadRepository` port.
//!
//! - `memory`: always compiled, used for development and HTTP tests.
//! - `postgres`: enabled by the `db-postgres` feature.

pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::InMemoryThreadRepository;

#[cfg(feature = "db-postgres")]
pub use postgres::{PgThreadRepository, PostgresOptions};
