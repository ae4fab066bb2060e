//! # domains
//!
//! Entities, validation rules and port definitions for the message board.
//! No I/O happens in this crate.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::*;
pub use models::*;
pub use ports::*;
