//! # Handlers
//!
//! Coordinates the flow between HTTP requests and `ThreadService`.

pub mod replies;
pub mod system;
pub mod threads;
