//! # services
//!
//! Board operations, reply projection and password checks, expressed only
//! in terms of the `domains` ports.

pub mod error;
pub mod password;
pub mod projection;
pub mod thread_service;

pub use error::{ServiceError, ServiceResult};
pub use password::passwords_match;
pub use projection::{project_replies, UNLIMITED};
pub use thread_service::{ListingLimits, PostedReply, ThreadService};
