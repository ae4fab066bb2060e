//! # Ports
//!
//! Any storage adapter must implement these traits to be used by the binary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::RepositoryError;
use crate::models::{NewThread, Reply, Thread};

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Data persistence contract for threads and their replies.
///
/// Every mutating method is a single atomic operation on one thread. Methods
/// returning `bool` report whether a record matched.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ThreadRepository: Send + Sync {
    /// Stores a new thread with an empty reply list; the store assigns the id.
    async fn insert_thread(&self, thread: NewThread, now: DateTime<Utc>) -> RepoResult<Thread>;

    /// Threads of one board, most recently bumped first.
    async fn recent_threads(&self, board: &str, limit: usize) -> RepoResult<Vec<Thread>>;

    async fn find_thread(&self, id: Uuid) -> RepoResult<Option<Thread>>;

    /// Like `find_thread`, but only matches when the thread lives on `board`.
    async fn find_thread_on_board(&self, board: &str, id: Uuid) -> RepoResult<Option<Thread>>;

    async fn delete_thread(&self, id: Uuid) -> RepoResult<bool>;

    async fn report_thread(&self, id: Uuid) -> RepoResult<bool>;

    /// Appends `reply` and sets the thread's `bumped_on` in one operation.
    async fn append_reply(
        &self,
        thread_id: Uuid,
        reply: Reply,
        bumped_on: DateTime<Utc>,
    ) -> RepoResult<bool>;

    /// Overwrites the text of one reply, leaving every other field untouched.
    async fn redact_reply(&self, thread_id: Uuid, reply_id: Uuid, text: &str) -> RepoResult<bool>;

    async fn report_reply(&self, thread_id: Uuid, reply_id: Uuid) -> RepoResult<bool>;

    /// Releases connections. Called once on shutdown.
    async fn close(&self) {}
}
