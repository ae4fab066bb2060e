//! # In-memory store
//!
//! Process-local implementation of `ThreadRepository`. Each thread is one
//! map entry and every mutation happens under that entry's lock, which gives
//! the same per-thread atomicity as the database adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use domains::{NewThread, RepoResult, Reply, Thread, ThreadRepository};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct InMemoryThreadRepository {
    threads: DashMap<Uuid, Thread>,
}

impl InMemoryThreadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no board holds any thread.
    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    fn with_reply<F>(&self, thread_id: Uuid, reply_id: Uuid, f: F) -> bool
    where
        F: FnOnce(&mut Reply),
    {
        let Some(mut thread) = self.threads.get_mut(&thread_id) else {
            return false;
        };
        match thread.replies.iter_mut().find(|r| r.id == reply_id) {
            Some(reply) => {
                f(reply);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ThreadRepository for InMemoryThreadRepository {
    async fn insert_thread(&self, thread: NewThread, now: DateTime<Utc>) -> RepoResult<Thread> {
        let stored = Thread {
            id: Uuid::new_v4(),
            board: thread.board,
            text: thread.text,
            delete_password: thread.delete_password,
            created_on: now,
            bumped_on: now,
            reported: false,
            replies: Vec::new(),
        };
        self.threads.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn recent_threads(&self, board: &str, limit: usize) -> RepoResult<Vec<Thread>> {
        let mut threads: Vec<Thread> = self
            .threads
            .iter()
            .filter(|entry| entry.board == board)
            .map(|entry| entry.value().clone())
            .collect();
        threads.sort_by(|a, b| b.bumped_on.cmp(&a.bumped_on));
        threads.truncate(limit);
        Ok(threads)
    }

    async fn find_thread(&self, id: Uuid) -> RepoResult<Option<Thread>> {
        Ok(self.threads.get(&id).map(|t| t.value().clone()))
    }

    async fn find_thread_on_board(&self, board: &str, id: Uuid) -> RepoResult<Option<Thread>> {
        Ok(self
            .threads
            .get(&id)
            .filter(|t| t.board == board)
            .map(|t| t.value().clone()))
    }

    async fn delete_thread(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.threads.remove(&id).is_some())
    }

    async fn report_thread(&self, id: Uuid) -> RepoResult<bool> {
        Ok(match self.threads.get_mut(&id) {
            Some(mut thread) => {
                thread.reported = true;
                true
            }
            None => false,
        })
    }

    async fn append_reply(
        &self,
        thread_id: Uuid,
        reply: Reply,
        bumped_on: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let Some(mut thread) = self.threads.get_mut(&thread_id) else {
            return Ok(false);
        };
        thread.bumped_on = bumped_on.max(thread.created_on);
        thread.replies.push(reply);
        Ok(true)
    }

    async fn redact_reply(&self, thread_id: Uuid, reply_id: Uuid, text: &str) -> RepoResult<bool> {
        Ok(self.with_reply(thread_id, reply_id, |reply| reply.text = text.to_string()))
    }

    async fn report_reply(&self, thread_id: Uuid, reply_id: Uuid) -> RepoResult<bool> {
        Ok(self.with_reply(thread_id, reply_id, |reply| reply.reported = true))
    }
}
