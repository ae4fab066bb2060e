//! # ThreadService
//!
//! Orchestrates every board operation on top of a `ThreadRepository`.
//! Each method performs at most a lookup followed by one conditional write.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    NewReply, NewThread, Reply, Thread, ThreadRepository, ThreadSummary, ThreadView, REDACTED_TEXT,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::password::passwords_match;
use crate::projection::{project_replies, UNLIMITED};

/// Window sizes used by the board listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingLimits {
    /// Threads returned per board listing.
    pub page_size: usize,
    /// Replies previewed per listed thread.
    pub reply_preview: usize,
}

impl Default for ListingLimits {
    fn default() -> Self {
        Self {
            page_size: 10,
            reply_preview: 3,
        }
    }
}

/// A stored reply together with the normalised id of its thread.
#[derive(Debug, Clone)]
pub struct PostedReply {
    pub thread_id: Uuid,
    pub reply: Reply,
}

#[derive(Clone)]
pub struct ThreadService {
    repo: Arc<dyn ThreadRepository>,
    limits: ListingLimits,
}

impl ThreadService {
    pub fn new(repo: Arc<dyn ThreadRepository>) -> Self {
        Self::with_limits(repo, ListingLimits::default())
    }

    pub fn with_limits(repo: Arc<dyn ThreadRepository>, limits: ListingLimits) -> Self {
        Self { repo, limits }
    }

    /// Stores a new thread and returns the full record, password included.
    pub async fn create_thread(&self, input: NewThread) -> ServiceResult<Thread> {
        let thread = self.repo.insert_thread(input, Utc::now()).await?;
        info!(thread_id = %thread.id, board = %thread.board, "thread created");
        Ok(thread)
    }

    /// The most recently bumped threads of a board with a short reply preview.
    pub async fn list_board(&self, board: &str) -> ServiceResult<Vec<ThreadSummary>> {
        let threads = self.repo.recent_threads(board, self.limits.page_size).await?;

        Ok(threads
            .into_iter()
            .take(self.limits.page_size)
            .map(|t| ThreadSummary {
                replies: project_replies(&t.replies, self.limits.reply_preview),
                replycount: t.replies.len(),
                id: t.id,
                board: t.board,
                text: t.text,
                created_on: t.created_on,
                bumped_on: t.bumped_on,
            })
            .collect())
    }

    /// Removes a thread once its delete password has been confirmed.
    ///
    /// The board is not consulted: the id alone identifies the thread.
    pub async fn delete_thread(&self, thread_id: &str, password: &str) -> ServiceResult<()> {
        let thread = self.load_thread(thread_id).await?;

        if !passwords_match(&thread.delete_password, password) {
            debug!(thread_id = %thread.id, "thread delete refused: password mismatch");
            return Err(ServiceError::IncorrectPassword);
        }

        if !self.repo.delete_thread(thread.id).await? {
            // removed between lookup and delete
            return Err(ServiceError::ThreadNotFound);
        }

        info!(thread_id = %thread.id, "thread deleted");
        Ok(())
    }

    /// Flags a thread for moderation. Repeating the call is harmless.
    pub async fn report_thread(&self, thread_id: &str) -> ServiceResult<()> {
        let id = parse_id(thread_id).ok_or(ServiceError::ThreadNotFound)?;

        if !self.repo.report_thread(id).await? {
            return Err(ServiceError::ThreadNotFound);
        }

        info!(thread_id = %id, "thread reported");
        Ok(())
    }

    /// Appends a reply and bumps the parent thread.
    pub async fn add_reply(&self, thread_id: &str, input: NewReply) -> ServiceResult<PostedReply> {
        let id = parse_id(thread_id).ok_or(ServiceError::ThreadNotFound)?;

        let now = Utc::now();
        let reply = input.into_reply(now);

        if !self.repo.append_reply(id, reply.clone(), now).await? {
            return Err(ServiceError::ThreadNotFound);
        }

        info!(thread_id = %id, reply_id = %reply.id, "reply added");
        Ok(PostedReply {
            thread_id: id,
            reply,
        })
    }

    /// One thread of `board` with every reply, newest first.
    pub async fn view_thread(&self, board: &str, thread_id: &str) -> ServiceResult<ThreadView> {
        let id = parse_id(thread_id).ok_or(ServiceError::ThreadNotFound)?;

        let thread = self
            .repo
            .find_thread_on_board(board, id)
            .await?
            .ok_or(ServiceError::ThreadNotFound)?;

        Ok(ThreadView {
            replies: project_replies(&thread.replies, UNLIMITED),
            id: thread.id,
            board: thread.board,
            text: thread.text,
            created_on: thread.created_on,
            bumped_on: thread.bumped_on,
        })
    }

    /// Redacts a reply's text once its delete password has been confirmed.
    /// The reply itself stays in the thread.
    pub async fn delete_reply(
        &self,
        thread_id: &str,
        reply_id: &str,
        password: &str,
    ) -> ServiceResult<()> {
        let thread = self.load_thread(thread_id).await?;
        let reply = find_reply(&thread, reply_id)?;

        if !passwords_match(&reply.delete_password, password) {
            debug!(thread_id = %thread.id, reply_id = %reply.id, "reply delete refused: password mismatch");
            return Err(ServiceError::IncorrectPassword);
        }

        if !self.repo.redact_reply(thread.id, reply.id, REDACTED_TEXT).await? {
            return Err(ServiceError::ReplyNotFound);
        }

        info!(thread_id = %thread.id, reply_id = %reply.id, "reply redacted");
        Ok(())
    }

    /// Flags a reply for moderation. Repeating the call is harmless.
    pub async fn report_reply(&self, thread_id: &str, reply_id: &str) -> ServiceResult<()> {
        let thread = self.load_thread(thread_id).await?;
        let reply = find_reply(&thread, reply_id)?;

        if !self.repo.report_reply(thread.id, reply.id).await? {
            return Err(ServiceError::ReplyNotFound);
        }

        info!(thread_id = %thread.id, reply_id = %reply.id, "reply reported");
        Ok(())
    }

    async fn load_thread(&self, thread_id: &str) -> ServiceResult<Thread> {
        let id = parse_id(thread_id).ok_or(ServiceError::ThreadNotFound)?;
        self.repo
            .find_thread(id)
            .await?
            .ok_or(ServiceError::ThreadNotFound)
    }
}

/// Client-supplied ids are normalised through `Uuid`, so casing and
/// formatting differences do not affect matching. Malformed ids match nothing.
fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

fn find_reply<'a>(thread: &'a Thread, reply_id: &str) -> ServiceResult<&'a Reply> {
    parse_id(reply_id)
        .and_then(|id| thread.reply(id))
        .ok_or(ServiceError::ReplyNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};
    use domains::{MockThreadRepository, RepositoryError};
    use mockall::predicate::eq;

    fn sample_thread(replies: usize) -> Thread {
        let created = Utc::now() - Duration::hours(1);
        Thread {
            id: Uuid::new_v4(),
            board: "test".into(),
            text: "hello".into(),
            delete_password: "pw".into(),
            created_on: created,
            bumped_on: created,
            reported: false,
            replies: (0..replies)
                .map(|i| Reply {
                    id: Uuid::new_v4(),
                    text: format!("r{i}"),
                    created_on: created + Duration::minutes(i as i64),
                    delete_password: "rp".into(),
                    reported: false,
                })
                .collect(),
        }
    }

    fn service(repo: MockThreadRepository) -> ThreadService {
        ThreadService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn create_thread_returns_stored_record() {
        let mut repo = MockThreadRepository::new();
        repo.expect_insert_thread()
            .times(1)
            .returning(|input: NewThread, now: DateTime<Utc>| {
                Ok(Thread {
                    id: Uuid::new_v4(),
                    board: input.board,
                    text: input.text,
                    delete_password: input.delete_password,
                    created_on: now,
                    bumped_on: now,
                    reported: false,
                    replies: Vec::new(),
                })
            });

        let thread = service(repo)
            .create_thread(NewThread::new("test", "hello", "pw").unwrap())
            .await
            .unwrap();

        assert_eq!(thread.board, "test");
        assert_eq!(thread.delete_password, "pw");
        assert_eq!(thread.created_on, thread.bumped_on);
        assert!(thread.replies.is_empty());
    }

    #[tokio::test]
    async fn listing_caps_previews_and_counts_all_replies() {
        let threads = vec![sample_thread(5), sample_thread(0)];
        let mut repo = MockThreadRepository::new();
        repo.expect_recent_threads()
            .with(eq("test"), eq(10usize))
            .returning(move |_, _| Ok(threads.clone()));

        let listing = service(repo).list_board("test").await.unwrap();

        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].replies.len(), 3);
        assert_eq!(listing[0].replycount, 5);
        assert_eq!(listing[0].replies[0].text, "r4");
        assert_eq!(listing[1].replycount, 0);
    }

    #[tokio::test]
    async fn listing_never_exceeds_page_size() {
        let mut repo = MockThreadRepository::new();
        repo.expect_recent_threads()
            .returning(|_, _| Ok((0..14).map(|_| sample_thread(1)).collect()));

        let listing = service(repo).list_board("test").await.unwrap();
        assert_eq!(listing.len(), 10);
    }

    #[tokio::test]
    async fn delete_thread_with_wrong_password_leaves_it() {
        let thread = sample_thread(2);
        let id = thread.id;
        let mut repo = MockThreadRepository::new();
        repo.expect_find_thread()
            .with(eq(id))
            .returning(move |_| Ok(Some(thread.clone())));
        repo.expect_delete_thread().never();

        let err = service(repo)
            .delete_thread(&id.to_string(), "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::IncorrectPassword));
    }

    #[tokio::test]
    async fn delete_thread_with_correct_password() {
        let thread = sample_thread(0);
        let id = thread.id;
        let mut repo = MockThreadRepository::new();
        repo.expect_find_thread()
            .returning(move |_| Ok(Some(thread.clone())));
        repo.expect_delete_thread()
            .with(eq(id))
            .times(1)
            .returning(|_| Ok(true));

        service(repo).delete_thread(&id.to_string(), "pw").await.unwrap();
    }

    #[tokio::test]
    async fn delete_thread_that_vanished_is_not_found() {
        let thread = sample_thread(0);
        let id = thread.id;
        let mut repo = MockThreadRepository::new();
        repo.expect_find_thread()
            .returning(move |_| Ok(Some(thread.clone())));
        repo.expect_delete_thread().returning(|_| Ok(false));

        let err = service(repo)
            .delete_thread(&id.to_string(), "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ThreadNotFound));
    }

    #[tokio::test]
    async fn malformed_thread_id_never_reaches_the_store() {
        let repo = MockThreadRepository::new();
        let svc = service(repo);

        assert!(matches!(
            svc.delete_thread("not-an-id", "pw").await,
            Err(ServiceError::ThreadNotFound)
        ));
        assert!(matches!(
            svc.report_thread("").await,
            Err(ServiceError::ThreadNotFound)
        ));
        assert!(matches!(
            svc.view_thread("test", "123").await,
            Err(ServiceError::ThreadNotFound)
        ));
    }

    #[tokio::test]
    async fn report_thread_missing_is_not_found() {
        let mut repo = MockThreadRepository::new();
        repo.expect_report_thread().returning(|_| Ok(false));

        let err = service(repo)
            .report_thread(&Uuid::new_v4().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ThreadNotFound));
    }

    #[tokio::test]
    async fn add_reply_bumps_with_reply_timestamp() {
        let id = Uuid::new_v4();
        let mut repo = MockThreadRepository::new();
        repo.expect_append_reply()
            .withf(move |tid, reply, bumped| {
                *tid == id && reply.created_on == *bumped && !reply.reported && reply.text == "r1"
            })
            .times(1)
            .returning(|_, _, _| Ok(true));

        let posted = service(repo)
            .add_reply(&id.to_string(), NewReply::new("r1", "rp").unwrap())
            .await
            .unwrap();
        assert_eq!(posted.thread_id, id);
        assert_eq!(posted.reply.delete_password, "rp");
    }

    #[tokio::test]
    async fn add_reply_normalises_thread_id() {
        let id = Uuid::new_v4();
        let mut repo = MockThreadRepository::new();
        repo.expect_append_reply()
            .withf(move |tid, _, _| *tid == id)
            .times(1)
            .returning(|_, _, _| Ok(true));

        let braced = format!("{{{}}}", id.to_string().to_uppercase());
        let posted = service(repo)
            .add_reply(&braced, NewReply::new("r1", "rp").unwrap())
            .await
            .unwrap();
        assert_eq!(posted.thread_id, id);
    }

    #[tokio::test]
    async fn add_reply_to_missing_thread() {
        let mut repo = MockThreadRepository::new();
        repo.expect_append_reply().returning(|_, _, _| Ok(false));

        let err = service(repo)
            .add_reply(&Uuid::new_v4().to_string(), NewReply::new("r1", "rp").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ThreadNotFound));
    }

    #[tokio::test]
    async fn view_thread_returns_every_reply_newest_first() {
        let thread = sample_thread(6);
        let id = thread.id;
        let mut repo = MockThreadRepository::new();
        repo.expect_find_thread_on_board()
            .with(eq("test"), eq(id))
            .returning(move |_, _| Ok(Some(thread.clone())));

        let view = service(repo).view_thread("test", &id.to_string()).await.unwrap();
        assert_eq!(view.replies.len(), 6);
        assert_eq!(view.replies[0].text, "r5");
        assert_eq!(view.replies[5].text, "r0");
    }

    #[tokio::test]
    async fn view_thread_on_other_board_is_not_found() {
        let mut repo = MockThreadRepository::new();
        repo.expect_find_thread_on_board().returning(|_, _| Ok(None));

        let err = service(repo)
            .view_thread("other", &Uuid::new_v4().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ThreadNotFound));
    }

    #[tokio::test]
    async fn delete_reply_checks_thread_then_reply_then_password() {
        let thread = sample_thread(1);
        let tid = thread.id.to_string();
        let rid = thread.replies[0].id.to_string();

        let mut missing = MockThreadRepository::new();
        missing.expect_find_thread().returning(|_| Ok(None));
        assert!(matches!(
            service(missing).delete_reply(&tid, "garbage", "rp").await,
            Err(ServiceError::ThreadNotFound)
        ));

        let mut repo = MockThreadRepository::new();
        let found = thread.clone();
        repo.expect_find_thread()
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_redact_reply().never();
        let svc = service(repo);

        assert!(matches!(
            svc.delete_reply(&tid, &Uuid::new_v4().to_string(), "rp").await,
            Err(ServiceError::ReplyNotFound)
        ));
        assert!(matches!(
            svc.delete_reply(&tid, &rid, "wrong").await,
            Err(ServiceError::IncorrectPassword)
        ));
    }

    #[tokio::test]
    async fn delete_reply_redacts_with_sentinel() {
        let thread = sample_thread(2);
        let tid = thread.id;
        let rid = thread.replies[1].id;
        let mut repo = MockThreadRepository::new();
        repo.expect_find_thread()
            .returning(move |_| Ok(Some(thread.clone())));
        repo.expect_redact_reply()
            .with(eq(tid), eq(rid), eq(REDACTED_TEXT))
            .times(1)
            .returning(|_, _, _| Ok(true));

        // uppercase ids still match
        service(repo)
            .delete_reply(&tid.to_string(), &rid.to_string().to_uppercase(), "rp")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn report_reply_needs_no_password() {
        let thread = sample_thread(1);
        let tid = thread.id;
        let rid = thread.replies[0].id;
        let mut repo = MockThreadRepository::new();
        repo.expect_find_thread()
            .returning(move |_| Ok(Some(thread.clone())));
        repo.expect_report_reply()
            .with(eq(tid), eq(rid))
            .times(1)
            .returning(|_, _| Ok(true));

        service(repo)
            .report_reply(&tid.to_string(), &rid.to_string())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn store_failures_propagate() {
        let mut repo = MockThreadRepository::new();
        repo.expect_find_thread()
            .returning(|_| Err(RepositoryError::Unavailable("pool timed out".into())));

        let err = service(repo)
            .report_reply(&Uuid::new_v4().to_string(), &Uuid::new_v4().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Store(RepositoryError::Unavailable(_))));
    }
}
