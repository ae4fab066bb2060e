//! # PostgreSQL store
//!
//! Maps the relational model (`threads` plus an owned `replies` table) to
//! the domain models. Reply order is the insertion sequence, so reading a
//! thread back yields replies in append order.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{NewThread, RepoResult, Reply, RepositoryError, Thread, ThreadRepository};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

/// Connection parameters for `PgThreadRepository::connect`.
#[derive(Debug, Clone)]
pub struct PostgresOptions {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

pub struct PgThreadRepository {
    pool: PgPool,
}

impl PgThreadRepository {
    /// Opens the pool and creates the schema if needed.
    pub async fn connect(options: &PostgresOptions) -> RepoResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect(&options.url)
            .await
            .map_err(store_error)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| RepositoryError::Unavailable(format!("migration failed: {e}")))?;

        info!(max_connections = options.max_connections, "postgres store ready");
        Ok(Self { pool })
    }

    async fn replies_of(&self, thread_ids: &[Uuid]) -> RepoResult<Vec<(Uuid, Reply)>> {
        let rows = sqlx::query(
            "SELECT thread_id, id, text, created_on, delete_password, reported \
             FROM replies WHERE thread_id = ANY($1) ORDER BY seq ASC",
        )
        .bind(thread_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.iter()
            .map(|row| Ok((row.try_get("thread_id")?, reply_from_row(row)?)))
            .collect::<Result<_, sqlx::Error>>()
            .map_err(corrupt)
    }

    /// Loads the replies of `threads` in one query and attaches them.
    async fn attach_replies(&self, mut threads: Vec<Thread>) -> RepoResult<Vec<Thread>> {
        if threads.is_empty() {
            return Ok(threads);
        }

        let ids: Vec<Uuid> = threads.iter().map(|t| t.id).collect();
        for (thread_id, reply) in self.replies_of(&ids).await? {
            if let Some(thread) = threads.iter_mut().find(|t| t.id == thread_id) {
                thread.replies.push(reply);
            }
        }
        Ok(threads)
    }

    async fn find_one(&self, row: Option<PgRow>) -> RepoResult<Option<Thread>> {
        let Some(row) = row else {
            return Ok(None);
        };
        let thread = thread_from_row(&row).map_err(corrupt)?;
        Ok(self.attach_replies(vec![thread]).await?.pop())
    }
}

#[async_trait]
impl ThreadRepository for PgThreadRepository {
    async fn insert_thread(&self, thread: NewThread, now: DateTime<Utc>) -> RepoResult<Thread> {
        let row = sqlx::query(
            "INSERT INTO threads (board, text, delete_password, created_on, bumped_on, reported) \
             VALUES ($1, $2, $3, $4, $4, FALSE) \
             RETURNING id, board, text, delete_password, created_on, bumped_on, reported",
        )
        .bind(&thread.board)
        .bind(&thread.text)
        .bind(&thread.delete_password)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        thread_from_row(&row).map_err(corrupt)
    }

    async fn recent_threads(&self, board: &str, limit: usize) -> RepoResult<Vec<Thread>> {
        let rows = sqlx::query(
            "SELECT id, board, text, delete_password, created_on, bumped_on, reported \
             FROM threads WHERE board = $1 ORDER BY bumped_on DESC LIMIT $2",
        )
        .bind(board)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        let threads = rows
            .iter()
            .map(thread_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(corrupt)?;
        self.attach_replies(threads).await
    }

    async fn find_thread(&self, id: Uuid) -> RepoResult<Option<Thread>> {
        let row = sqlx::query(
            "SELECT id, board, text, delete_password, created_on, bumped_on, reported \
             FROM threads WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        self.find_one(row).await
    }

    async fn find_thread_on_board(&self, board: &str, id: Uuid) -> RepoResult<Option<Thread>> {
        let row = sqlx::query(
            "SELECT id, board, text, delete_password, created_on, bumped_on, reported \
             FROM threads WHERE id = $1 AND board = $2",
        )
        .bind(id)
        .bind(board)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        self.find_one(row).await
    }

    async fn delete_thread(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM threads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn report_thread(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("UPDATE threads SET reported = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected() > 0)
    }

    /// The bump and the insert run as one statement: the insert only happens
    /// when the update matched a thread.
    async fn append_reply(
        &self,
        thread_id: Uuid,
        reply: Reply,
        bumped_on: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            "WITH bumped AS ( \
                 UPDATE threads SET bumped_on = GREATEST($2, created_on) WHERE id = $1 RETURNING id \
             ) \
             INSERT INTO replies (id, thread_id, text, created_on, delete_password, reported) \
             SELECT $3, bumped.id, $4, $5, $6, $7 FROM bumped",
        )
        .bind(thread_id)
        .bind(bumped_on)
        .bind(reply.id)
        .bind(&reply.text)
        .bind(reply.created_on)
        .bind(&reply.delete_password)
        .bind(reply.reported)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn redact_reply(&self, thread_id: Uuid, reply_id: Uuid, text: &str) -> RepoResult<bool> {
        let result = sqlx::query("UPDATE replies SET text = $3 WHERE thread_id = $1 AND id = $2")
            .bind(thread_id)
            .bind(reply_id)
            .bind(text)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn report_reply(&self, thread_id: Uuid, reply_id: Uuid) -> RepoResult<bool> {
        let result =
            sqlx::query("UPDATE replies SET reported = TRUE WHERE thread_id = $1 AND id = $2")
                .bind(thread_id)
                .bind(reply_id)
                .execute(&self.pool)
                .await
                .map_err(store_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("postgres store closed");
    }
}

fn thread_from_row(row: &PgRow) -> Result<Thread, sqlx::Error> {
    Ok(Thread {
        id: row.try_get("id")?,
        board: row.try_get("board")?,
        text: row.try_get("text")?,
        delete_password: row.try_get("delete_password")?,
        created_on: row.try_get("created_on")?,
        bumped_on: row.try_get("bumped_on")?,
        reported: row.try_get("reported")?,
        replies: Vec::new(),
    })
}

fn reply_from_row(row: &PgRow) -> Result<Reply, sqlx::Error> {
    Ok(Reply {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        created_on: row.try_get("created_on")?,
        delete_password: row.try_get("delete_password")?,
        reported: row.try_get("reported")?,
    })
}

fn store_error(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Unavailable(err.to_string())
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

fn corrupt(err: sqlx::Error) -> RepositoryError {
    RepositoryError::Corrupt(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{NewReply, REDACTED_TEXT};

    async fn repo() -> Option<PgThreadRepository> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let options = PostgresOptions {
            url,
            max_connections: 2,
            acquire_timeout: Duration::from_secs(5),
        };
        Some(PgThreadRepository::connect(&options).await.expect("connect"))
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a disposable database"]
    async fn reply_lifecycle_round_trip() {
        let Some(repo) = repo().await else { return };
        let now = Utc::now();
        let board = format!("it-{}", Uuid::new_v4());

        let thread = repo
            .insert_thread(NewThread::new(board.as_str(), "hello", "pw").unwrap(), now)
            .await
            .unwrap();
        assert_eq!(thread.created_on, thread.bumped_on);

        let first = NewReply::new("r1", "rp").unwrap().into_reply(now);
        let second = NewReply::new("r2", "rp").unwrap().into_reply(now);
        assert!(repo.append_reply(thread.id, first.clone(), now).await.unwrap());
        assert!(repo.append_reply(thread.id, second.clone(), now).await.unwrap());
        assert!(!repo.append_reply(Uuid::new_v4(), second.clone(), now).await.unwrap());

        assert!(repo.redact_reply(thread.id, first.id, REDACTED_TEXT).await.unwrap());
        assert!(repo.report_reply(thread.id, first.id).await.unwrap());
        assert!(repo.report_thread(thread.id).await.unwrap());

        let stored = repo
            .find_thread_on_board(&board, thread.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.reported);
        assert_eq!(stored.replies.len(), 2);
        assert_eq!(stored.replies[0].id, first.id);
        assert!(stored.replies[0].is_redacted());
        assert!(stored.replies[0].reported);
        assert_eq!(stored.replies[1].text, "r2");

        let listed = repo.recent_threads(&board, 10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].replies.len(), 2);

        assert!(repo.delete_thread(thread.id).await.unwrap());
        assert!(repo.find_thread(thread.id).await.unwrap().is_none());
        repo.close().await;
    }
}
