//! # Domain Models
//!
//! These structs represent the core entities of the message board.
//! A `Thread` owns its `Reply` list exclusively; replies have no identity
//! outside their parent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ValidationError;

/// Text written over a reply when its author deletes it.
pub const REDACTED_TEXT: &str = "[deleted]";

/// A top-level post on a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub board: String,
    pub text: String,
    pub delete_password: String,
    pub created_on: DateTime<Utc>,
    /// The timestamp used for sorting threads by activity
    pub bumped_on: DateTime<Utc>,
    pub reported: bool,
    /// Store append order.
    pub replies: Vec<Reply>,
}

impl Thread {
    /// Finds a reply by its identifier.
    pub fn reply(&self, id: Uuid) -> Option<&Reply> {
        self.replies.iter().find(|r| r.id == id)
    }
}

/// A comment attached to exactly one thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    pub created_on: DateTime<Utc>,
    pub delete_password: String,
    pub reported: bool,
}

impl Reply {
    pub fn is_redacted(&self) -> bool {
        self.text == REDACTED_TEXT
    }
}

/// Validated input for a thread that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewThread {
    pub board: String,
    pub text: String,
    pub delete_password: String,
}

impl NewThread {
    pub fn new(
        board: impl Into<String>,
        text: impl Into<String>,
        delete_password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            board: required("board", board.into())?,
            text: required("text", text.into())?,
            delete_password: required("delete_password", delete_password.into())?,
        })
    }
}

/// Validated input for a reply that has not been appended yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReply {
    pub text: String,
    pub delete_password: String,
}

impl NewReply {
    pub fn new(
        text: impl Into<String>,
        delete_password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            text: required("text", text.into())?,
            delete_password: required("delete_password", delete_password.into())?,
        })
    }

    /// Stamps the input with a fresh identifier and creation time.
    pub fn into_reply(self, created_on: DateTime<Utc>) -> Reply {
        Reply {
            id: Uuid::new_v4(),
            text: self.text,
            created_on,
            delete_password: self.delete_password,
            reported: false,
        }
    }
}

fn required(field: &'static str, value: String) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Missing { field });
    }
    Ok(value)
}

/// Client-visible reply: no password, no report flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    pub created_on: DateTime<Utc>,
}

impl From<&Reply> for ReplyView {
    fn from(reply: &Reply) -> Self {
        Self {
            id: reply.id,
            text: reply.text.clone(),
            created_on: reply.created_on,
        }
    }
}

/// One entry of a board listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub board: String,
    pub text: String,
    pub created_on: DateTime<Utc>,
    pub bumped_on: DateTime<Utc>,
    pub replies: Vec<ReplyView>,
    /// Total replies before the preview was truncated.
    pub replycount: usize,
}

/// A single thread with its full, redacted reply list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub board: String,
    pub text: String,
    pub created_on: DateTime<Utc>,
    pub bumped_on: DateTime<Utc>,
    pub replies: Vec<ReplyView>,
}
