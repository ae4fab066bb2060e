//! Request bodies and query strings.
//!
//! Every field is optional at this layer so that a missing value becomes a
//! board answer (validation error, "no such thread exists", ...) rather than
//! a framework rejection.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct CreateThreadBody {
    pub board: Option<String>,
    pub text: Option<String>,
    pub delete_password: Option<String>,
}

/// Body of thread delete and thread report. `board` is accepted but unused.
#[derive(Debug, Default, Deserialize)]
pub struct ThreadActionBody {
    pub board: Option<String>,
    pub thread_id: Option<String>,
    pub delete_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateReplyBody {
    pub board: Option<String>,
    pub thread_id: Option<String>,
    pub text: Option<String>,
    pub delete_password: Option<String>,
}

/// Body of reply delete and reply report.
#[derive(Debug, Default, Deserialize)]
pub struct ReplyActionBody {
    pub board: Option<String>,
    pub thread_id: Option<String>,
    pub reply_id: Option<String>,
    pub delete_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ThreadQuery {
    pub thread_id: Option<String>,
}

/// The path segment names the board; the body field is only a fallback.
pub fn resolve_board(path: String, body: Option<String>) -> String {
    if path.trim().is_empty() {
        body.unwrap_or_default()
    } else {
        path
    }
}
