//! Reply projection: the client-visible window over a thread's replies.

use domains::{Reply, ReplyView};

/// Passing this as the limit copies every reply.
pub const UNLIMITED: usize = 0;

/// Shapes `replies` into at most `limit` views, newest first.
///
/// Ordering is descending by `created_on`; replies with equal timestamps keep
/// their store order. Passwords and report flags are dropped.
pub fn project_replies(replies: &[Reply], limit: usize) -> Vec<ReplyView> {
    if replies.is_empty() {
        return Vec::new();
    }

    let mut ordered: Vec<&Reply> = replies.iter().collect();
    // `sort_by` is stable, ties stay in append order
    ordered.sort_by(|a, b| b.created_on.cmp(&a.created_on));

    let take = if limit == UNLIMITED { ordered.len() } else { limit };
    ordered.into_iter().take(take).map(ReplyView::from).collect()
}
