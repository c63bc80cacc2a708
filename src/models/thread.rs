use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A top-level discussion post that owns zero or more replies.
///
/// Threads are created through the composition flow and mutated by
/// moderation collaborators (pin/lock). The reply subsystem itself only
/// appends to `root_reply_ids` and keeps the activity counters current.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Thread {
    /// Unique identifier assigned by the backend
    pub id: String,
    /// Thread title
    pub title: String,
    /// Reference to the authoring user (opaque to this crate)
    pub author_ref: String,
    /// When the thread was created
    pub created_at: DateTime<Utc>,
    /// Pinned threads always sort before unpinned ones
    #[serde(default)]
    pub is_pinned: bool,
    /// Locked threads accept no new replies
    #[serde(default)]
    pub is_locked: bool,
    /// Topic tags, deduplicated and ordered
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Ids of direct (level-0) replies, in insertion order
    #[serde(default)]
    pub root_reply_ids: Vec<String>,
    /// Total number of replies, at any nesting level
    #[serde(default)]
    pub reply_count: u32,
    /// Number of times the thread has been viewed
    #[serde(default)]
    pub view_count: u64,
    /// Timestamp of the most recent reply (thread creation time if none)
    #[serde(default = "Utc::now")]
    pub last_activity_at: DateTime<Utc>,
}

impl Thread {
    /// Create a thread as returned from a successful create call.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        author_ref: impl Into<String>,
        created_at: DateTime<Utc>,
        tags: BTreeSet<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author_ref: author_ref.into(),
            created_at,
            is_pinned: false,
            is_locked: false,
            tags,
            root_reply_ids: Vec::new(),
            reply_count: 0,
            view_count: 0,
            last_activity_at: created_at,
        }
    }
}
