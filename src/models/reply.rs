use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::markdown::RenderedNode;

use super::AttachmentRef;

/// Maximum nesting level for replies.
///
/// Level 0 is a direct reply to the thread; a reply to a level-2 reply
/// would be level 3 and is refused everywhere in the crate.
pub const MAX_NESTING: u8 = 2;

/// A response to a thread or to another reply.
///
/// A reply owns its rendered content (derived from `content`, recomputed
/// wholesale on every edit) and exclusively owns its attachment references.
/// The tree shape is append-only: `parent_id` and `nesting_level` never
/// change after insertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reply {
    /// Unique identifier assigned by the backend
    pub id: String,
    /// Thread this reply belongs to
    pub thread_id: String,
    /// Parent reply id, absent for direct replies to the thread
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Reference to the authoring user (opaque to this crate)
    pub author_ref: String,
    /// Raw markdown source as the author typed it
    pub content: String,
    /// Rendered form of `content`, produced by the markdown pipeline
    #[serde(default)]
    pub rendered_content: Vec<RenderedNode>,
    /// Attachments bound to this reply, in upload order
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
    /// When the reply was created
    pub created_at: DateTime<Utc>,
    /// Set when the content has been edited after creation
    #[serde(default)]
    pub edited_at: Option<DateTime<Utc>>,
    /// Depth below the thread: 0 for direct replies
    pub nesting_level: u8,
}

impl Reply {
    /// Whether the reply has been edited since creation.
    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    /// Whether the UI may offer a "reply" affordance on this reply.
    ///
    /// False once the reply sits at [`MAX_NESTING`], since a child would
    /// exceed the depth bound.
    pub fn can_reply_to(&self) -> bool {
        self.nesting_level < MAX_NESTING
    }

    /// Nesting level for a child of the given parent (0 when replying to
    /// the thread itself).
    pub fn level_below(parent: Option<&Reply>) -> u8 {
        match parent {
            Some(p) => p.nesting_level.saturating_add(1),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply_at_level(level: u8) -> Reply {
        Reply {
            id: format!("r-{level}"),
            thread_id: "t-1".to_string(),
            parent_id: if level == 0 { None } else { Some(format!("r-{}", level - 1)) },
            author_ref: "user-1".to_string(),
            content: "Some content".to_string(),
            rendered_content: Vec::new(),
            attachments: Vec::new(),
            created_at: Utc::now(),
            edited_at: None,
            nesting_level: level,
        }
    }

    #[test]
    fn test_can_reply_below_max_nesting() {
        assert!(reply_at_level(0).can_reply_to());
        assert!(reply_at_level(1).can_reply_to());
    }

    #[test]
    fn test_cannot_reply_at_max_nesting() {
        assert!(!reply_at_level(MAX_NESTING).can_reply_to());
    }

    #[test]
    fn test_level_below_parent() {
        let parent = reply_at_level(1);
        assert_eq!(Reply::level_below(Some(&parent)), 2);
        assert_eq!(Reply::level_below(None), 0);
    }

    #[test]
    fn test_is_edited() {
        let mut reply = reply_at_level(0);
        assert!(!reply.is_edited());
        reply.edited_at = Some(Utc::now());
        assert!(reply.is_edited());
    }
}
