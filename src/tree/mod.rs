//! In-memory model of a thread's replies.
//!
//! Replies form a tree (a reply's children are replies), but the store is a
//! flat id-keyed arena with parent/child indices rather than nested owning
//! pointers. That keeps ownership simple and makes the nesting bound an
//! integer check at insert time instead of a structural recursion limit.
//!
//! The tree shape is append-only from this module's point of view: a reply
//! never changes `parent_id` or `nesting_level` after insertion, and only
//! content edits (`Active -> Edited`) mutate a stored reply. Deletion and
//! locking are moderation concerns handled elsewhere.

mod sort;

pub use sort::{sort_threads, ReplySortMode, ThreadSortMode, TRENDING_VIEWS_THRESHOLD};

use std::collections::HashMap;

use chrono::Utc;
use tracing::debug;

use crate::error::InvariantViolation;
use crate::markdown;
use crate::models::{Reply, Thread, MAX_NESTING};

/// Thread-scoped reply store.
///
/// Owns the [`Thread`] (and through it the root reply id list) plus every
/// reply keyed by id. Mutated only by the composition flow's insert step
/// and by content edits.
#[derive(Debug, Clone)]
pub struct ReplyTree {
    thread: Thread,
    replies: HashMap<String, Reply>,
    children: HashMap<String, Vec<String>>,
}

impl ReplyTree {
    /// Create an empty tree for the given thread.
    pub fn new(thread: Thread) -> Self {
        Self {
            thread,
            replies: HashMap::new(),
            children: HashMap::new(),
        }
    }

    /// The thread this tree belongs to.
    pub fn thread(&self) -> &Thread {
        &self.thread
    }

    /// Insert a reply, appending it to its parent's child list (or the
    /// thread's root list).
    ///
    /// Rejects with [`InvariantViolation`] when the reply breaks a tree
    /// contract; the tree is left unchanged in every rejection case.
    pub fn insert(&mut self, reply: Reply) -> Result<(), InvariantViolation> {
        if reply.thread_id != self.thread.id {
            return Err(InvariantViolation::ThreadMismatch {
                reply_thread_id: reply.thread_id,
                tree_thread_id: self.thread.id.clone(),
            });
        }
        if reply.nesting_level > MAX_NESTING {
            return Err(InvariantViolation::NestingTooDeep {
                level: reply.nesting_level,
            });
        }
        if self.replies.contains_key(&reply.id) {
            return Err(InvariantViolation::DuplicateReply { id: reply.id });
        }

        match &reply.parent_id {
            Some(parent_id) => {
                let parent = self.replies.get(parent_id).ok_or_else(|| {
                    InvariantViolation::UnknownParent {
                        parent_id: parent_id.clone(),
                    }
                })?;
                if reply.nesting_level != parent.nesting_level + 1 {
                    return Err(InvariantViolation::LevelMismatch {
                        level: reply.nesting_level,
                        parent_level: parent.nesting_level,
                    });
                }
                self.children
                    .entry(parent_id.clone())
                    .or_default()
                    .push(reply.id.clone());
            }
            None => {
                if reply.nesting_level != 0 {
                    return Err(InvariantViolation::LevelMismatch {
                        level: reply.nesting_level,
                        parent_level: 0,
                    });
                }
                self.thread.root_reply_ids.push(reply.id.clone());
            }
        }

        debug!(reply_id = %reply.id, level = reply.nesting_level, "reply inserted");
        self.thread.reply_count += 1;
        if reply.created_at > self.thread.last_activity_at {
            self.thread.last_activity_at = reply.created_at;
        }
        self.replies.insert(reply.id.clone(), reply);
        Ok(())
    }

    /// Get a reply by id.
    pub fn get(&self, id: &str) -> Option<&Reply> {
        self.replies.get(id)
    }

    /// Direct children of a reply, in insertion order.
    ///
    /// Direct children only; walk the levels explicitly if you need the
    /// whole subtree.
    pub fn children(&self, reply_id: &str) -> Vec<&Reply> {
        self.children
            .get(reply_id)
            .map(|ids| ids.iter().filter_map(|id| self.replies.get(id)).collect())
            .unwrap_or_default()
    }

    /// Direct (level-0) replies to the thread, in insertion order.
    pub fn roots(&self) -> Vec<&Reply> {
        self.thread
            .root_reply_ids
            .iter()
            .filter_map(|id| self.replies.get(id))
            .collect()
    }

    /// Number of replies in the tree, at any level.
    pub fn len(&self) -> usize {
        self.replies.len()
    }

    /// Whether the tree has no replies.
    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }

    /// Replace a reply's content: sets `edited_at` and recomputes the
    /// rendered form wholesale. The tree shape is untouched.
    ///
    /// Returns the updated reply, or None if the id is unknown.
    pub fn edit(&mut self, id: &str, content: String) -> Option<&Reply> {
        let reply = self.replies.get_mut(id)?;
        reply.rendered_content = markdown::render(&content);
        reply.content = content;
        reply.edited_at = Some(Utc::now());
        Some(reply)
    }

    /// Reorder one sibling set by creation time.
    ///
    /// `parent_id` of None sorts the thread's root replies. Pinning does
    /// not apply here; it is a thread-list concern.
    pub fn sort_siblings(&mut self, parent_id: Option<&str>, mode: ReplySortMode) {
        let ids = match parent_id {
            Some(parent_id) => match self.children.get_mut(parent_id) {
                Some(ids) => ids,
                None => return,
            },
            None => &mut self.thread.root_reply_ids,
        };
        sort::sort_reply_ids(ids, &self.replies, mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::collections::BTreeSet;

    fn test_thread() -> Thread {
        Thread::new("t-1", "Home charging", "user-1", Utc::now(), BTreeSet::new())
    }

    fn reply(id: &str, parent: Option<&str>, level: u8) -> Reply {
        Reply {
            id: id.to_string(),
            thread_id: "t-1".to_string(),
            parent_id: parent.map(str::to_string),
            author_ref: "user-2".to_string(),
            content: format!("content of {id}"),
            rendered_content: Vec::new(),
            attachments: Vec::new(),
            created_at: Utc::now(),
            edited_at: None,
            nesting_level: level,
        }
    }

    #[test]
    fn test_insert_root_appends_to_thread() {
        let mut tree = ReplyTree::new(test_thread());
        tree.insert(reply("r-1", None, 0)).unwrap();
        tree.insert(reply("r-2", None, 0)).unwrap();

        assert_eq!(tree.thread().root_reply_ids, vec!["r-1", "r-2"]);
        assert_eq!(tree.thread().reply_count, 2);
        assert_eq!(tree.roots().len(), 2);
    }

    #[test]
    fn test_insert_child_appends_to_parent() {
        let mut tree = ReplyTree::new(test_thread());
        tree.insert(reply("r-1", None, 0)).unwrap();
        tree.insert(reply("r-2", Some("r-1"), 1)).unwrap();
        tree.insert(reply("r-3", Some("r-2"), 2)).unwrap();

        assert_eq!(tree.children("r-1").len(), 1);
        assert_eq!(tree.children("r-2")[0].id, "r-3");
        // Direct children only, not a recursive flatten
        assert_eq!(tree.children("r-1")[0].id, "r-2");
    }

    #[test]
    fn test_insert_beyond_max_nesting_rejected_tree_unchanged() {
        let mut tree = ReplyTree::new(test_thread());
        tree.insert(reply("r-1", None, 0)).unwrap();
        tree.insert(reply("r-2", Some("r-1"), 1)).unwrap();
        tree.insert(reply("r-3", Some("r-2"), 2)).unwrap();

        let err = tree.insert(reply("r-4", Some("r-3"), 3)).unwrap_err();
        assert_eq!(err, InvariantViolation::NestingTooDeep { level: 3 });
        assert_eq!(tree.len(), 3);
        assert!(tree.get("r-4").is_none());
        assert!(tree.children("r-3").is_empty());
    }

    #[test]
    fn test_level_must_match_parent() {
        let mut tree = ReplyTree::new(test_thread());
        tree.insert(reply("r-1", None, 0)).unwrap();

        let err = tree.insert(reply("r-2", Some("r-1"), 2)).unwrap_err();
        assert_eq!(
            err,
            InvariantViolation::LevelMismatch { level: 2, parent_level: 0 }
        );
    }

    #[test]
    fn test_root_level_must_be_zero() {
        let mut tree = ReplyTree::new(test_thread());
        let err = tree.insert(reply("r-1", None, 1)).unwrap_err();
        assert!(matches!(err, InvariantViolation::LevelMismatch { .. }));
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut tree = ReplyTree::new(test_thread());
        let err = tree.insert(reply("r-1", Some("ghost"), 1)).unwrap_err();
        assert_eq!(
            err,
            InvariantViolation::UnknownParent { parent_id: "ghost".to_string() }
        );
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut tree = ReplyTree::new(test_thread());
        tree.insert(reply("r-1", None, 0)).unwrap();
        let err = tree.insert(reply("r-1", None, 0)).unwrap_err();
        assert!(matches!(err, InvariantViolation::DuplicateReply { .. }));
    }

    #[test]
    fn test_wrong_thread_rejected() {
        let mut tree = ReplyTree::new(test_thread());
        let mut r = reply("r-1", None, 0);
        r.thread_id = "t-2".to_string();
        assert!(matches!(
            tree.insert(r),
            Err(InvariantViolation::ThreadMismatch { .. })
        ));
    }

    #[test]
    fn test_nesting_invariant_holds_for_all_replies() {
        let mut tree = ReplyTree::new(test_thread());
        tree.insert(reply("r-1", None, 0)).unwrap();
        tree.insert(reply("r-2", Some("r-1"), 1)).unwrap();
        tree.insert(reply("r-3", Some("r-2"), 2)).unwrap();
        tree.insert(reply("r-4", None, 0)).unwrap();

        for id in ["r-1", "r-2", "r-3", "r-4"] {
            let r = tree.get(id).unwrap();
            match &r.parent_id {
                Some(pid) => {
                    let parent = tree.get(pid).unwrap();
                    assert_eq!(r.nesting_level, parent.nesting_level + 1);
                }
                None => assert_eq!(r.nesting_level, 0),
            }
            assert!(r.nesting_level <= MAX_NESTING);
        }
    }

    #[test]
    fn test_edit_rerenders_and_marks_edited() {
        let mut tree = ReplyTree::new(test_thread());
        tree.insert(reply("r-1", None, 0)).unwrap();

        let edited = tree.edit("r-1", "now **bold**".to_string()).unwrap();
        assert!(edited.is_edited());
        assert_eq!(edited.content, "now **bold**");
        assert_eq!(edited.rendered_content, markdown::render("now **bold**"));

        // Shape untouched
        assert_eq!(tree.thread().root_reply_ids, vec!["r-1"]);
        assert!(tree.edit("ghost", "x".to_string()).is_none());
    }

    #[test]
    fn test_sort_siblings_newest_and_oldest() {
        let mut tree = ReplyTree::new(test_thread());
        let base = Utc::now();
        for (id, offset) in [("r-1", 0), ("r-2", 60), ("r-3", 30)] {
            let mut r = reply(id, None, 0);
            r.created_at = base + Duration::seconds(offset);
            tree.insert(r).unwrap();
        }

        tree.sort_siblings(None, ReplySortMode::Newest);
        assert_eq!(tree.thread().root_reply_ids, vec!["r-2", "r-3", "r-1"]);

        tree.sort_siblings(None, ReplySortMode::Oldest);
        assert_eq!(tree.thread().root_reply_ids, vec!["r-1", "r-3", "r-2"]);
    }

    #[test]
    fn test_sort_children_of_reply() {
        let mut tree = ReplyTree::new(test_thread());
        tree.insert(reply("root", None, 0)).unwrap();
        let base = Utc::now();
        for (id, offset) in [("c-1", 10), ("c-2", 5)] {
            let mut r = reply(id, Some("root"), 1);
            r.created_at = base + Duration::seconds(offset);
            tree.insert(r).unwrap();
        }

        tree.sort_siblings(Some("root"), ReplySortMode::Oldest);
        let children: Vec<&str> = tree.children("root").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(children, vec!["c-2", "c-1"]);
    }
}
