use thiserror::Error;

use crate::models::MAX_NESTING;

/// A reply-tree contract violation at insert time.
///
/// These indicate the caller offered an affordance it should not have (for
/// example a reply button on a maximally nested reply), not a user mistake.
/// The tree is left unchanged when an insert is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// The reply's nesting level exceeds [`MAX_NESTING`].
    #[error("nesting level {level} exceeds the maximum of {MAX_NESTING}")]
    NestingTooDeep { level: u8 },

    /// The reply's nesting level is not parent level + 1 (or 0 for roots).
    #[error("nesting level {level} does not match parent level {parent_level}")]
    LevelMismatch { level: u8, parent_level: u8 },

    /// The named parent reply is not in the tree.
    #[error("parent reply {parent_id} not found")]
    UnknownParent { parent_id: String },

    /// A reply with this id is already in the tree.
    #[error("reply {id} already inserted")]
    DuplicateReply { id: String },

    /// The reply belongs to a different thread than the tree.
    #[error("reply belongs to thread {reply_thread_id}, tree holds {tree_thread_id}")]
    ThreadMismatch {
        reply_thread_id: String,
        tree_thread_id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nesting_message_includes_bound() {
        let err = InvariantViolation::NestingTooDeep { level: 3 };
        assert!(err.to_string().contains('3'));
        assert!(err.to_string().contains('2'));
    }
}
