use thiserror::Error;

use crate::traits::ApiError;

use super::{InvariantViolation, ValidationError};

/// The post or reply itself failed to persist.
///
/// Fatal to the submission attempt: nothing is inserted into the tree and
/// all pending attachments stay pending so the author can retry with the
/// draft intact.
#[derive(Debug, Clone, Error)]
pub enum CreationError {
    /// The create collaborator returned an error.
    #[error("post creation failed: {0}")]
    Api(#[from] ApiError),

    /// The thread is locked and accepts no new replies.
    #[error("thread {thread_id} is locked")]
    ThreadLocked { thread_id: String },
}

/// Why a submission attempt did not produce a reply.
///
/// A failed submission never drops the author's typed content; the caller
/// keeps the draft for retry in every variant.
#[derive(Debug, Clone, Error)]
pub enum SubmissionError {
    /// Rejected before any network effect.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The tree contract would be violated (for example, a reply to a
    /// maximally nested reply). Also rejected before any network effect.
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    /// The create call failed after validation passed.
    #[error(transparent)]
    Creation(#[from] CreationError),
}
