//! Error types for the discussion engine.
//!
//! The taxonomy follows how failures propagate through a submission:
//!
//! - [`ValidationError`] — rejected before any network effect, always
//!   recoverable by the author
//! - [`UploadError`] — a single file failed to upload; siblings and the
//!   submission itself continue
//! - [`BindFailure`] — a single file failed to associate with its owner
//!   after creation; reported as a warning, the attachment is orphaned
//! - [`CreationError`] — the post/reply itself failed to persist; fatal to
//!   the attempt, draft and pending attachments are preserved for retry
//! - [`InvariantViolation`] — a tree-contract violation (nesting beyond the
//!   bound, inconsistent parent links); a programming error, not a
//!   user-facing condition
//!
//! Transport-level errors (`ApiError`) live in [`crate::traits`] next to
//! the collaborator traits that raise them.

mod attachment;
mod submission;
mod tree;
mod validation;

pub use attachment::{AttachmentError, BindFailure, UploadError};
pub use submission::{CreationError, SubmissionError};
pub use tree::InvariantViolation;
pub use validation::ValidationError;
