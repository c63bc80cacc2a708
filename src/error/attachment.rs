use thiserror::Error;

use crate::traits::ApiError;

use super::ValidationError;

/// A single file's upload failed.
///
/// Upload failures never abort sibling uploads or the submission; the
/// failed file is simply absent from the final attachment list.
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    /// The storage collaborator rejected or dropped the upload.
    #[error("upload failed: {0}")]
    Api(#[from] ApiError),

    /// The author removed the attachment while the upload was in flight.
    #[error("upload cancelled")]
    Cancelled,
}

/// Failure to enqueue or complete a single attachment upload.
#[derive(Debug, Clone, Error)]
pub enum AttachmentError {
    /// The file violated a constraint of its upload context.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The upload itself failed.
    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// A single file that could not be associated with its real owner.
///
/// Collected per file during `bind`; surfaced as a non-fatal warning next
/// to an otherwise-successful submission. The attachment is orphaned and
/// left for the external garbage collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindFailure {
    /// Id of the attachment that failed to bind
    pub attachment_id: String,
    /// Human-readable reason, for logging and author-facing warnings
    pub reason: String,
}

impl std::fmt::Display for BindFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "attachment {} failed to bind: {}", self.attachment_id, self.reason)
    }
}
