//! Per-context upload constraints.
//!
//! What a file may be depends on where it is being attached: general post
//! attachments are permissive, inline images on replies and thread images
//! are restricted to actual image content with tighter size and count
//! limits.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::traits::UploadFile;

const MB: u64 = 1024 * 1024;

/// Where an upload is headed, which decides its constraints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UploadContext {
    /// General attachment on a post: any type, 10 MB, unbounded count
    PostAttachment,
    /// Inline image on a reply: image content, 5 MB, at most 3 per reply
    ReplyImage,
    /// Thread image: image content, 5 MB, at most 5 per thread
    ThreadImage,
}

impl UploadContext {
    /// Per-file size limit in bytes.
    pub fn max_size_bytes(&self) -> u64 {
        match self {
            UploadContext::PostAttachment => 10 * MB,
            UploadContext::ReplyImage | UploadContext::ThreadImage => 5 * MB,
        }
    }

    /// File-count limit per owner, if any.
    pub fn max_count(&self) -> Option<usize> {
        match self {
            UploadContext::PostAttachment => None,
            UploadContext::ReplyImage => Some(3),
            UploadContext::ThreadImage => Some(5),
        }
    }

    /// Whether only image content is accepted.
    pub fn requires_image(&self) -> bool {
        matches!(self, UploadContext::ReplyImage | UploadContext::ThreadImage)
    }

    /// Entity type reported to the storage collaborator.
    pub fn entity_type(&self) -> &'static str {
        match self {
            UploadContext::PostAttachment => "post",
            UploadContext::ReplyImage => "reply",
            UploadContext::ThreadImage => "thread",
        }
    }
}

/// Check one file against its context, given how many live attachments the
/// owner already has.
///
/// A violation fails only this file; callers keep sibling uploads going.
pub(crate) fn validate_file(
    context: UploadContext,
    file: &UploadFile,
    current_count: usize,
) -> Result<(), ValidationError> {
    if let Some(limit) = context.max_count() {
        if current_count >= limit {
            return Err(ValidationError::TooManyAttachments {
                filename: file.filename.clone(),
                limit,
            });
        }
    }

    if file.size_bytes() > context.max_size_bytes() {
        return Err(ValidationError::FileTooLarge {
            filename: file.filename.clone(),
            size_bytes: file.size_bytes(),
            limit_bytes: context.max_size_bytes(),
        });
    }

    if context.requires_image() {
        if !file.mime_type.starts_with("image/") {
            return Err(ValidationError::UnsupportedFileType {
                filename: file.filename.clone(),
                mime_type: file.mime_type.clone(),
            });
        }
        // Declared type is not enough: sniff the magic bytes
        if image::guess_format(&file.bytes).is_err() {
            return Err(ValidationError::NotAnImage {
                filename: file.filename.clone(),
            });
        }
    }

    Ok(())
}
