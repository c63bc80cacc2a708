use thiserror::Error;

/// Input rejected before any network call.
///
/// Each variant names the file or limit involved so the author can be told
/// exactly what to fix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Content is empty after trimming whitespace.
    #[error("content must not be empty")]
    EmptyContent,

    /// A new thread needs a title.
    #[error("title must not be empty")]
    EmptyTitle,

    /// Reply content below the minimum length.
    #[error("content is too short ({len} characters, minimum {min})")]
    ContentTooShort { len: usize, min: usize },

    /// Reply content above the maximum length.
    #[error("content is too long ({len} characters, maximum {max})")]
    ContentTooLong { len: usize, max: usize },

    /// A file exceeds the per-file size limit of its upload context.
    #[error("{filename}: {size_bytes} bytes exceeds the {limit_bytes} byte limit")]
    FileTooLarge {
        filename: String,
        size_bytes: u64,
        limit_bytes: u64,
    },

    /// A file's MIME type is not accepted by its upload context.
    #[error("{filename}: type {mime_type} is not accepted here")]
    UnsupportedFileType { filename: String, mime_type: String },

    /// A file declared an image type but does not contain image data.
    #[error("{filename}: file does not contain image data")]
    NotAnImage { filename: String },

    /// The upload context's file-count limit is already reached.
    #[error("{filename}: attachment limit of {limit} files reached")]
    TooManyAttachments { filename: String, limit: usize },
}
