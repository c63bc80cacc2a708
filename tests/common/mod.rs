//! Common test utilities for integration tests.
//!
//! Reusable fixtures for exercising the engine against the recording mock
//! collaborator.

use std::collections::BTreeSet;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;

use voltboard::adapters::mock::MockApi;
use voltboard::compose::Composer;
use voltboard::models::Thread;
use voltboard::traits::UploadFile;
use voltboard::tree::ReplyTree;

/// A composer over a fresh mock, plus a handle to the mock for scripting
/// and verification.
pub fn composer() -> (Composer<MockApi>, MockApi) {
    let api = MockApi::new();
    (Composer::new(Arc::new(api.clone())), api)
}

/// An empty tree for a plain unlocked thread.
pub fn empty_tree() -> ReplyTree {
    ReplyTree::new(Thread::new(
        "t-1",
        "Best home chargers in 2024",
        "user-1",
        Utc::now(),
        BTreeSet::new(),
    ))
}

/// A small but genuine PNG payload (magic bytes plus filler).
pub fn png_file(name: &str) -> UploadFile {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.resize(256, 0);
    UploadFile {
        filename: name.to_string(),
        mime_type: "image/png".to_string(),
        bytes: Bytes::from(data),
    }
}

/// A non-image file for general post attachments.
pub fn pdf_file(name: &str) -> UploadFile {
    UploadFile {
        filename: name.to_string(),
        mime_type: "application/pdf".to_string(),
        bytes: Bytes::from_static(b"%PDF-1.4 minimal"),
    }
}
