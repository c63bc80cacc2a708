//! Voltboard discussion engine.
//!
//! The core of the Voltboard EV community platform's threaded discussions:
//!
//! - [`markdown`] — pure markdown-to-structured-content rendering
//! - [`attachments`] — upload, temporary association, and re-association
//!   of files attached before their owning post exists
//! - [`tree`] — the reply tree with bounded nesting
//! - [`compose`] — draft state and the submission flow tying it together
//!
//! The REST backend is reached only through the [`traits`] seam;
//! [`adapters`] holds the production reqwest implementation and recording
//! mocks for tests. Authentication, moderation, and presentation live
//! outside this crate.

pub mod adapters;
pub mod attachments;
pub mod compose;
pub mod error;
pub mod markdown;
pub mod models;
pub mod traits;
pub mod tree;
