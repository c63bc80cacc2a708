//! Mock collaborators for testing.

mod api;

pub use api::{MockApi, RecordedUpload};
