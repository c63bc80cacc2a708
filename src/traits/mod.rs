//! Trait abstractions for the backend collaborators.
//!
//! The discussion engine never talks to the backend directly; it goes
//! through these traits so tests can inject mocks and the production
//! adapter stays swappable.

mod api;

pub use api::{
    ApiError, CreatePostRequest, CreatedPost, FileApi, FileMetadata, PostApi, UploadFile,
    UploadedFile,
};
