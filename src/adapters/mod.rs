//! Concrete implementations of the collaborator traits.
//!
//! `RestApi` is the production adapter; `mock` provides recording test
//! doubles with scriptable failures.

pub mod mock;
mod rest;

pub use rest::RestApi;
