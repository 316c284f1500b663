//! `postapi-core`: the post domain model.
//!
//! This crate contains **pure domain** types (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod post;

pub use error::{DomainError, DomainResult};
pub use id::PostId;
pub use post::{Post, PostDraft, Title};
