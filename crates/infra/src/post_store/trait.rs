use std::sync::Arc;

use thiserror::Error;

use postapi_core::{Post, PostDraft, PostId};

/// Post store operation error.
///
/// `NotFound` is the only failure callers are expected to handle; everything
/// else is a storage fault surfaced as-is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Post with id {0} was not found")]
    NotFound(PostId),

    #[error("database error: {0}")]
    Database(String),
}

/// CRUD gateway over the `posts` table.
///
/// Each call is one unit of work: implementations acquire a session, run the
/// operation, commit, and release the session before returning, on success
/// and on failure alike. Nothing is shared between calls except the
/// underlying pool.
///
/// `update` and `delete` on an id that does not exist fail with
/// [`StoreError::NotFound`] and leave storage untouched.
#[async_trait::async_trait]
pub trait PostStore: Send + Sync {
    /// All posts. Order is backend-defined.
    async fn list(&self) -> Result<Vec<Post>, StoreError>;

    async fn get(&self, id: PostId) -> Result<Post, StoreError>;

    /// Insert a new row; storage assigns `id` and `created_at`.
    async fn create(&self, draft: PostDraft) -> Result<Post, StoreError>;

    /// Replace title, content and published of an existing row.
    async fn update(&self, id: PostId, draft: PostDraft) -> Result<Post, StoreError>;

    async fn delete(&self, id: PostId) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<S> PostStore for Arc<S>
where
    S: PostStore + ?Sized,
{
    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        (**self).list().await
    }

    async fn get(&self, id: PostId) -> Result<Post, StoreError> {
        (**self).get(id).await
    }

    async fn create(&self, draft: PostDraft) -> Result<Post, StoreError> {
        (**self).create(draft).await
    }

    async fn update(&self, id: PostId, draft: PostDraft) -> Result<Post, StoreError> {
        (**self).update(id, draft).await
    }

    async fn delete(&self, id: PostId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }
}
