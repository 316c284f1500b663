use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::Utc;

use postapi_core::{Post, PostDraft, PostId};

use super::r#trait::{PostStore, StoreError};

#[derive(Debug)]
struct State {
    last_id: i32,
    posts: BTreeMap<PostId, Post>,
}

/// In-memory post store for tests/dev.
///
/// Ids start at 1 and are never reused, matching a `SERIAL` column. `list`
/// returns posts in id order.
#[derive(Debug)]
pub struct InMemoryPostStore {
    inner: RwLock<State>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(State {
                last_id: 0,
                posts: BTreeMap::new(),
            }),
        }
    }
}

impl Default for InMemoryPostStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Database("in-memory post store lock poisoned".to_string())
}

#[async_trait::async_trait]
impl PostStore for InMemoryPostStore {
    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let state = self.inner.read().map_err(poisoned)?;
        Ok(state.posts.values().cloned().collect())
    }

    async fn get(&self, id: PostId) -> Result<Post, StoreError> {
        let state = self.inner.read().map_err(poisoned)?;
        state.posts.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn create(&self, draft: PostDraft) -> Result<Post, StoreError> {
        let mut state = self.inner.write().map_err(poisoned)?;
        let next = state
            .last_id
            .checked_add(1)
            .ok_or_else(|| StoreError::Database("post id sequence exhausted".to_string()))?;
        state.last_id = next;

        let post = Post {
            id: PostId::new(next),
            title: draft.title.into_inner(),
            content: draft.content,
            published: draft.published,
            created_at: Utc::now(),
        };
        state.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: PostId, draft: PostDraft) -> Result<Post, StoreError> {
        let mut state = self.inner.write().map_err(poisoned)?;
        let post = state.posts.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        post.replace_with(draft);
        Ok(post.clone())
    }

    async fn delete(&self, id: PostId) -> Result<(), StoreError> {
        let mut state = self.inner.write().map_err(poisoned)?;
        state
            .posts
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}
