//! The post entity and the client-submitted draft it is created/replaced from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::PostId;

/// Non-empty post title (surrounding whitespace is not counted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Title(String);

impl Title {
    pub fn parse(raw: impl Into<String>) -> DomainResult<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(DomainError::validation("title must not be empty"));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// The three mutable fields of a post, as submitted on create and update.
///
/// Update is a full replace: every field of the stored row is overwritten
/// with the draft's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: Title,
    pub content: String,
    pub published: bool,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>, published: bool) -> DomainResult<Self> {
        Ok(Self {
            title: Title::parse(title)?,
            content: content.into(),
            published,
        })
    }
}

/// A stored post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Overwrite the mutable fields; `id` and `created_at` are kept.
    pub fn replace_with(&mut self, draft: PostDraft) {
        self.title = draft.title.into_inner();
        self.content = draft.content;
        self.published = draft.published;
    }
}
