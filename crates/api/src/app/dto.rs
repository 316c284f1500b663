use serde::{Deserialize, Serialize};

use postapi_core::{DomainResult, Post, PostDraft};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /` and `PUT /posts/{id}`. All three fields are required.
#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub title: String,
    pub content: String,
    pub published: bool,
}

impl PostRequest {
    pub fn into_draft(self) -> DomainResult<PostDraft> {
        PostDraft::new(self.title, self.content, self.published)
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<Post>,
}

#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    #[serde(rename = "post detail")]
    pub post: Post,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_requires_every_field() {
        let err = serde_json::from_str::<PostRequest>(r#"{"title":"A","content":"B"}"#).unwrap_err();
        assert!(err.to_string().contains("published"));

        let err = serde_json::from_str::<PostRequest>(r#"{"title":"A","content":"B","published":"yes"}"#)
            .unwrap_err();
        assert!(err.is_data());
    }

    #[test]
    fn empty_title_fails_draft_validation() {
        let req = PostRequest {
            title: " ".to_string(),
            content: "B".to_string(),
            published: false,
        };
        assert!(req.into_draft().is_err());
    }

    #[test]
    fn detail_response_uses_spaced_key() {
        let post = Post {
            id: 1.into(),
            title: "A".to_string(),
            content: "B".to_string(),
            published: false,
            created_at: "2024-01-01T00:00:00Z".parse().unwrap(),
        };
        let json = serde_json::to_value(PostDetailResponse { post }).unwrap();
        assert_eq!(json["post detail"]["id"], 1);
        assert_eq!(json["post detail"]["title"], "A");
    }
}
