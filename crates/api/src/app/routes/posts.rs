use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use postapi_core::PostId;
use postapi_infra::PostStore;

use crate::app::{dto, errors};

pub async fn list_posts(Extension(store): Extension<Arc<dyn PostStore>>) -> axum::response::Response {
    match store.list().await {
        Ok(posts) => (StatusCode::OK, Json(dto::PostListResponse { posts })).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_post(
    Extension(store): Extension<Arc<dyn PostStore>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PostId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match store.get(id).await {
        Ok(post) => (StatusCode::OK, Json(dto::PostDetailResponse { post })).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_post(
    Extension(store): Extension<Arc<dyn PostStore>>,
    body: Result<Json<dto::PostRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let draft = match body.into_draft() {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match store.create(draft).await {
        Ok(post) => {
            tracing::info!(post_id = %post.id, "post created");
            (StatusCode::CREATED, Json(post)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Full replace: title, content and published are all taken from the body.
pub async fn update_post(
    Extension(store): Extension<Arc<dyn PostStore>>,
    Path(id): Path<String>,
    body: Result<Json<dto::PostRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let draft = match body.into_draft() {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };
    // Body errors win over an id that cannot exist.
    let id: PostId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match store.update(id, draft).await {
        Ok(post) => {
            tracing::info!(post_id = %post.id, "post updated");
            (StatusCode::OK, Json(post)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_post(
    Extension(store): Extension<Arc<dyn PostStore>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PostId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match store.delete(id).await {
        Ok(()) => {
            tracing::info!(post_id = %id, "post deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
