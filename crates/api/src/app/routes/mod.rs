use axum::{routing::get, Router};

pub mod posts;
pub mod system;

/// Router for the public endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/", get(system::root).post(posts::create_post))
        .route("/posts", get(posts::list_posts))
        .route("/posts/", get(posts::list_posts))
        .route(
            "/posts/:id",
            get(posts::get_post).put(posts::update_post).delete(posts::delete_post),
        )
}
