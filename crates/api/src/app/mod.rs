//! HTTP API application wiring (Axum router + store wiring).
//!
//! - `services.rs`: picks and connects the post store from configuration
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use postapi_infra::PostStore;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router around an already-connected post store.
///
/// Handlers receive the store through a request extension; every request
/// gets its own storage session from it.
pub fn build_app(store: Arc<dyn PostStore>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::trace_requests))
                .layer(Extension(store)),
        )
}
