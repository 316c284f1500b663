use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use postapi_core::DomainError;
use postapi_infra::StoreError;

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound(id) => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("Post with id {id} was not found"),
        ),
        StoreError::Database(msg) => {
            tracing::error!(error = %msg, "post store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg)
        }
        DomainError::InvalidId(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg)
        }
        DomainError::NotFound(id) => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("Post with id {id} was not found"),
        ),
    }
}

/// Malformed, missing or mistyped body fields all surface as 422.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(
        StatusCode::UNPROCESSABLE_ENTITY,
        "validation_error",
        rejection.body_text(),
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use postapi_core::PostId;

    use super::*;

    #[test]
    fn store_errors_map_to_status_codes() {
        let res = store_error_to_response(StoreError::NotFound(PostId::new(3)));
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = store_error_to_response(StoreError::Database("boom".to_string()));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn domain_errors_map_to_status_codes() {
        let res = domain_error_to_response(DomainError::validation("title must not be empty"));
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let res = domain_error_to_response(DomainError::invalid_id("PostId: invalid digit"));
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let res = domain_error_to_response(DomainError::not_found(PostId::new(1)));
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = domain_error_to_response(DomainError::not_found(99_999_999_999_i64));
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
