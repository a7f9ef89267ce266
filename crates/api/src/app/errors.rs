use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use tradepost_core::DomainError;
use tradepost_store::StoreError;

use crate::app::services::AppError;

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": message.into(),
        })),
    )
        .into_response()
}

pub fn app_error_to_response(err: AppError) -> axum::response::Response {
    match err {
        AppError::Domain(e) => domain_error_to_response(&e),
        AppError::Store(e) => store_error_to_response(&e),
        AppError::InvalidCredentials => {
            json_error(StatusCode::BAD_REQUEST, "Invalid credentials")
        }
        AppError::ProductNotFound => json_error(StatusCode::NOT_FOUND, "Product not found"),
        AppError::Internal(detail) => {
            tracing::error!(error = %detail, "internal error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

pub fn domain_error_to_response(err: &DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, msg.clone()),
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, err.to_string()),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, err.to_string()),
        DomainError::Unauthorized => json_error(StatusCode::UNAUTHORIZED, err.to_string()),
    }
}

pub fn store_error_to_response(err: &StoreError) -> axum::response::Response {
    match err {
        StoreError::EmailTaken => json_error(StatusCode::BAD_REQUEST, err.to_string()),
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, err.to_string()),
        StoreError::Backend(detail) => {
            tracing::error!(error = %detail, "storage error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}
