use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::clients::github_api_client::GithubApiError;
use crate::models::api_response::ErrorResponse;


#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Username is required")]
    MissingUsername,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("User not found")]
    UserNotFound,

    #[error("Internal server error")]
    Internal(String),
}

// Upstream detail is only logged; every failure reads as an unknown user.
impl From<GithubApiError> for ApiError {
    fn from(_: GithubApiError) -> Self {
        ApiError::UserNotFound
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = self.to_string();
        let (status, body) = match &self {
            ApiError::MissingUsername => (StatusCode::BAD_REQUEST, ErrorResponse::client(&error)),
            ApiError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, ErrorResponse::client(&error)),
            ApiError::UserNotFound => (StatusCode::NOT_FOUND, ErrorResponse::client(&error)),
            ApiError::Internal(detail) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::server(&error, detail))
            }
        };

        (status, Json(body)).into_response()
    }
}
