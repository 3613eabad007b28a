use std::sync::Arc;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::errors::ApiError;
use crate::models::api_response::{ApiResponse, Meta, UserPayload};
use crate::time::to_iso_string;
use crate::validators::{last_path_segment, require_username};
use crate::{ApiStyle, AppState};

pub const GITHUB_USER_ROUTE: &str = "/api/github";


#[derive(Debug, Deserialize)]
pub struct GithubUserViewModel {
    username: Option<String>,
}

// OPTIONS never gets here in the edge style, the CORS layer answers it.
#[axum_macros::debug_handler]
pub async fn get_user(
    method: Method,
    uri: Uri,
    State(state): State<Arc<AppState>>,
    query: Option<Query<GithubUserViewModel>>,
) -> Result<Response, ApiError> {
    if method != Method::GET {
        return Err(ApiError::MethodNotAllowed);
    }

    let from_path = last_path_segment(uri.path(), GITHUB_USER_ROUTE);
    let from_query = match state.style {
        ApiStyle::Node => query.and_then(|Query(vm)| vm.username),
        ApiStyle::Edge => None,
    };
    let username = require_username([from_path, from_query])?;

    let fetched = state.github_user_service.get_by_username(&username).await?;
    let body = ApiResponse::success(UserPayload {
        user: fetched.user,
        meta: Meta {
            cached: state.github_user_service.is_cached(&username).await,
            timestamp: to_iso_string(state.clock.now()),
        },
    });

    Ok((StatusCode::OK, Json(body)).into_response())
}
