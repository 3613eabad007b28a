use std::sync::Arc;
use axum::extract::State;
use axum::http::{header::HOST, HeaderMap};
use axum::response::Html;
use serde::Serialize;

use crate::errors::ApiError;
use crate::AppState;


#[derive(Debug, Serialize)]
struct IndexViewModel {
    api_url: String,
    example_url: String,
}

pub async fn get_index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Html<String>, ApiError> {
    let origin = headers
        .get(HOST)
        .and_then(|host| host.to_str().ok())
        .map(|host| format!("http://{}", host))
        .unwrap_or_default();
    let vm = IndexViewModel {
        api_url: format!("{}/api/github/{{username}}", origin),
        example_url: format!("{}/api/github/octocat", origin),
    };

    let data = super::TemplateViewModel {
        title: "GitHub User Info API".into(),
        body: state.registry.render("index", &vm).map_err(|e| ApiError::Internal(e.to_string()))?,
    };

    let r = state.registry.render("template", &data).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Html(r))
}
