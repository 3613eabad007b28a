use serde::Serialize;

use super::github_user::GithubUser;


#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse { status: "success", data }
    }
}

#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub user: GithubUser,
    pub meta: Meta,
}

#[derive(Debug, Serialize)]
pub struct Meta {
    /// Whether the key is cached once the fetch has completed, so a
    /// just-fetched user reports true as well.
    pub cached: bool,
    pub timestamp: String,
}

/// Body of every non-2xx response. Client errors only carry `error`;
/// server errors add `status` and `message`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn client(error: &str) -> Self {
        ErrorResponse { status: None, error: error.into(), message: None }
    }

    pub fn server(error: &str, message: &str) -> Self {
        ErrorResponse {
            status: Some("error"),
            error: error.into(),
            message: Some(message.into()),
        }
    }
}
