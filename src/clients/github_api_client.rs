use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::models::github_user::GithubUser;

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";
const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));


#[derive(Debug, Clone, PartialEq, Error)]
pub enum GithubApiError {
    #[error("GitHub user not found")]
    NotFound,

    #[error("GitHub API unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to deserialize GitHub user: {0}")]
    Decode(String),
}

/// Upstream user lookup. One call is one request, no retries.
#[async_trait]
pub trait GithubApi: Send + Sync {
    async fn get_user(&self, username: &str) -> Result<GithubUser, GithubApiError>;
}

pub struct GithubApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GithubApiClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(APP_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(GITHUB_API_VERSION));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(GithubApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|token| !token.is_empty()),
        })
    }

    pub fn user_url(&self, username: &str) -> String {
        format!("{}/users/{}", self.base_url, urlencoding::encode(username))
    }
}

#[async_trait]
impl GithubApi for GithubApiClient {
    async fn get_user(&self, username: &str) -> Result<GithubUser, GithubApiError> {
        let url = self.user_url(username);
        log::info!("Making request to {}...", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GithubApiError::Unavailable(e.to_string()))?;

        if let Some(remaining) = response.headers().get("x-ratelimit-remaining") {
            log::debug!("GitHub rate limit remaining: {:?}", remaining);
        }

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GithubApiError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("{:?}", status);
            log::error!("{:?}", body);
            return Err(GithubApiError::Unavailable(format!("GitHub responded with {}", status)));
        }

        let contents = response
            .text()
            .await
            .map_err(|e| GithubApiError::Unavailable(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| GithubApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_url_trims_base_and_encodes_username() {
        let client = GithubApiClient::new("https://example.test/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(client.user_url("octocat"), "https://example.test/users/octocat");
        assert_eq!(client.user_url("a b/c"), "https://example.test/users/a%20b%2Fc");
    }

    #[test]
    fn empty_token_is_ignored() {
        let client = GithubApiClient::new(GITHUB_API_BASE, Some(String::new()), Duration::from_secs(1)).unwrap();
        assert!(client.token.is_none());
    }
}
