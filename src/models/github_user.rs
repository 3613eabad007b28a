use serde::{Deserialize, Serialize};

/// Profile snapshot as returned by `GET /users/{username}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubUser {
    pub login: String,
    pub id: u64,
    pub name: Option<String>,
    pub avatar_url: String,
    pub bio: Option<String>,
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
    pub created_at: String,
    pub updated_at: String,
    pub location: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub blog: Option<String>,
}
