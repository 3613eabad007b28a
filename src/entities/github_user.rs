use chrono::{DateTime, Utc};

use crate::models;

/// A cached lookup, keyed by the username exactly as the caller supplied it.
#[derive(Debug, Clone)]
pub struct GithubUser {
    pub username: String,
    pub user: models::github_user::GithubUser,
    pub expires_at: DateTime<Utc>,
}

impl GithubUser {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
