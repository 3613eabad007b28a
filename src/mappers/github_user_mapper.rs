use chrono::{DateTime, Utc};

use crate::entities;
use crate::models;

pub fn to_entity(
    username: &str,
    model: &models::github_user::GithubUser,
    expires_at: DateTime<Utc>,
) -> entities::github_user::GithubUser {
    entities::github_user::GithubUser {
        username: username.to_string(),
        user: model.clone(),
        expires_at,
    }
}

pub fn to_model(entity: &entities::github_user::GithubUser) -> models::github_user::GithubUser {
    entity.user.clone()
}
