use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use crate::clients::github_api_client::{GithubApi, GithubApiError};
use crate::mappers::github_user_mapper;
use crate::models::github_user::GithubUser;
use crate::repositories::github_user_repository::GitHubUserRepository;

type InFlight = Arc<OnceCell<Result<GithubUser, GithubApiError>>>;


#[derive(Debug, Clone)]
pub struct FetchedUser {
    pub user: GithubUser,
    /// Whether the lookup was answered from the cache without an upstream call.
    pub hit: bool,
}

pub struct GitHubUserService {
    pub repository: Arc<GitHubUserRepository>,
    pub client: Arc<dyn GithubApi>,
    in_flight: Mutex<HashMap<String, InFlight>>,
}

impl GitHubUserService {
    pub fn new(repository: Arc<GitHubUserRepository>, client: Arc<dyn GithubApi>) -> Self {
        GitHubUserService {
            repository,
            client,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get_by_username(&self, username: &str) -> Result<FetchedUser, GithubApiError> {
        if let Some(user) = self.repository.get_by_username(username).await {
            log::info!("Hit for GitHub user, username: {}!", username);
            return Ok(FetchedUser {
                user: github_user_mapper::to_model(&user),
                hit: true,
            });
        }
        log::info!("Miss for GitHub user, username: {}!", username);

        // Concurrent misses for the same key share one upstream call.
        let cell = self
            .in_flight
            .lock()
            .await
            .entry(username.to_string())
            .or_default()
            .clone();
        let result = cell.get_or_init(|| self.fetch_and_store(username, &cell)).await.clone();

        result.map(|user| FetchedUser { user, hit: false })
    }

    /// Whether an unexpired entry for `username` is cached right now.
    pub async fn is_cached(&self, username: &str) -> bool {
        self.repository.get_by_username(username).await.is_some()
    }

    // The slot is released before the cell is filled. A caller cancelled
    // before that point leaves the cell empty, so the next miss fetches again.
    async fn fetch_and_store(&self, username: &str, cell: &InFlight) -> Result<GithubUser, GithubApiError> {
        let result = match self.client.get_user(username).await {
            Ok(user) => {
                let expires_at = self.repository.expiration_from_now();
                self.repository
                    .insert(github_user_mapper::to_entity(username, &user, expires_at))
                    .await;
                Ok(user)
            }
            Err(e) => {
                log::error!("Error fetching GitHub user data for {}: {}", username, e);
                Err(e)
            }
        };

        let mut in_flight = self.in_flight.lock().await;
        if in_flight.get(username).map_or(false, |current| Arc::ptr_eq(current, cell)) {
            in_flight.remove(username);
        }
        result
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::clients::github_api_client::{GithubApi, GithubApiError};
    use crate::models::github_user::GithubUser;

    pub fn sample_user(login: &str) -> GithubUser {
        GithubUser {
            login: login.into(),
            id: 583231,
            name: Some("The Octocat".into()),
            avatar_url: "https://avatars.githubusercontent.com/u/583231?v=4".into(),
            bio: None,
            public_repos: 8,
            followers: 9000,
            following: 9,
            created_at: "2011-01-25T18:44:36Z".into(),
            updated_at: "2024-01-01T00:00:00Z".into(),
            location: Some("San Francisco".into()),
            company: Some("@github".into()),
            email: None,
            blog: Some("https://github.blog".into()),
        }
    }

    /// Upstream stand-in that answers from a fixed table and counts calls.
    #[derive(Default)]
    pub struct FakeGithubApi {
        pub users: HashMap<String, GithubUser>,
        pub unavailable: bool,
        pub delay: Option<Duration>,
        pub panics: bool,
        pub calls: AtomicUsize,
    }

    impl FakeGithubApi {
        pub fn with_users(logins: &[&str]) -> Self {
            FakeGithubApi {
                users: logins.iter().map(|login| (login.to_string(), sample_user(login))).collect(),
                ..Default::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GithubApi for FakeGithubApi {
        async fn get_user(&self, username: &str) -> Result<GithubUser, GithubApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.panics {
                panic!("upstream client exploded");
            }
            if self.unavailable {
                return Err(GithubApiError::Unavailable("connection refused".into()));
            }
            self.users.get(username).cloned().ok_or(GithubApiError::NotFound)
        }
    }
}
