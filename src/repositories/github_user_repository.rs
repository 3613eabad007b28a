use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::entities::github_user::GithubUser;
use crate::time::Clock;


/// In-memory cache of fetched users. Entries live for `ttl` from insertion
/// and are never served once expired.
pub struct GitHubUserRepository {
    users: RwLock<HashMap<String, GithubUser>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl GitHubUserRepository {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        GitHubUserRepository {
            users: RwLock::new(HashMap::new()),
            clock,
            ttl,
        }
    }

    /// Expiry instant for an entry inserted now.
    pub fn expiration_from_now(&self) -> DateTime<Utc> {
        self.clock.now() + self.ttl
    }

    pub async fn get_by_username(&self, username: &str) -> Option<GithubUser> {
        let now = self.clock.now();
        {
            let users = self.users.read().await;
            match users.get(username) {
                Some(user) if !user.is_expired(now) => return Some(user.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop it unless someone refreshed it in between.
        let mut users = self.users.write().await;
        if users.get(username).map_or(false, |user| user.is_expired(now)) {
            users.remove(username);
        }
        None
    }

    pub async fn insert(&self, user: GithubUser) {
        self.users.write().await.insert(user.username.clone(), user);
    }

    /// Removes every expired entry and returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|_, user| !user.is_expired(now));
        before - users.len()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Runs `purge_expired` every `period` until the runtime shuts down.
    pub fn spawn_sweeper(self: Arc<Self>, period: std::time::Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let removed = self.purge_expired().await;
                if removed > 0 {
                    log::debug!("Swept {} expired GitHub users, {} cached", removed, self.len().await);
                }
            }
        })
    }
}
