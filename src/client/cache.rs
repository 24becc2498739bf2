use std::time::Duration;

use async_trait::async_trait;
use eyre::Result;
use log::debug;
use tokio::time::Instant;

use crate::domain::auth::SessionData;

pub const SESSION_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Where a [`SessionStore`] gets the session from on a cache miss.
#[async_trait]
pub trait SessionSource: Send + Sync {
    async fn fetch_session(&self, token: &str) -> Result<Option<SessionData>>;
}

/// The last fetched session and when it was fetched.
#[derive(Debug)]
pub struct SessionCache {
    entry: Option<(SessionData, Instant)>,
    ttl: Duration,
}

impl SessionCache {
    pub fn new(ttl: Duration) -> Self {
        Self { entry: None, ttl }
    }

    pub fn get(&self, now: Instant) -> Option<&SessionData> {
        match &self.entry {
            Some((session, fetched_at)) if now.duration_since(*fetched_at) < self.ttl => {
                Some(session)
            }
            _ => None,
        }
    }

    pub fn store(&mut self, session: SessionData, now: Instant) {
        self.entry = Some((session, now));
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(SESSION_CACHE_TTL)
    }
}

/// Holds the bearer token and serves the current session, going to the
/// [`SessionSource`] only when the cached copy is missing or stale.
pub struct SessionStore<S> {
    source: S,
    token: Option<String>,
    cache: SessionCache,
}

impl<S: SessionSource> SessionStore<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            token: None,
            cache: SessionCache::default(),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Replacing the token drops any session cached for the old one.
    pub fn set_token(&mut self, token: Option<String>) {
        if self.token != token {
            self.cache.invalidate();
        }
        self.token = token;
    }

    pub async fn session(&mut self) -> Result<Option<SessionData>> {
        let Some(token) = self.token.clone() else {
            self.cache.invalidate();
            return Ok(None);
        };

        let now = Instant::now();
        if let Some(session) = self.cache.get(now) {
            debug!("Serving cached session");
            return Ok(Some(session.clone()));
        }

        match self.source.fetch_session(&token).await {
            Ok(Some(session)) => {
                self.cache.store(session.clone(), now);
                Ok(Some(session))
            }
            Ok(None) => {
                self.cache.invalidate();
                Ok(None)
            }
            Err(e) => {
                self.cache.invalidate();
                Err(e)
            }
        }
    }

    pub async fn refetch(&mut self) -> Result<Option<SessionData>> {
        self.cache.invalidate();
        self.session().await
    }
}
