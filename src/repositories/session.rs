use std::collections::HashMap;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use tokio::sync::RwLock;

use crate::{
    error::{AppError, Result},
    models::session::AdminSession,
};

/// Persistence for admin sessions, keyed by session token.
///
/// Stores only save and load; expiry is decided by `services::auth`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Saves a new session.
    async fn insert(&self, session: AdminSession) -> Result<()>;

    /// Loads the session for `token`, expired or not.
    async fn find(&self, token: &str) -> Result<Option<AdminSession>>;

    /// Deletes the session for `token`. Unknown tokens are a no-op.
    async fn delete(&self, token: &str) -> Result<()>;
}

/// A process-local `SessionStore`.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, AdminSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: AdminSession) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(session.session_token.clone(), session);
        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<AdminSession>> {
        Ok(self.sessions.read().await.get(token).cloned())
    }

    async fn delete(&self, token: &str) -> Result<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }
}

/// A `SessionStore` that keeps each session as a JSON value under
/// `admin_session:<token>` in Redis.
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: ConnectionManager,
}

impl RedisSessionStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    fn key(token: &str) -> String {
        format!("admin_session:{}", token)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn insert(&self, session: AdminSession) -> Result<()> {
        let session_json = sonic_rs::to_string(&session)
            .map_err(|e| AppError::Internal(format!("Session serialization failed: {}", e)))?;

        // Redis drops the key shortly after expiry; the lazy check in
        // `services::auth` still runs first on every lookup.
        let ttl_secs = (session.expires_at - session.created_at).num_seconds().max(1) as u64 + 60;

        let mut redis = self.redis.clone();
        let _: () = redis
            .set_ex(Self::key(&session.session_token), &session_json, ttl_secs)
            .await?;
        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<AdminSession>> {
        let mut redis = self.redis.clone();
        let session_json: Option<String> = redis.get(Self::key(token)).await?;

        session_json
            .map(|json| {
                sonic_rs::from_str::<AdminSession>(&json)
                    .map_err(|e| AppError::Internal(format!("Invalid session JSON: {}", e)))
            })
            .transpose()
    }

    async fn delete(&self, token: &str) -> Result<()> {
        let mut redis = self.redis.clone();
        let _: () = redis.del(Self::key(token)).await?;
        Ok(())
    }
}
