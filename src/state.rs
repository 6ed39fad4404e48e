use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::ingest::columns::ImportDefaults;
use crate::repositories::{
    memory::MemoryStore,
    postgres::PgStore,
    session::{MemorySessionStore, RedisSessionStore, SessionStore},
    store::DirectoryStore,
};

/// Serializes the commit step of imports across the whole process.
#[derive(Clone)]
pub struct ImportLimiter {
    semaphore: Arc<Semaphore>,
}

impl ImportLimiter {
    /// Creates a new `ImportLimiter` allowing `max_concurrent` commits at once.
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// Waits for a commit slot.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>> {
        if self.available_permits() == 0 {
            tracing::debug!("⏳ Waiting for another import or clear to finish");
        }

        self.semaphore
            .acquire()
            .await
            .map_err(|e| AppError::Internal(format!("Import limiter closed: {}", e)))
    }

    /// Returns the number of free commit slots.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// Students and admin accounts.
    pub directory: Arc<dyn DirectoryStore>,
    /// Admin sessions.
    pub sessions: Arc<dyn SessionStore>,
    /// The application's configuration.
    pub config: Config,
    /// Guards the clear-and-insert step of imports.
    pub import_limiter: ImportLimiter,
}

impl AppState {
    /// Creates a new `AppState`, connecting to PostgreSQL and Redis when
    /// they are configured and falling back to in-memory stores otherwise.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let directory: Arc<dyn DirectoryStore> = match &config.database_url {
            Some(url) => {
                let pool = crate::db::create_pool(url)?;
                crate::db::ensure_schema(&pool).await?;
                tracing::info!("✅ PostgreSQL store initialized with deadpool-postgres");
                Arc::new(PgStore::new(pool))
            }
            None if config.seed_sample_data => {
                tracing::info!("✅ In-memory store initialized with the sample roster");
                Arc::new(MemoryStore::with_sample_roster())
            }
            None => {
                tracing::info!("✅ In-memory store initialized (empty)");
                Arc::new(MemoryStore::new())
            }
        };

        let sessions: Arc<dyn SessionStore> = match &config.redis_url {
            Some(url) => {
                let redis_client = redis::Client::open(url.as_str())?;
                let redis = redis::aio::ConnectionManager::new(redis_client).await?;
                tracing::info!("✅ Redis session store initialized (pooled)");
                Arc::new(RedisSessionStore::new(redis))
            }
            None => {
                tracing::info!("✅ In-memory session store initialized");
                Arc::new(MemorySessionStore::new())
            }
        };

        Self::with_stores(config, directory, sessions).await
    }

    /// Builds the state around already constructed stores and makes sure the
    /// configured admin account exists.
    pub async fn with_stores(
        config: &Config,
        directory: Arc<dyn DirectoryStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        crate::services::auth::ensure_admin(
            directory.as_ref(),
            &config.admin_username,
            &config.admin_password,
        )
        .await?;

        Ok(AppState {
            directory,
            sessions,
            config: config.clone(),
            import_limiter: ImportLimiter::new(1),
        })
    }

    /// Fallback values applied to imported rows.
    pub fn import_defaults(&self) -> ImportDefaults {
        ImportDefaults {
            course: self.config.default_course.clone(),
            batch: self.config.default_batch.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn import_limiter_admits_one_commit_at_a_time() {
        let limiter = ImportLimiter::new(1);

        let permit = limiter.acquire().await.unwrap();
        assert_eq!(limiter.available_permits(), 0);

        let waiting = tokio::time::timeout(Duration::from_millis(50), limiter.acquire()).await;
        assert!(waiting.is_err());

        drop(permit);
        assert_eq!(limiter.available_permits(), 1);
        assert!(limiter.acquire().await.is_ok());
    }
}
