use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::{
    crypto::token::generate_session_token,
    error::{AppError, Result},
    models::session::AdminSession,
    repositories::{session::SessionStore, store::DirectoryStore},
};

/// Compares two secrets without leaking the position of the first mismatch.
///
/// The stored password is plaintext; only the comparison is hardened.
fn secrets_match(provided: &str, stored: &str) -> bool {
    provided.as_bytes().ct_eq(stored.as_bytes()).into()
}

/// Creates the admin account if no account with that username exists yet.
///
/// # Arguments
///
/// * `directory` - The record store holding admin accounts.
/// * `username` - The admin's username.
/// * `password` - The admin's password.
pub async fn ensure_admin(directory: &dyn DirectoryStore, username: &str, password: &str) -> Result<()> {
    if directory.find_admin_by_username(username).await?.is_some() {
        tracing::debug!("Admin account '{}' already present", username);
        return Ok(());
    }

    directory.create_admin(username, password).await?;
    tracing::info!("✅ Created default admin account '{}'", username);
    Ok(())
}

/// Logs an admin in and opens a new session.
///
/// # Arguments
///
/// * `directory` - The record store holding admin accounts.
/// * `sessions` - The session store.
/// * `username` - The submitted username.
/// * `password` - The submitted password.
/// * `ttl` - How long the session stays valid.
///
/// # Returns
///
/// The new session, or `AppError::InvalidCredentials`.
pub async fn login(
    directory: &dyn DirectoryStore,
    sessions: &dyn SessionStore,
    username: &str,
    password: &str,
    ttl: chrono::Duration,
) -> Result<AdminSession> {
    tracing::debug!("🔐 Authenticating admin: {}", username);

    let admin = directory
        .find_admin_by_username(username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !secrets_match(password, &admin.password) {
        return Err(AppError::InvalidCredentials);
    }

    let created_at = Utc::now();
    let session = AdminSession {
        id: Uuid::new_v4(),
        session_token: generate_session_token(),
        username: admin.username,
        created_at,
        expires_at: created_at + ttl,
    };

    sessions.insert(session.clone()).await?;
    tracing::info!("✅ Admin session opened for {} (expires {})", session.username, session.expires_at);

    Ok(session)
}

/// Resolves a bearer token to its live session.
///
/// Expired sessions are deleted on the lookup that finds them expired.
pub async fn verify(sessions: &dyn SessionStore, token: &str) -> Result<AdminSession> {
    verify_at(sessions, token, Utc::now()).await
}

/// [`verify`] against an explicit clock.
pub async fn verify_at(
    sessions: &dyn SessionStore,
    token: &str,
    now: DateTime<Utc>,
) -> Result<AdminSession> {
    let session = sessions
        .find(token)
        .await?
        .ok_or(AppError::Unauthenticated)?;

    if !session.is_valid_at(now) {
        tracing::warn!("❌ Session expired for admin: {}", session.username);
        sessions.delete(token).await?;
        return Err(AppError::Unauthenticated);
    }

    Ok(session)
}

/// Ends the session for `token`. Unknown tokens are ignored.
pub async fn logout(sessions: &dyn SessionStore, token: &str) {
    if let Err(e) = sessions.delete(token).await {
        tracing::warn!("Failed to delete session on logout: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{memory::MemoryStore, session::MemorySessionStore};

    async fn stores() -> (MemoryStore, MemorySessionStore) {
        let directory = MemoryStore::new();
        ensure_admin(&directory, "admin", "admin123").await.unwrap();
        (directory, MemorySessionStore::new())
    }

    #[tokio::test]
    async fn login_then_verify_returns_the_username() {
        let (directory, sessions) = stores().await;

        let session = login(&directory, &sessions, "admin", "admin123", chrono::Duration::hours(24))
            .await
            .unwrap();
        assert_eq!(session.expires_at - session.created_at, chrono::Duration::hours(24));

        let verified = verify(&sessions, &session.session_token).await.unwrap();
        assert_eq!(verified.username, "admin");
    }

    #[tokio::test]
    async fn wrong_password_or_unknown_user_is_rejected() {
        let (directory, sessions) = stores().await;
        let ttl = chrono::Duration::hours(24);

        let err = login(&directory, &sessions, "admin", "admin1234", ttl).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));

        let err = login(&directory, &sessions, "root", "admin123", ttl).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn tokens_are_unique_per_login() {
        let (directory, sessions) = stores().await;
        let ttl = chrono::Duration::hours(24);

        let first = login(&directory, &sessions, "admin", "admin123", ttl).await.unwrap();
        let second = login(&directory, &sessions, "admin", "admin123", ttl).await.unwrap();

        assert_ne!(first.session_token, second.session_token);
    }

    #[tokio::test]
    async fn expired_session_fails_and_is_evicted() {
        let (_, sessions) = stores().await;
        let now = Utc::now();
        sessions
            .insert(AdminSession {
                id: Uuid::new_v4(),
                session_token: "stale".to_string(),
                username: "admin".to_string(),
                created_at: now - chrono::Duration::hours(24),
                expires_at: now,
            })
            .await
            .unwrap();

        let err = verify(&sessions, "stale").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated));
        assert!(sessions.find("stale").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn session_is_valid_until_just_before_expiry() {
        let (directory, sessions) = stores().await;
        let session = login(&directory, &sessions, "admin", "admin123", chrono::Duration::hours(24))
            .await
            .unwrap();
        let token = session.session_token.clone();

        let almost = session.expires_at - chrono::Duration::seconds(1);
        assert!(verify_at(&sessions, &token, almost).await.is_ok());

        let err = verify_at(&sessions, &token, session.expires_at).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated));
        assert!(sessions.find(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let (directory, sessions) = stores().await;
        let session = login(&directory, &sessions, "admin", "admin123", chrono::Duration::hours(24))
            .await
            .unwrap();

        logout(&sessions, &session.session_token).await;
        logout(&sessions, &session.session_token).await;
        logout(&sessions, "never-issued").await;

        assert!(sessions.find(&session.session_token).await.unwrap().is_none());
        assert!(matches!(
            verify(&sessions, &session.session_token).await,
            Err(AppError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn ensure_admin_keeps_an_existing_password() {
        let (directory, _) = stores().await;
        ensure_admin(&directory, "admin", "changed").await.unwrap();

        let admin = directory.find_admin_by_username("admin").await.unwrap().unwrap();
        assert_eq!(admin.password, "admin123");
    }
}
