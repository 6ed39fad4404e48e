use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError,
    services::auth as auth_service,
    state::AppState,
};

/// Extracts the bearer token from the `Authorization` header.
///
/// # Arguments
///
/// * `headers` - The request headers.
///
/// # Returns
///
/// An `Option` containing the token if a well-formed bearer header is present.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// A middleware that requires a valid admin session.
///
/// On success the `AdminSession` is inserted into the request extensions.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    tracing::debug!("🔐 Checking admin session...");

    let token = extract_bearer_token(request.headers())
        .ok_or_else(|| {
            tracing::warn!("❌ No bearer token on admin request");
            AppError::Unauthenticated
        })?
        .to_string();

    let session = auth_service::verify(state.sessions.as_ref(), &token).await?;

    tracing::debug!("✅ Admin authenticated: {}", session.username);

    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}
