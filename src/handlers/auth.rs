use axum::{
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, Result},
    middleware_layer::auth::extract_bearer_token,
    models::session::AdminSession,
    services::auth as auth_service,
    state::AppState,
    validation::auth::require_credentials,
};

/// The request payload for admin login.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// The response payload for a successful login.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub session_token: String,
    pub username: String,
}

/// The response payload for session verification.
#[derive(Serialize)]
pub struct VerifyResponse {
    pub authenticated: bool,
    pub username: String,
}

/// A response carrying only a human-readable message.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Handles admin login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(payload) = payload.map_err(|e| {
        tracing::debug!("Rejected login payload: {}", e);
        AppError::Validation("Username and password are required".to_string())
    })?;

    let (username, password) =
        require_credentials(payload.username.as_deref(), payload.password.as_deref())?;

    tracing::info!("🔐 Admin login attempt: {}", username);

    let session = auth_service::login(
        state.directory.as_ref(),
        state.sessions.as_ref(),
        username,
        password,
        state.config.session_ttl(),
    )
    .await?;

    let response = LoginResponse {
        message: "Login successful".to_string(),
        session_token: session.session_token,
        username: session.username,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Handles admin logout. Succeeds with or without a (valid) token.
#[axum::debug_handler]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = extract_bearer_token(&headers) {
        auth_service::logout(state.sessions.as_ref(), token).await;
        tracing::info!("👋 Admin session closed");
    }

    let response = MessageResponse {
        message: "Logged out successfully".to_string(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// Reports the admin behind the presented token.
#[axum::debug_handler]
pub async fn verify(Extension(session): Extension<AdminSession>) -> Response {
    let response = VerifyResponse {
        authenticated: true,
        username: session.username,
    };

    (StatusCode::OK, Json(response)).into_response()
}
