#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use student_directory::app::build_router;
use student_directory::config::Config;
use student_directory::repositories::memory::MemoryStore;
use student_directory::repositories::session::MemorySessionStore;
use student_directory::state::AppState;

const BOUNDARY: &str = "student-directory-test-boundary";

/// Build a test `Config`: in-memory stores, no sample roster, default admin.
pub fn test_config() -> Config {
    Config {
        seed_sample_data: false,
        ..Config::default()
    }
}

/// Build the full router over empty in-memory stores.
///
/// The state is returned alongside so tests can inspect the record store
/// directly.
pub async fn build_test_app(config: Config) -> (Router, AppState) {
    let state = AppState::with_stores(
        &config,
        Arc::new(MemoryStore::new()),
        Arc::new(MemorySessionStore::new()),
    )
    .await
    .unwrap();

    (build_router(state.clone()), state)
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::post(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: &Router, uri: &str, token: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method(Method::DELETE).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

/// Encode a single `file` part as a `multipart/form-data` body.
pub fn multipart_body(file_name: &str, content_type: &str, contents: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// POST a file upload to `uri`, optionally with a bearer token.
pub async fn upload(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    file_name: &str,
    contents: &[u8],
) -> Response<Body> {
    let content_type = if file_name.ends_with(".csv") {
        "text/csv"
    } else {
        "application/octet-stream"
    };

    let mut builder = Request::post(uri).header(
        CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }

    let body = multipart_body(file_name, content_type, contents);
    send(app, builder.body(Body::from(body)).unwrap()).await
}

/// Log in as the default admin and return the session token.
pub async fn login(app: &Router) -> String {
    let response = post_json(
        app,
        "/api/admin/login",
        serde_json::json!({ "username": "admin", "password": "admin123" }),
    )
    .await;
    let json = body_json(response).await;
    json["sessionToken"].as_str().unwrap().to_string()
}
