use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use http::{HeaderValue, Method, header};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{handlers, middleware_layer, state::AppState};

/// Room left in the request body for multipart boundaries and part headers.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(86400))
}

/// Builds the application router.
///
/// # Arguments
///
/// * `state` - The shared application state.
///
/// # Returns
///
/// The `Router` serving `/api` and, as a fallback, the static web client.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes + MULTIPART_OVERHEAD);

    let public_routes = Router::new()
        .route(
            "/students",
            get(handlers::students::list_students).post(handlers::students::create_student),
        )
        .route(
            "/students/import",
            post(handlers::students::import_students).layer(upload_limit),
        )
        .route("/students/all", delete(handlers::students::clear_students))
        .route("/students/{id}", get(handlers::students::get_student))
        .route("/admin/login", post(handlers::auth::login))
        .route("/admin/logout", post(handlers::auth::logout));

    let admin_routes = Router::new()
        .route("/admin/verify", get(handlers::auth::verify))
        .route(
            "/admin/students/import",
            post(handlers::students::admin_import_students).layer(upload_limit),
        )
        .route(
            "/admin/students/all",
            delete(handlers::students::admin_clear_students),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_admin,
        ));

    let api = public_routes.merge(admin_routes).with_state(state.clone());

    Router::new()
        .nest("/api", api)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().level(Level::INFO))
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(cors_layer(&state.config.cors_origins))
        .fallback_service(ServeDir::new(&state.config.public_dir))
}
