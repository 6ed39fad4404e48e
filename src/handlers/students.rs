use axum::{
    extract::{
        Multipart, Path, Query, State,
        multipart::MultipartError,
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;

use crate::{
    error::{AppError, Result},
    handlers::auth::MessageResponse,
    models::{
        session::AdminSession,
        student::{NewStudent, Student, StudentQuery},
    },
    services::{
        import::{self as import_service, ImportMode, Upload},
        students as student_service,
    },
    state::AppState,
};

/// Name of the multipart field carrying the spreadsheet.
const FILE_FIELD: &str = "file";

/// The response payload for a committed import.
#[derive(Serialize)]
pub struct ImportResponse {
    pub message: String,
    pub count: usize,
    pub students: Vec<Student>,
}

fn multipart_error(e: MultipartError, max_bytes: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(max_bytes)
    } else {
        AppError::Multipart(e.body_text())
    }
}

/// Pulls the `file` field out of a multipart form, refusing it as soon as it
/// grows past `max_bytes`.
async fn read_upload(mut multipart: Multipart, max_bytes: usize) -> Result<Upload> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);

        let mut buffer = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?
        {
            if buffer.len() + chunk.len() > max_bytes {
                return Err(AppError::PayloadTooLarge(max_bytes));
            }
            buffer.extend_from_slice(&chunk);
        }

        tracing::debug!(
            "📋 Parsed multipart - file: {:?}, type: {:?}, size: {} bytes",
            file_name,
            content_type,
            buffer.len()
        );

        return Ok(Upload {
            file_name,
            content_type,
            bytes: buffer.into(),
        });
    }

    Err(AppError::Validation("No file uploaded".to_string()))
}

async fn run_import(state: &AppState, multipart: Multipart, mode: ImportMode) -> Result<Response> {
    let upload = read_upload(multipart, state.config.max_upload_bytes).await?;

    let (count, students) = import_service::import_batch(
        state.directory.as_ref(),
        &state.import_limiter,
        upload,
        mode,
        &state.import_defaults(),
    )
    .await?
    .into_result()?;

    let response = ImportResponse {
        message: format!("Successfully imported {} students", count),
        count,
        students,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Lists students with optional search, filters and sorting.
#[axum::debug_handler]
pub async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<StudentQuery>,
) -> Result<Json<Vec<Student>>> {
    let students = student_service::list(state.directory.as_ref(), &query).await?;
    Ok(Json(students))
}

/// Fetches a single student.
#[axum::debug_handler]
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Student>> {
    let student = student_service::get(state.directory.as_ref(), &id).await?;
    Ok(Json(student))
}

/// Creates a single student.
#[axum::debug_handler]
pub async fn create_student(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewStudent>, JsonRejection>,
) -> Result<Response> {
    let Json(student) = payload.map_err(|e| {
        tracing::debug!("Rejected student payload: {}", e);
        AppError::Validation("Invalid student data".to_string())
    })?;

    let created = student_service::create(state.directory.as_ref(), student).await?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

/// Public import: the uploaded file replaces the whole roster.
#[axum::debug_handler]
pub async fn import_students(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    tracing::info!("📤 Public import request");
    run_import(&state, multipart, ImportMode::ReplaceAll).await
}

/// Admin import: the uploaded file is appended to the roster.
#[axum::debug_handler]
pub async fn admin_import_students(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    multipart: Multipart,
) -> Result<Response> {
    tracing::info!("📤 Admin import request from {}", session.username);
    run_import(&state, multipart, ImportMode::Append).await
}

async fn clear(state: &AppState) -> Result<Response> {
    let _permit = state.import_limiter.acquire().await?;
    state.directory.clear_all().await?;

    let response = MessageResponse {
        message: "All student data cleared successfully".to_string(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Public bulk clear.
#[axum::debug_handler]
pub async fn clear_students(State(state): State<AppState>) -> Result<Response> {
    tracing::info!("🧹 Public clear request");
    clear(&state).await
}

/// Admin bulk clear.
#[axum::debug_handler]
pub async fn admin_clear_students(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
) -> Result<Response> {
    tracing::info!("🧹 Admin clear request from {}", session.username);
    clear(&state).await
}
