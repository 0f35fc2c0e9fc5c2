use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::annotation::AnnotationService;
use crate::features::batch::BatchOrchestrator;
use crate::features::entries::models::RawFile;
use crate::features::metadata_writer::MetadataWriteService;
use crate::features::sessions::dtos::{
    AddEntriesDto, AdmissionReportDto, RemovedEntriesDto, SessionLimitsDto, SessionSnapshotDto,
    UpdateEntryDto,
};
use crate::features::sessions::services::{Session, SessionRegistry};
use crate::shared::constants::{MAX_FILE_SIZE, MSG_NO_IMAGES};
use crate::shared::types::ApiResponse;

/// Shared state for all session routes
#[derive(Clone)]
pub struct SessionsState {
    pub registry: Arc<SessionRegistry>,
    pub annotation: Arc<AnnotationService>,
    pub write_service: Arc<MetadataWriteService>,
    pub batch: Arc<BatchOrchestrator>,
}

impl SessionsState {
    pub(super) async fn snapshot(&self, session: &Session) -> SessionSnapshotDto {
        let state = session.lock().await;
        SessionSnapshotDto::from_state(
            session.id(),
            &state,
            SessionLimitsDto {
                max_entries: session.capacity(),
                max_batch_size: self.annotation.max_batch_size(),
            },
        )
    }
}

/// Open a new, empty session
#[utoipa::path(
    post,
    path = "/api/sessions",
    tag = "sessions",
    responses(
        (status = 201, description = "Session created", body = ApiResponse<SessionSnapshotDto>)
    )
)]
pub async fn create_session(
    State(state): State<SessionsState>,
) -> Result<(StatusCode, Json<ApiResponse<SessionSnapshotDto>>)> {
    let session = state.registry.create().await;
    let snapshot = state.snapshot(&session).await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(snapshot), None, None)),
    ))
}

/// Get entries, statuses and limits of a session
#[utoipa::path(
    get,
    path = "/api/sessions/{session_id}",
    tag = "sessions",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session snapshot", body = ApiResponse<SessionSnapshotDto>),
        (status = 404, description = "Session not found")
    )
)]
pub async fn get_session(
    State(state): State<SessionsState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ApiResponse<SessionSnapshotDto>>> {
    let session = state.registry.get(session_id).await?;
    let snapshot = state.snapshot(&session).await;
    Ok(Json(ApiResponse::success(Some(snapshot), None, None)))
}

/// Close a session and release all of its images
#[utoipa::path(
    delete,
    path = "/api/sessions/{session_id}",
    tag = "sessions",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session closed"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn delete_session(
    State(state): State<SessionsState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    state.registry.teardown(session_id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Session closed".to_string()),
        None,
    )))
}

/// Add images to a session
///
/// Accepts multipart/form-data with:
/// - `files` (or `file`): one part per image
/// - `last_modified`: optional modification times in ms, paired with the
///   files by position
///
/// Unsupported, duplicate and over-capacity files are skipped and reported.
#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/entries",
    tag = "sessions",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    request_body(
        content = AddEntriesDto,
        content_type = "multipart/form-data",
        description = "Image files with optional modification times",
    ),
    responses(
        (status = 200, description = "Selection applied", body = ApiResponse<AdmissionReportDto>),
        (status = 400, description = "No files or malformed form"),
        (status = 404, description = "Session not found"),
        (status = 413, description = "File too large")
    )
)]
pub async fn add_entries(
    State(state): State<SessionsState>,
    Path(session_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<AdmissionReportDto>>> {
    let session = state.registry.get(session_id).await?;

    let mut uploads = Vec::new();
    let mut last_modified: Vec<i64> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "files" | "file" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let file_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                if data.len() > MAX_FILE_SIZE {
                    return Err(AppError::PayloadTooLarge(format!(
                        "{} is too large. Maximum size is {} MB",
                        file_name,
                        MAX_FILE_SIZE / 1024 / 1024
                    )));
                }

                uploads.push((file_name, content_type, data));
            }
            "last_modified" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read last_modified field: {}", e))
                })?;
                let millis = text.trim().parse::<i64>().map_err(|_| {
                    AppError::BadRequest(format!("Invalid last_modified value: {}", text))
                })?;
                last_modified.push(millis);
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    if uploads.is_empty() {
        return Err(AppError::Validation(MSG_NO_IMAGES.to_string()));
    }

    // Without a modification time, identity falls back to name and size
    let files: Vec<RawFile> = uploads
        .into_iter()
        .enumerate()
        .map(|(index, (name, content_type, data))| {
            let modified = last_modified.get(index).copied().unwrap_or(0);
            RawFile::new(name, content_type, modified, data)
        })
        .collect();

    let report = session.add_files(files).await;
    let message = report.status.message().map(str::to_string);
    let snapshot = state.snapshot(&session).await;

    Ok(Json(ApiResponse::success(
        Some(AdmissionReportDto::new(report, snapshot)),
        message,
        None,
    )))
}

/// Remove every image from a session
#[utoipa::path(
    delete,
    path = "/api/sessions/{session_id}/entries",
    tag = "sessions",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Entries removed", body = ApiResponse<RemovedEntriesDto>),
        (status = 404, description = "Session not found")
    )
)]
pub async fn clear_entries(
    State(state): State<SessionsState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ApiResponse<RemovedEntriesDto>>> {
    let session = state.registry.get(session_id).await?;
    let removed = session.clear().await;

    Ok(Json(ApiResponse::success(
        Some(RemovedEntriesDto { removed }),
        None,
        None,
    )))
}

/// Edit the title and/or tags of one image
#[utoipa::path(
    patch,
    path = "/api/sessions/{session_id}/entries/{entry_id}",
    tag = "sessions",
    params(
        ("session_id" = Uuid, Path, description = "Session ID"),
        ("entry_id" = Uuid, Path, description = "Entry ID")
    ),
    request_body = UpdateEntryDto,
    responses(
        (status = 200, description = "Entry updated", body = ApiResponse<SessionSnapshotDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Session or entry not found")
    )
)]
pub async fn update_entry(
    State(state): State<SessionsState>,
    Path((session_id, entry_id)): Path<(Uuid, Uuid)>,
    AppJson(dto): AppJson<UpdateEntryDto>,
) -> Result<Json<ApiResponse<SessionSnapshotDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let session = state.registry.get(session_id).await?;
    session.edit_entry(entry_id, dto.into()).await?;
    let snapshot = state.snapshot(&session).await;

    Ok(Json(ApiResponse::success(Some(snapshot), None, None)))
}

/// Remove one image from a session
#[utoipa::path(
    delete,
    path = "/api/sessions/{session_id}/entries/{entry_id}",
    tag = "sessions",
    params(
        ("session_id" = Uuid, Path, description = "Session ID"),
        ("entry_id" = Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry removed", body = ApiResponse<SessionSnapshotDto>),
        (status = 404, description = "Session or entry not found")
    )
)]
pub async fn remove_entry(
    State(state): State<SessionsState>,
    Path((session_id, entry_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<SessionSnapshotDto>>> {
    let session = state.registry.get(session_id).await?;
    session.remove_entry(entry_id).await?;
    let snapshot = state.snapshot(&session).await;

    Ok(Json(ApiResponse::success(Some(snapshot), None, None)))
}

/// Get the preview bytes of one image
#[utoipa::path(
    get,
    path = "/api/sessions/{session_id}/entries/{entry_id}/preview",
    tag = "sessions",
    params(
        ("session_id" = Uuid, Path, description = "Session ID"),
        ("entry_id" = Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*"),
        (status = 404, description = "Session or entry not found")
    )
)]
pub async fn get_preview(
    State(state): State<SessionsState>,
    Path((session_id, entry_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    let session = state.registry.get(session_id).await?;
    let preview = session.preview(entry_id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, preview.content_type),
            (header::CACHE_CONTROL, "private, max-age=300".to_string()),
        ],
        preview.data,
    ))
}
