use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::metadata_writer::models::Delivery;
use crate::features::sessions::dtos::AnnotateResponseDto;
use crate::features::sessions::handlers::SessionsState;
use crate::shared::constants::{
    ARCHIVE_CONTENT_TYPE, FAILED_COUNT_HEADER, MSG_NO_IMAGES, SUCCEEDED_COUNT_HEADER,
};
use crate::shared::types::ApiResponse;

/// Generate title and tag suggestions for every image in the session
///
/// Matching suggestions are merged into the entries by id. A provider
/// failure is reported through `ai_status`; the entries keep their values.
#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/annotate",
    tag = "sessions",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Annotation round finished", body = ApiResponse<AnnotateResponseDto>),
        (status = 400, description = "No images, too many images, or a round already running"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn annotate(
    State(state): State<SessionsState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ApiResponse<AnnotateResponseDto>>> {
    let session = state.registry.get(session_id).await?;
    let report = state.annotation.annotate(&session).await?;
    let message = report.status.message().map(str::to_string);
    let snapshot = state.snapshot(&session).await;

    Ok(Json(ApiResponse::success(
        Some(AnnotateResponseDto::new(&report, snapshot)),
        message,
        None,
    )))
}

/// Write metadata into one image and download the result
///
/// Responds with the JPEG as an attachment. Writer failures are recorded
/// on the entry and returned as a 502 JSON error.
#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/entries/{entry_id}/write",
    tag = "sessions",
    params(
        ("session_id" = Uuid, Path, description = "Session ID"),
        ("entry_id" = Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Tagged JPEG", content_type = "image/jpeg"),
        (status = 404, description = "Session or entry not found"),
        (status = 502, description = "The metadata writer failed")
    )
)]
pub async fn write_entry(
    State(state): State<SessionsState>,
    Path((session_id, entry_id)): Path<(Uuid, Uuid)>,
) -> Result<Response> {
    let session = state.registry.get(session_id).await?;
    let result = state
        .write_service
        .write_entry(&session, entry_id, Delivery::Immediate)
        .await?;

    match (result.outcome, result.download) {
        (Ok(_), Some(artifact)) => {
            attachment(&artifact.file_name, &artifact.content_type, artifact.data)
        }
        (Ok(_), None) => Err(AppError::Internal(
            "Immediate write produced no download".to_string(),
        )),
        (Err(message), _) => Err(AppError::ExternalServiceError(message)),
    }
}

/// Write metadata into every image, one at a time, and download a ZIP
///
/// The archive holds only the images that were written. Counts are
/// returned in `X-Succeeded-Count` and `X-Failed-Count`. When nothing
/// could be written the response is a 502 JSON error.
#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/write-all",
    tag = "sessions",
    params(("session_id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "ZIP archive of tagged images", content_type = "application/zip"),
        (status = 400, description = "No images, or a batch already running"),
        (status = 404, description = "Session not found"),
        (status = 502, description = "Every write failed")
    )
)]
pub async fn write_all(
    State(state): State<SessionsState>,
    Path(session_id): Path<Uuid>,
) -> Result<Response> {
    let session = state.registry.get(session_id).await?;
    let outcome = state.batch.write_all(&session).await?;

    let Some(archive) = outcome.archive else {
        if outcome.total == 0 {
            return Err(AppError::Validation(MSG_NO_IMAGES.to_string()));
        }
        return Err(AppError::ExternalServiceError(format!(
            "All {} writes failed",
            outcome.total
        )));
    };

    info!(
        "Session {}: delivering {} ({} of {} images)",
        session_id, archive.file_name, archive.entries, outcome.total
    );

    let mut response = attachment(&archive.file_name, ARCHIVE_CONTENT_TYPE, archive.data)?;
    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static(SUCCEEDED_COUNT_HEADER),
        HeaderValue::from(outcome.succeeded),
    );
    headers.insert(
        HeaderName::from_static(FAILED_COUNT_HEADER),
        HeaderValue::from(outcome.failed),
    );
    Ok(response)
}

/// Binary response the browser saves under `file_name`
fn attachment(file_name: &str, content_type: &str, data: Bytes) -> Result<Response> {
    let content_type = HeaderValue::from_str(content_type)
        .map_err(|e| AppError::Internal(format!("Invalid content type: {}", e)))?;
    let disposition = HeaderValue::from_str(&content_disposition(file_name))
        .map_err(|e| AppError::Internal(format!("Invalid file name header: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

/// `attachment` disposition with an ASCII fallback and the RFC 5987 UTF-8 name
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    )
}
