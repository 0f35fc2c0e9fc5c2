use utoipa::{Modify, OpenApi};

use crate::features::sessions::{dtos as sessions_dtos, handlers as sessions_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Sessions
        sessions_handlers::create_session,
        sessions_handlers::get_session,
        sessions_handlers::delete_session,
        // Entries
        sessions_handlers::add_entries,
        sessions_handlers::clear_entries,
        sessions_handlers::update_entry,
        sessions_handlers::remove_entry,
        sessions_handlers::get_preview,
        // Annotation & writing
        sessions_handlers::annotate,
        sessions_handlers::write_entry,
        sessions_handlers::write_all,
    ),
    components(
        schemas(
            Meta,
            sessions_dtos::StatusState,
            sessions_dtos::StatusDto,
            sessions_dtos::EntryDto,
            sessions_dtos::SessionLimitsDto,
            sessions_dtos::SessionSnapshotDto,
            sessions_dtos::AddEntriesDto,
            sessions_dtos::SkippedFilesDto,
            sessions_dtos::AdmissionReportDto,
            sessions_dtos::UpdateEntryDto,
            sessions_dtos::AnnotateResponseDto,
            sessions_dtos::RemovedEntriesDto,
            ApiResponse<sessions_dtos::SessionSnapshotDto>,
            ApiResponse<sessions_dtos::AdmissionReportDto>,
            ApiResponse<sessions_dtos::AnnotateResponseDto>,
            ApiResponse<sessions_dtos::RemovedEntriesDto>,
        )
    ),
    tags(
        (name = "sessions", description = "Image selection, AI suggestions and metadata writing"),
    ),
    info(
        title = "Metastamp API",
        version = "0.1.0",
        description = "API documentation for the Metastamp tagging core",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_session_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/sessions",
            "/api/sessions/{session_id}",
            "/api/sessions/{session_id}/entries",
            "/api/sessions/{session_id}/entries/{entry_id}",
            "/api/sessions/{session_id}/entries/{entry_id}/preview",
            "/api/sessions/{session_id}/entries/{entry_id}/write",
            "/api/sessions/{session_id}/annotate",
            "/api/sessions/{session_id}/write-all",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {}",
                expected
            );
        }
    }
}
