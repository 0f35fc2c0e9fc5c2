use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::annotation::models::AnnotationReport;
use crate::features::entries::models::{AggregateStatus, EntryEdit, FileEntry, WriteStatus};
use crate::features::sessions::models::AdmissionReport;
use crate::features::sessions::services::SessionState;

/// Maximum length of a title accepted from the editor
pub const MAX_TITLE_LENGTH: u64 = 2000;

/// Maximum length of the comma-joined tag string accepted from the editor
pub const MAX_TAGS_LENGTH: u64 = 6000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Idle,
    Loading,
    Success,
    Error,
}

/// Status of an entry write or of a session-wide pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusDto {
    pub state: StatusState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&AggregateStatus> for StatusDto {
    fn from(status: &AggregateStatus) -> Self {
        let state = match status {
            AggregateStatus::Idle => StatusState::Idle,
            AggregateStatus::Loading(_) => StatusState::Loading,
            AggregateStatus::Success(_) => StatusState::Success,
            AggregateStatus::Error(_) => StatusState::Error,
        };
        Self {
            state,
            message: status.message().map(str::to_string),
        }
    }
}

impl From<&WriteStatus> for StatusDto {
    fn from(status: &WriteStatus) -> Self {
        match status {
            WriteStatus::Idle => Self {
                state: StatusState::Idle,
                message: None,
            },
            WriteStatus::Loading => Self {
                state: StatusState::Loading,
                message: None,
            },
            WriteStatus::Success => Self {
                state: StatusState::Success,
                message: None,
            },
            WriteStatus::Error(msg) => Self {
                state: StatusState::Error,
                message: Some(msg.clone()),
            },
        }
    }
}

/// One image in the session
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EntryDto {
    pub id: Uuid,
    /// Original file name as selected
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Modification time in milliseconds since the epoch
    pub last_modified: i64,
    pub content_type: String,
    pub title: String,
    /// Comma-joined keywords
    pub tags: String,
    pub write_status: StatusDto,
}

impl From<&FileEntry> for EntryDto {
    fn from(entry: &FileEntry) -> Self {
        let raw = entry.raw_file();
        Self {
            id: entry.id(),
            name: raw.name.clone(),
            size: raw.size,
            last_modified: raw.last_modified,
            content_type: raw.media_type().to_string(),
            title: entry.title().to_string(),
            tags: entry.tags().to_string(),
            write_status: entry.write_status().into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionLimitsDto {
    /// Maximum number of images a session holds
    pub max_entries: usize,
    /// Maximum number of images sent in one annotation request
    pub max_batch_size: usize,
}

/// Full view of a session
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionSnapshotDto {
    pub id: Uuid,
    pub entries: Vec<EntryDto>,
    pub ai_status: StatusDto,
    pub bulk_status: StatusDto,
    pub limits: SessionLimitsDto,
}

impl SessionSnapshotDto {
    pub fn from_state(id: Uuid, state: &SessionState, limits: SessionLimitsDto) -> Self {
        Self {
            id,
            entries: state.store.iter().map(EntryDto::from).collect(),
            ai_status: (&state.ai_status).into(),
            bulk_status: (&state.bulk_status).into(),
            limits,
        }
    }
}

/// Multipart body for adding images.
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct AddEntriesDto {
    /// Image files, one part each (`files` or `file`)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub files: Vec<String>,
    /// Modification times in ms since the epoch, paired with `files` by position
    pub last_modified: Option<Vec<i64>>,
}

/// Names dropped from a selection, grouped by reason
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SkippedFilesDto {
    pub unsupported: Vec<String>,
    pub duplicates: Vec<String>,
    pub over_capacity: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdmissionReportDto {
    pub added: Vec<Uuid>,
    pub skipped: SkippedFilesDto,
    pub session: SessionSnapshotDto,
}

impl AdmissionReportDto {
    pub fn new(report: AdmissionReport, session: SessionSnapshotDto) -> Self {
        Self {
            added: report.added,
            skipped: SkippedFilesDto {
                unsupported: report.unsupported,
                duplicates: report.duplicates,
                over_capacity: report.over_capacity,
            },
            session,
        }
    }
}

/// Partial edit of an entry's title and tags
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEntryDto {
    #[validate(length(max = MAX_TITLE_LENGTH, message = "title must be at most 2000 characters"))]
    pub title: Option<String>,
    /// Comma-joined keywords
    #[validate(length(max = MAX_TAGS_LENGTH, message = "tags must be at most 6000 characters"))]
    pub tags: Option<String>,
}

impl From<UpdateEntryDto> for EntryEdit {
    fn from(dto: UpdateEntryDto) -> Self {
        Self {
            title: dto.title,
            tags: dto.tags,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnnotateResponseDto {
    /// Entries that received a suggestion
    pub matched: usize,
    /// Entries the service returned nothing for
    pub missing: usize,
    pub status: StatusDto,
    pub session: SessionSnapshotDto,
}

impl AnnotateResponseDto {
    pub fn new(report: &AnnotationReport, session: SessionSnapshotDto) -> Self {
        Self {
            matched: report.matched,
            missing: report.missing,
            status: (&report.status).into(),
            session,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RemovedEntriesDto {
    pub removed: usize,
}
