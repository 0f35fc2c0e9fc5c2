use std::sync::Mutex as StdMutex;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::entries::models::{
    AggregateStatus, EntryEdit, EntryStore, FileEntry, PreviewCache, PreviewData, RawFile,
};
use crate::features::entries::services::{admit, Admission, AdmissionOutcome, RejectionReason};
use crate::features::sessions::models::AdmissionReport;

/// Everything a session mutates, guarded by one lock
#[derive(Debug, Default)]
pub struct SessionState {
    pub store: EntryStore,
    pub ai_status: AggregateStatus,
    pub bulk_status: AggregateStatus,
}

impl SessionState {
    /// Reset both aggregate statuses after the entry set changed.
    ///
    /// A status that is still loading belongs to a pass in flight and is
    /// left for that pass to settle.
    fn entries_changed(&mut self) {
        if !self.ai_status.is_loading() {
            self.ai_status = AggregateStatus::Idle;
        }
        if !self.bulk_status.is_loading() {
            self.bulk_status = AggregateStatus::Idle;
        }
    }
}

/// One front end's working set: an entry store plus its AI and batch
/// statuses.
///
/// Every transition takes the state lock, applies itself and releases the
/// lock. Services that call out over the network must not hold the guard
/// across the call.
pub struct Session {
    id: Uuid,
    capacity: usize,
    previews: PreviewCache,
    state: Mutex<SessionState>,
    last_activity: StdMutex<Instant>,
}

impl Session {
    pub fn new(capacity: usize, previews: PreviewCache) -> Self {
        Self {
            id: Uuid::now_v7(),
            capacity,
            previews,
            state: Mutex::new(SessionState::default()),
            last_activity: StdMutex::new(Instant::now()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lock the session state and mark the session as active
    pub async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.touch();
        self.state.lock().await
    }

    /// Time since the last state access
    pub fn idle_for(&self) -> Duration {
        self.last_activity
            .lock()
            .map(|at| at.elapsed())
            .unwrap_or_else(|e| e.into_inner().elapsed())
    }

    fn touch(&self) {
        let mut at = self.last_activity.lock().unwrap_or_else(|e| e.into_inner());
        *at = Instant::now();
    }

    /// Run a selection through the admission guard and add what passes
    pub async fn add_files(&self, files: Vec<RawFile>) -> AdmissionReport {
        let mut state = self.lock().await;

        let admission = admit(
            files,
            &state.store.signatures(),
            state.store.len(),
            self.capacity,
        );
        let outcome = admission.outcome();
        let Admission {
            admitted,
            unsupported,
            duplicates,
            over_capacity,
        } = admission;

        let entries: Vec<FileEntry> = admitted
            .into_iter()
            .map(|raw| {
                let id = Uuid::now_v7();
                let preview = self.previews.register(
                    id,
                    PreviewData {
                        content_type: raw.media_type().to_string(),
                        data: raw.data.clone(),
                    },
                );
                FileEntry::new(id, raw, preview)
            })
            .collect();
        let added: Vec<Uuid> = entries.iter().map(FileEntry::id).collect();
        state.store.add(entries);

        let mut report = AdmissionReport {
            added,
            unsupported,
            duplicates,
            over_capacity,
            outcome,
            status: state.ai_status.clone(),
        };

        if outcome == AdmissionOutcome::Empty {
            return report;
        }

        state.entries_changed();
        if !state.ai_status.is_loading() {
            state.ai_status = self.admission_status(&report);
        }
        report.status = state.ai_status.clone();

        info!(
            "Session {}: added {} images, skipped {} ({} in store)",
            self.id,
            report.added.len(),
            report.skipped(),
            state.store.len()
        );

        report
    }

    pub async fn edit_entry(&self, entry_id: Uuid, edit: EntryEdit) -> Result<()> {
        if self.lock().await.store.edit(entry_id, edit) {
            Ok(())
        } else {
            Err(Self::entry_not_found(entry_id))
        }
    }

    pub async fn remove_entry(&self, entry_id: Uuid) -> Result<()> {
        let mut state = self.lock().await;
        if !state.store.remove(entry_id) {
            return Err(Self::entry_not_found(entry_id));
        }
        state.entries_changed();
        debug!("Session {}: removed entry {}", self.id, entry_id);
        Ok(())
    }

    /// Drop every entry; returns how many were removed
    pub async fn clear(&self) -> usize {
        let mut state = self.lock().await;
        let removed = state.store.clear();
        state.entries_changed();
        debug!("Session {}: cleared {} entries", self.id, removed);
        removed
    }

    /// Preview bytes of an entry that belongs to this session
    pub async fn preview(&self, entry_id: Uuid) -> Result<PreviewData> {
        let state = self.lock().await;
        if state.store.get(entry_id).is_none() {
            return Err(Self::entry_not_found(entry_id));
        }
        self.previews
            .get(entry_id)
            .ok_or_else(|| AppError::NotFound(format!("Preview for entry {} not found", entry_id)))
    }

    fn entry_not_found(entry_id: Uuid) -> AppError {
        AppError::NotFound(format!("Entry {} not found", entry_id))
    }

    fn admission_status(&self, report: &AdmissionReport) -> AggregateStatus {
        match report.outcome {
            AdmissionOutcome::Empty | AdmissionOutcome::AllAdmitted => AggregateStatus::Idle,
            AdmissionOutcome::PartiallyAdmitted => AggregateStatus::Success(format!(
                "Added {} images; skipped {} ({})",
                report.added.len(),
                report.skipped(),
                self.describe_skips(report)
            )),
            AdmissionOutcome::NoneAdmitted(reason) => AggregateStatus::Error(match reason {
                RejectionReason::Duplicates => {
                    "All selected images are already in the list".to_string()
                }
                RejectionReason::Capacity => {
                    format!("The list is full (maximum {} images)", self.capacity)
                }
                RejectionReason::UnsupportedFormat => {
                    "Unsupported format. Select JPEG, PNG or WebP images".to_string()
                }
                RejectionReason::Mixed => {
                    format!("No images added ({})", self.describe_skips(report))
                }
            }),
        }
    }

    fn describe_skips(&self, report: &AdmissionReport) -> String {
        let mut parts = Vec::new();
        if !report.duplicates.is_empty() {
            parts.push(format!("{} already added", report.duplicates.len()));
        }
        if !report.over_capacity.is_empty() {
            parts.push(format!(
                "{} over the limit of {}",
                report.over_capacity.len(),
                self.capacity
            ));
        }
        if !report.unsupported.is_empty() {
            parts.push(format!("{} unsupported", report.unsupported.len()));
        }
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::entries::models::WriteStatus;
    use crate::shared::test_helpers::jpeg;
    use axum::body::Bytes;

    fn gif(name: &str) -> RawFile {
        RawFile::new(name, "image/gif", 1, Bytes::from_static(b"GIF89a"))
    }

    #[tokio::test]
    async fn test_duplicate_in_selection_reports_skip() {
        let session = Session::new(10, PreviewCache::new());

        let report = session
            .add_files(vec![
                jpeg("a.jpg", 1),
                jpeg("b.jpg", 1),
                jpeg("c.jpg", 1),
                jpeg("a.jpg", 1),
            ])
            .await;

        assert_eq!(report.added.len(), 3);
        assert_eq!(report.duplicates, vec!["a.jpg"]);
        assert_eq!(
            report.status,
            AggregateStatus::Success("Added 3 images; skipped 1 (1 already added)".to_string())
        );
        let state = session.lock().await;
        assert_eq!(state.store.len(), 3);
        assert_eq!(state.ai_status, report.status);
    }

    #[tokio::test]
    async fn test_all_admitted_resets_statuses() {
        let session = Session::new(10, PreviewCache::new());
        {
            let mut state = session.lock().await;
            state.ai_status = AggregateStatus::Success("old".to_string());
            state.bulk_status = AggregateStatus::Error("old".to_string());
        }

        let report = session.add_files(vec![jpeg("a.jpg", 1)]).await;

        assert_eq!(report.outcome, AdmissionOutcome::AllAdmitted);
        let state = session.lock().await;
        assert_eq!(state.ai_status, AggregateStatus::Idle);
        assert_eq!(state.bulk_status, AggregateStatus::Idle);
    }

    #[tokio::test]
    async fn test_capacity_is_never_exceeded() {
        let session = Session::new(3, PreviewCache::new());
        session.add_files(vec![jpeg("a.jpg", 1), jpeg("b.jpg", 1)]).await;

        let report = session
            .add_files(vec![jpeg("c.jpg", 1), jpeg("d.jpg", 1), jpeg("e.jpg", 1)])
            .await;

        assert_eq!(report.added.len(), 1);
        assert_eq!(report.over_capacity, vec!["d.jpg", "e.jpg"]);
        assert_eq!(session.lock().await.store.len(), 3);

        let report = session.add_files(vec![jpeg("f.jpg", 1)]).await;
        assert_eq!(
            report.status,
            AggregateStatus::Error("The list is full (maximum 3 images)".to_string())
        );
    }

    #[tokio::test]
    async fn test_none_admitted_messages_name_the_reason() {
        let session = Session::new(10, PreviewCache::new());
        session.add_files(vec![jpeg("a.jpg", 1)]).await;

        let report = session.add_files(vec![jpeg("a.jpg", 1)]).await;
        assert_eq!(
            report.status,
            AggregateStatus::Error("All selected images are already in the list".to_string())
        );

        let report = session.add_files(vec![gif("x.gif")]).await;
        assert!(matches!(
            report.status,
            AggregateStatus::Error(ref m) if m.starts_with("Unsupported format")
        ));

        let report = session.add_files(vec![gif("x.gif"), jpeg("a.jpg", 1)]).await;
        assert_eq!(
            report.status,
            AggregateStatus::Error("No images added (1 already added, 1 unsupported)".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_selection_changes_nothing() {
        let session = Session::new(10, PreviewCache::new());
        session.lock().await.bulk_status = AggregateStatus::Success("Wrote 1 images".to_string());

        let report = session.add_files(Vec::new()).await;

        assert_eq!(report.outcome, AdmissionOutcome::Empty);
        assert_eq!(
            session.lock().await.bulk_status,
            AggregateStatus::Success("Wrote 1 images".to_string())
        );
    }

    #[tokio::test]
    async fn test_loading_status_survives_entry_changes() {
        let session = Session::new(10, PreviewCache::new());
        session.add_files(vec![jpeg("a.jpg", 1)]).await;
        session.lock().await.bulk_status = AggregateStatus::Loading("busy".to_string());

        session.add_files(vec![jpeg("b.jpg", 1)]).await;
        session.clear().await;

        assert!(session.lock().await.bulk_status.is_loading());
    }

    #[tokio::test]
    async fn test_remove_and_clear_release_previews() {
        let previews = PreviewCache::new();
        let session = Session::new(10, previews.clone());
        let report = session
            .add_files(vec![jpeg("a.jpg", 1), jpeg("b.jpg", 1), jpeg("c.jpg", 1)])
            .await;
        assert_eq!(previews.live(), 3);

        session.remove_entry(report.added[0]).await.unwrap();
        assert_eq!(previews.live(), 2);
        assert!(session.preview(report.added[0]).await.is_err());
        assert_eq!(
            session.preview(report.added[1]).await.unwrap().content_type,
            "image/jpeg"
        );

        assert_eq!(session.clear().await, 2);
        assert_eq!(previews.live(), 0);
    }

    #[tokio::test]
    async fn test_edit_and_remove_unknown_entry_are_not_found() {
        let session = Session::new(10, PreviewCache::new());
        let unknown = Uuid::now_v7();

        assert!(matches!(
            session.edit_entry(unknown, EntryEdit::default()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            session.remove_entry(unknown).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_edit_resets_write_status() {
        let session = Session::new(10, PreviewCache::new());
        let id = session.add_files(vec![jpeg("a.jpg", 1)]).await.added[0];
        session
            .lock()
            .await
            .store
            .update(id, |e| e.set_write_status(WriteStatus::Error("x".to_string())));

        session
            .edit_entry(
                id,
                EntryEdit {
                    tags: Some("river, bridge".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let state = session.lock().await;
        let entry = state.store.get(id).unwrap();
        assert_eq!(entry.tags(), "river, bridge");
        assert_eq!(entry.write_status(), &WriteStatus::Idle);
    }
}
