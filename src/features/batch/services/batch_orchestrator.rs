use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::batch::models::BulkOutcome;
use crate::features::batch::services::{archive_name, ArchiveBuilder};
use crate::features::entries::models::{AggregateStatus, WriteStatus};
use crate::features::metadata_writer::models::Delivery;
use crate::features::metadata_writer::MetadataWriteService;
use crate::features::sessions::services::Session;
use crate::shared::constants::{MSG_INTERRUPTED, MSG_NO_IMAGES};

/// Writes every entry of a session, one at a time, and bundles the
/// successes into a single archive.
///
/// Writes never overlap: entry n+1 is sent only after entry n has
/// resolved. Throughput is traded for a bounded load on the writer.
pub struct BatchOrchestrator {
    write_service: Arc<MetadataWriteService>,
}

impl BatchOrchestrator {
    pub fn new(write_service: Arc<MetadataWriteService>) -> Self {
        Self { write_service }
    }

    /// Run a pass over `session` on its own task, so `bulk_status` and the
    /// entry statuses settle even when the caller stops waiting.
    pub async fn write_all(self: &Arc<Self>, session: &Arc<Session>) -> Result<BulkOutcome> {
        let orchestrator = Arc::clone(self);
        let pass_session = Arc::clone(session);
        let joined = tokio::spawn(async move { orchestrator.run(&pass_session).await }).await;

        match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Session {}: batch task failed: {}", session.id(), e);
                let mut state = session.lock().await;
                if state.bulk_status.is_loading() {
                    state.bulk_status = AggregateStatus::Error(MSG_INTERRUPTED.to_string());
                }
                for id in state.store.ids() {
                    state.store.update(id, |entry| {
                        if entry.write_status() == &WriteStatus::Loading {
                            entry.set_write_status(WriteStatus::Error(MSG_INTERRUPTED.to_string()));
                        }
                    });
                }
                Err(AppError::Internal(format!("Batch task failed: {}", e)))
            }
        }
    }

    async fn run(&self, session: &Session) -> Result<BulkOutcome> {
        let ids = {
            let mut state = session.lock().await;

            if state.bulk_status.is_loading() {
                return Err(AppError::Validation(
                    "A batch write is already running".to_string(),
                ));
            }

            if state.store.is_empty() {
                state.bulk_status = AggregateStatus::Error(MSG_NO_IMAGES.to_string());
                return Err(AppError::Validation(MSG_NO_IMAGES.to_string()));
            }

            state.bulk_status = AggregateStatus::Loading(format!(
                "Writing metadata to {} images",
                state.store.len()
            ));
            state.store.ids()
        };

        info!(
            "Session {}: starting batch write of {} entries",
            session.id(),
            ids.len()
        );

        let (outcome, status) = match self.run_pass(session, ids).await {
            Ok(outcome) => {
                let status = Self::summarize(&outcome);
                (Ok(outcome), status)
            }
            Err(e) => {
                error!("Session {}: batch write aborted: {}", session.id(), e);
                let status = AggregateStatus::Error(e.user_message());
                (Err(e), status)
            }
        };

        session.lock().await.bulk_status = status;
        outcome
    }

    async fn run_pass(&self, session: &Session, ids: Vec<Uuid>) -> Result<BulkOutcome> {
        let mut archive = ArchiveBuilder::new();
        let mut failed = 0;

        for id in ids {
            // write_entry re-reads the entry, so removals since the snapshot are seen
            let result = match self
                .write_service
                .run_write(session, id, Delivery::Deferred)
                .await
            {
                Ok(result) => result,
                Err(AppError::NotFound(_)) => {
                    debug!("Entry {} removed before its turn, skipping", id);
                    continue;
                }
                Err(e) => return Err(e),
            };

            match result.outcome {
                Ok(artifact) => {
                    archive.add(&artifact.file_name, &artifact.data)?;
                }
                Err(message) => {
                    warn!(
                        "Entry {} failed in batch pass: {}",
                        result.entry_id, message
                    );
                    failed += 1;
                }
            }
        }

        let succeeded = archive.len();
        let total = succeeded + failed;
        let archive = if archive.is_empty() {
            None
        } else {
            Some(archive.finish(archive_name(Utc::now()))?)
        };

        Ok(BulkOutcome {
            total,
            succeeded,
            failed,
            archive,
        })
    }

    fn summarize(outcome: &BulkOutcome) -> AggregateStatus {
        if outcome.total == 0 {
            AggregateStatus::Error(MSG_NO_IMAGES.to_string())
        } else if outcome.succeeded == 0 {
            AggregateStatus::Error(format!("All {} writes failed", outcome.total))
        } else if outcome.failed == 0 {
            AggregateStatus::Success(format!("Wrote {} images", outcome.succeeded))
        } else {
            AggregateStatus::Success(format!(
                "Wrote {} of {} images; {} failed. The archive contains only the successful images",
                outcome.succeeded, outcome.total, outcome.failed
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::entries::models::PreviewCache;
    use crate::shared::test_helpers::{jpeg, FakeMetadataWriter};
    use std::io::Cursor;
    use std::time::Duration;
    use zip::ZipArchive;

    async fn session_with(names: &[&str]) -> (Arc<Session>, Vec<Uuid>) {
        let session = Arc::new(Session::new(10, PreviewCache::new()));
        session
            .add_files(names.iter().map(|n| jpeg(n, 1)).collect())
            .await;
        let ids = session.lock().await.store.ids();
        (session, ids)
    }

    fn orchestrator(writer: Arc<FakeMetadataWriter>) -> Arc<BatchOrchestrator> {
        Arc::new(BatchOrchestrator::new(Arc::new(MetadataWriteService::new(
            writer,
        ))))
    }

    fn zip_names(outcome: &BulkOutcome) -> Vec<String> {
        let archive = outcome.archive.as_ref().expect("archive");
        let mut zip = ZipArchive::new(Cursor::new(archive.data.to_vec())).unwrap();
        (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_all_succeed() {
        let (session, _) = session_with(&["a.jpg", "b.png", "c.webp"]).await;
        let writer = Arc::new(FakeMetadataWriter::succeeding());

        let outcome = orchestrator(writer.clone()).write_all(&session).await.unwrap();

        assert_eq!(outcome.failed, 0);
        assert_eq!(outcome.succeeded, 3);
        assert_eq!(
            zip_names(&outcome),
            vec!["a_tagged.jpg", "b_tagged.jpg", "c_tagged.jpg"]
        );
        let archive_file = &outcome.archive.as_ref().unwrap().file_name;
        assert!(archive_file.starts_with("tagged-images-") && archive_file.ends_with(".zip"));
        assert_eq!(
            session.lock().await.bulk_status,
            AggregateStatus::Success("Wrote 3 images".to_string())
        );
    }

    #[tokio::test]
    async fn test_writes_are_sequential_and_in_store_order() {
        let names = ["1.jpg", "2.jpg", "3.jpg", "4.jpg", "5.jpg"];
        let (session, _) = session_with(&names).await;
        let writer = Arc::new(FakeMetadataWriter::succeeding());

        orchestrator(writer.clone()).write_all(&session).await.unwrap();

        let seen: Vec<String> = writer.requests().into_iter().map(|r| r.file.name).collect();
        assert_eq!(seen, names);
        assert_eq!(writer.max_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_partial_failure_archives_only_successes() {
        let (session, ids) = session_with(&["one.jpg", "two.jpg"]).await;
        let writer = Arc::new(FakeMetadataWriter::failing_for(&["two.jpg"], "disk full"));

        let outcome = orchestrator(writer.clone()).write_all(&session).await.unwrap();

        assert_eq!(outcome.total, 2);
        assert_eq!(outcome.succeeded, 1);
        assert_eq!(outcome.failed, 1);
        assert_eq!(zip_names(&outcome), vec!["one_tagged.jpg"]);

        let state = session.lock().await;
        assert_eq!(state.store.get(ids[0]).unwrap().write_status(), &WriteStatus::Success);
        assert_eq!(
            state.store.get(ids[1]).unwrap().write_status(),
            &WriteStatus::Error("disk full".to_string())
        );
        match &state.bulk_status {
            AggregateStatus::Success(msg) => assert!(msg.contains("1 failed"), "{}", msg),
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_m_of_n_successes() {
        let (session, _) = session_with(&["a.jpg", "b.jpg", "c.jpg", "d.jpg", "e.jpg"]).await;
        let writer = Arc::new(FakeMetadataWriter::failing_for(&["b.jpg", "d.jpg"], "nope"));

        let outcome = orchestrator(writer.clone()).write_all(&session).await.unwrap();

        assert_eq!(writer.requests().len(), 5);
        assert_eq!(outcome.archive.as_ref().unwrap().entries, 3);
        assert_eq!(zip_names(&outcome).len(), 3);
        assert_eq!(outcome.failed, 2);
    }

    #[tokio::test]
    async fn test_zero_successes_produces_no_archive() {
        let (session, _) = session_with(&["a.jpg", "b.jpg"]).await;
        let writer = Arc::new(FakeMetadataWriter::failing_for(&["a.jpg", "b.jpg"], "broken"));

        let outcome = orchestrator(writer).write_all(&session).await.unwrap();

        assert!(outcome.archive.is_none());
        assert_eq!(outcome.failed, 2);
        assert_eq!(
            session.lock().await.bulk_status,
            AggregateStatus::Error("All 2 writes failed".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_session_is_rejected_without_calls() {
        let session = Arc::new(Session::new(10, PreviewCache::new()));
        let writer = Arc::new(FakeMetadataWriter::succeeding());

        let err = orchestrator(writer.clone()).write_all(&session).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(writer.requests().is_empty());
        assert_eq!(
            session.lock().await.bulk_status,
            AggregateStatus::Error(MSG_NO_IMAGES.to_string())
        );
    }

    #[tokio::test]
    async fn test_same_base_names_do_not_collide_in_archive() {
        let session = Arc::new(Session::new(10, PreviewCache::new()));
        session
            .add_files(vec![jpeg("a.jpg", 1), jpeg("a.jpg", 2), jpeg("a.png", 1)])
            .await;
        let writer = Arc::new(FakeMetadataWriter::succeeding());

        let outcome = orchestrator(writer).write_all(&session).await.unwrap();

        assert_eq!(
            zip_names(&outcome),
            vec!["a_tagged.jpg", "a_tagged (2).jpg", "a_tagged (3).jpg"]
        );
    }

    #[tokio::test]
    async fn test_pass_settles_after_caller_stops_waiting() {
        let (session, ids) = session_with(&["a.jpg", "b.jpg"]).await;
        let writer =
            Arc::new(FakeMetadataWriter::succeeding().with_delay(Duration::from_millis(30)));
        let orchestrator = orchestrator(writer.clone());

        let dropped =
            tokio::time::timeout(Duration::from_millis(10), orchestrator.write_all(&session))
                .await;
        assert!(dropped.is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        {
            let state = session.lock().await;
            assert_eq!(
                state.bulk_status,
                AggregateStatus::Success("Wrote 2 images".to_string())
            );
            for id in &ids {
                assert_eq!(state.store.get(*id).unwrap().write_status(), &WriteStatus::Success);
            }
        }

        // The session accepts a new pass once the abandoned one has settled
        assert!(orchestrator.write_all(&session).await.is_ok());
        assert_eq!(writer.requests().len(), 4);
    }
}
