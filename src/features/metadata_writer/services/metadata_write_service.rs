use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::entries::models::WriteStatus;
use crate::features::metadata_writer::models::{Delivery, WriteRequest, WriteResult};
use crate::features::metadata_writer::services::MetadataWriter;
use crate::features::sessions::services::Session;
use crate::shared::constants::{MSG_INTERRUPTED, MSG_WRITE_NETWORK};

/// Drives one entry through loading -> success | error around a writer call
pub struct MetadataWriteService {
    writer: Arc<dyn MetadataWriter>,
}

impl MetadataWriteService {
    pub fn new(writer: Arc<dyn MetadataWriter>) -> Self {
        Self { writer }
    }

    /// Write metadata for one entry of `session`.
    ///
    /// Only a missing entry yields `Err`. Writer failures land in the
    /// entry's status and in `WriteResult::outcome`. The write runs on its
    /// own task, so the entry settles even when the caller stops waiting.
    pub async fn write_entry(
        self: &Arc<Self>,
        session: &Arc<Session>,
        entry_id: Uuid,
        delivery: Delivery,
    ) -> Result<WriteResult> {
        let service = Arc::clone(self);
        let write_session = Arc::clone(session);
        let joined = tokio::spawn(async move {
            service.run_write(&write_session, entry_id, delivery).await
        })
        .await;

        match joined {
            Ok(result) => result,
            Err(e) => {
                error!("Write task for entry {} failed: {}", entry_id, e);
                session.lock().await.store.update(entry_id, |entry| {
                    if entry.write_status() == &WriteStatus::Loading {
                        entry.set_write_status(WriteStatus::Error(MSG_INTERRUPTED.to_string()));
                    }
                });
                Err(AppError::Internal(format!("Write task failed: {}", e)))
            }
        }
    }

    /// Write one entry on the caller's task. Used inside passes that are
    /// already detached.
    pub(crate) async fn run_write(
        &self,
        session: &Session,
        entry_id: Uuid,
        delivery: Delivery,
    ) -> Result<WriteResult> {
        let request = {
            let mut state = session.lock().await;
            let entry = state
                .store
                .get(entry_id)
                .ok_or_else(|| AppError::NotFound(format!("Entry {} not found", entry_id)))?;

            let request = WriteRequest {
                file: entry.raw_file().clone(),
                title: entry.title().to_string(),
                tags: entry.tags().to_string(),
            };
            state
                .store
                .update(entry_id, |e| e.set_write_status(WriteStatus::Loading));
            request
        };

        let file_name = request.file.name.clone();
        let (written_title, written_tags) = (request.title.clone(), request.tags.clone());
        let outcome = self.writer.write(request).await.map_err(|e| match e {
            AppError::Transport(detail) => {
                warn!("Write for {} failed in transport: {}", file_name, detail);
                MSG_WRITE_NETWORK.to_string()
            }
            other => {
                warn!("Write for {} failed: {}", file_name, other);
                other.user_message()
            }
        });

        let status = match &outcome {
            Ok(_) => WriteStatus::Success,
            Err(message) => WriteStatus::Error(message.clone()),
        };
        let mut settled = false;
        let present = session.lock().await.store.update(entry_id, |e| {
            // An edit during the write leaves the entry idle; the result no longer describes it
            if e.write_status() == &WriteStatus::Loading
                && e.title() == written_title
                && e.tags() == written_tags
            {
                e.set_write_status(status);
                settled = true;
            }
        });
        if !present {
            debug!("Entry {} was removed while its write was in flight", entry_id);
        } else if !settled {
            debug!("Entry {} changed while its write was in flight", entry_id);
        }

        if let Ok(artifact) = &outcome {
            info!(
                "Session {}: wrote {} ({} bytes)",
                session.id(),
                artifact.file_name,
                artifact.data.len()
            );
        }

        let download = match (&outcome, delivery) {
            (Ok(artifact), Delivery::Immediate) => Some(artifact.clone()),
            _ => None,
        };

        Ok(WriteResult {
            entry_id,
            outcome,
            download,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::features::entries::models::{EntryEdit, PreviewCache};
    use crate::shared::test_helpers::{jpeg, FakeMetadataWriter};

    async fn session_with(names: &[&str]) -> (Arc<Session>, Vec<Uuid>) {
        let session = Arc::new(Session::new(10, PreviewCache::new()));
        session
            .add_files(names.iter().map(|n| jpeg(n, 1)).collect())
            .await;
        let ids = session.lock().await.store.ids();
        (session, ids)
    }

    #[tokio::test]
    async fn test_success_sets_status_and_delivers_immediately() {
        let (session, ids) = session_with(&["beach.jpg"]).await;
        session
            .edit_entry(
                ids[0],
                EntryEdit {
                    title: Some("Beach".to_string()),
                    tags: Some("sand, sea".to_string()),
                },
            )
            .await
            .unwrap();
        let writer = Arc::new(FakeMetadataWriter::succeeding());
        let service = Arc::new(MetadataWriteService::new(writer.clone()));

        let result = service
            .write_entry(&session, ids[0], Delivery::Immediate)
            .await
            .unwrap();

        assert!(result.outcome.is_ok());
        let download = result.download.expect("immediate delivery");
        assert_eq!(download.file_name, "beach_tagged.jpg");
        assert_eq!(
            session.lock().await.store.get(ids[0]).unwrap().write_status(),
            &WriteStatus::Success
        );

        let seen = writer.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].title, "Beach");
        assert_eq!(seen[0].tags, "sand, sea");
    }

    #[tokio::test]
    async fn test_deferred_delivery_keeps_artifact_out_of_download() {
        let (session, ids) = session_with(&["a.jpg"]).await;
        let service = Arc::new(MetadataWriteService::new(Arc::new(
            FakeMetadataWriter::succeeding(),
        )));

        let result = service
            .write_entry(&session, ids[0], Delivery::Deferred)
            .await
            .unwrap();

        assert!(result.outcome.is_ok());
        assert!(result.download.is_none());
    }

    #[tokio::test]
    async fn test_provider_error_message_is_kept() {
        let (session, ids) = session_with(&["a.jpg"]).await;
        let service = Arc::new(MetadataWriteService::new(Arc::new(
            FakeMetadataWriter::failing_for(&["a.jpg"], "disk full"),
        )));

        let result = service
            .write_entry(&session, ids[0], Delivery::Immediate)
            .await
            .unwrap();

        assert_eq!(result.outcome.unwrap_err(), "disk full");
        assert!(result.download.is_none());
        assert_eq!(
            session.lock().await.store.get(ids[0]).unwrap().write_status(),
            &WriteStatus::Error("disk full".to_string())
        );
    }

    #[tokio::test]
    async fn test_transport_error_becomes_generic_message() {
        let (session, ids) = session_with(&["a.jpg"]).await;
        let service = Arc::new(MetadataWriteService::new(Arc::new(
            FakeMetadataWriter::unreachable(),
        )));

        let result = service
            .write_entry(&session, ids[0], Delivery::Immediate)
            .await
            .unwrap();

        assert_eq!(result.outcome.unwrap_err(), MSG_WRITE_NETWORK);
        assert_eq!(
            session.lock().await.store.get(ids[0]).unwrap().write_status(),
            &WriteStatus::Error(MSG_WRITE_NETWORK.to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_entry_is_not_found() {
        let (session, _) = session_with(&["a.jpg"]).await;
        let writer = Arc::new(FakeMetadataWriter::succeeding());
        let service = Arc::new(MetadataWriteService::new(writer.clone()));

        let err = service
            .write_entry(&session, Uuid::now_v7(), Delivery::Immediate)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(writer.requests().is_empty());
    }

    async fn wait_for_loading(session: &Session, id: Uuid) {
        while session.lock().await.store.get(id).map(|e| e.write_status().clone())
            != Some(WriteStatus::Loading)
        {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    #[tokio::test]
    async fn test_edit_during_write_leaves_entry_idle() {
        let (session, ids) = session_with(&["a.jpg"]).await;
        let writer =
            Arc::new(FakeMetadataWriter::succeeding().with_delay(Duration::from_millis(50)));
        let service = Arc::new(MetadataWriteService::new(writer.clone()));

        let id = ids[0];
        let write = tokio::spawn({
            let service = Arc::clone(&service);
            let session = Arc::clone(&session);
            async move { service.write_entry(&session, id, Delivery::Immediate).await }
        });
        wait_for_loading(&session, ids[0]).await;
        session
            .edit_entry(
                ids[0],
                EntryEdit {
                    title: Some("new title".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let result = write.await.unwrap().unwrap();

        assert!(result.outcome.is_ok());
        assert_eq!(writer.requests()[0].title, "");
        let state = session.lock().await;
        let entry = state.store.get(ids[0]).unwrap();
        assert_eq!(entry.title(), "new title");
        assert_eq!(entry.write_status(), &WriteStatus::Idle);
    }

    #[tokio::test]
    async fn test_write_settles_after_caller_stops_waiting() {
        let (session, ids) = session_with(&["a.jpg"]).await;
        let service = Arc::new(MetadataWriteService::new(Arc::new(
            FakeMetadataWriter::succeeding().with_delay(Duration::from_millis(50)),
        )));

        let dropped = tokio::time::timeout(
            Duration::from_millis(10),
            service.write_entry(&session, ids[0], Delivery::Immediate),
        )
        .await;
        assert!(dropped.is_err());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(
            session.lock().await.store.get(ids[0]).unwrap().write_status(),
            &WriteStatus::Success
        );
    }
}
