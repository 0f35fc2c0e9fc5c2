use std::sync::Arc;

use tracing::{error, info, warn};

use crate::core::error::{AppError, Result};
use crate::features::annotation::models::{AnnotationItem, AnnotationReport};
use crate::features::annotation::services::{merge_annotations, AnnotationProvider};
use crate::features::entries::models::AggregateStatus;
use crate::features::sessions::services::Session;
use crate::shared::constants::{MSG_INTERRUPTED, MSG_NO_IMAGES, MSG_NO_SUGGESTIONS};

/// Runs one annotation round for a session and folds the result back into
/// its store and AI status
pub struct AnnotationService {
    provider: Arc<dyn AnnotationProvider>,
    max_batch_size: usize,
}

impl AnnotationService {
    pub fn new(provider: Arc<dyn AnnotationProvider>, max_batch_size: usize) -> Self {
        Self {
            provider,
            max_batch_size,
        }
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Request suggestions for every entry currently in the session.
    ///
    /// Validation problems return `Err` without calling the provider.
    /// Provider and transport failures are reported through the returned
    /// status, never as `Err`. The round runs on its own task, so it settles
    /// `ai_status` even when the caller stops waiting.
    pub async fn annotate(self: &Arc<Self>, session: &Arc<Session>) -> Result<AnnotationReport> {
        let service = Arc::clone(self);
        let round_session = Arc::clone(session);
        let joined = tokio::spawn(async move { service.run_round(&round_session).await }).await;

        match joined {
            Ok(report) => report,
            Err(e) => {
                error!("Session {}: annotation task failed: {}", session.id(), e);
                let mut state = session.lock().await;
                if state.ai_status.is_loading() {
                    state.ai_status = AggregateStatus::Error(MSG_INTERRUPTED.to_string());
                }
                Err(AppError::Internal(format!("Annotation task failed: {}", e)))
            }
        }
    }

    async fn run_round(&self, session: &Session) -> Result<AnnotationReport> {
        let items = {
            let mut state = session.lock().await;

            if state.ai_status.is_loading() {
                return Err(AppError::Validation(
                    "Suggestions are already being generated".to_string(),
                ));
            }

            if state.store.is_empty() {
                state.ai_status = AggregateStatus::Error(MSG_NO_IMAGES.to_string());
                return Err(AppError::Validation(MSG_NO_IMAGES.to_string()));
            }

            if state.store.len() > self.max_batch_size {
                let message = format!(
                    "At most {} images can be annotated at once ({} selected)",
                    self.max_batch_size,
                    state.store.len()
                );
                state.ai_status = AggregateStatus::Error(message.clone());
                return Err(AppError::Validation(message));
            }

            let items: Vec<AnnotationItem> = state
                .store
                .iter()
                .map(|entry| AnnotationItem {
                    id: entry.id(),
                    file: entry.raw_file().clone(),
                })
                .collect();

            state.ai_status = AggregateStatus::Loading(format!(
                "Generating suggestions for {} images",
                items.len()
            ));
            items
        };

        info!(
            "Session {}: requesting suggestions for {} images",
            session.id(),
            items.len()
        );

        let outcome = self.provider.suggest(&items).await;

        // Re-read the store: entries may have been edited or removed meanwhile
        let mut state = session.lock().await;
        let report = match outcome {
            Err(e) => {
                warn!("Session {}: annotation failed: {}", session.id(), e);
                AnnotationReport {
                    matched: 0,
                    missing: state.store.len(),
                    status: AggregateStatus::Error(e.user_message()),
                }
            }
            Ok(suggestions) if suggestions.is_empty() => {
                warn!("Session {}: annotation returned no results", session.id());
                AnnotationReport {
                    matched: 0,
                    missing: state.store.len(),
                    status: AggregateStatus::Error(MSG_NO_SUGGESTIONS.to_string()),
                }
            }
            Ok(suggestions) => {
                let merge = merge_annotations(&mut state.store, &suggestions);
                if merge.matched == 0 {
                    // Every suggested entry was removed while the round ran
                    warn!(
                        "Session {}: no suggestion matched a current entry",
                        session.id()
                    );
                    AnnotationReport {
                        matched: 0,
                        missing: merge.missing,
                        status: AggregateStatus::Error(MSG_NO_SUGGESTIONS.to_string()),
                    }
                } else {
                    let message = if merge.missing > 0 {
                        format!(
                            "Suggestions applied to {} images; {} missing",
                            merge.matched, merge.missing
                        )
                    } else {
                        format!("Suggestions applied to {} images", merge.matched)
                    };
                    info!("Session {}: {}", session.id(), message);
                    AnnotationReport {
                        matched: merge.matched,
                        missing: merge.missing,
                        status: AggregateStatus::Success(message),
                    }
                }
            }
        };

        state.ai_status = report.status.clone();
        Ok(report)
    }
}
