use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::time::interval;
use uuid::Uuid;

use crate::core::config::SessionConfig;
use crate::core::error::{AppError, Result};
use crate::features::entries::models::PreviewCache;
use crate::features::sessions::services::Session;

/// In-memory map of live sessions.
///
/// Nothing outlives the process. Idle sessions are torn down by
/// [`SessionRegistry::run_sweeper`].
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<Session>>>,
    previews: PreviewCache,
    config: SessionConfig,
}

impl SessionRegistry {
    pub fn new(config: SessionConfig, previews: PreviewCache) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            previews,
            config,
        }
    }

    pub fn capacity(&self) -> usize {
        self.config.max_entries
    }

    pub async fn create(&self) -> Arc<Session> {
        let session = Arc::new(Session::new(self.config.max_entries, self.previews.clone()));
        self.sessions
            .write()
            .await
            .insert(session.id(), Arc::clone(&session));
        tracing::info!("Session {} created", session.id());
        session
    }

    pub async fn get(&self, id: Uuid) -> Result<Arc<Session>> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))
    }

    /// Remove a session and release all of its entries
    pub async fn teardown(&self, id: Uuid) -> Result<()> {
        let session = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))?;

        let released = session.clear().await;
        tracing::info!("Session {} torn down ({} entries released)", id, released);
        Ok(())
    }

    /// Tear down every session idle for longer than the configured TTL
    pub async fn sweep_idle(&self) -> usize {
        let expired: Vec<Arc<Session>> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<Uuid> = sessions
                .values()
                .filter(|s| s.idle_for() > self.config.idle_ttl)
                .map(|s| s.id())
                .collect();
            ids.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        for session in &expired {
            let released = session.clear().await;
            tracing::debug!(
                "Session {} expired ({} entries released)",
                session.id(),
                released
            );
        }

        expired.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Periodically expire idle sessions; runs until the process exits
    pub async fn run_sweeper(self: Arc<Self>) {
        tracing::info!(
            "Starting session sweeper (ttl={:?}, every {:?})",
            self.config.idle_ttl,
            self.config.sweep_interval
        );

        let mut ticker = interval(self.config.sweep_interval);
        loop {
            ticker.tick().await;

            let expired = self.sweep_idle().await;
            if expired > 0 {
                tracing::info!("Expired {} idle sessions", expired);
            }
        }
    }
}
