use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::body::Bytes;
use uuid::Uuid;

/// Bytes served for an entry's thumbnail view
#[derive(Debug, Clone)]
pub struct PreviewData {
    pub content_type: String,
    pub data: Bytes,
}

/// Process-wide store of preview payloads keyed by entry id.
///
/// Entries never touch the map directly; they hold a [`PreviewHandle`]
/// whose drop removes the payload.
#[derive(Clone, Default)]
pub struct PreviewCache {
    inner: Arc<Mutex<HashMap<Uuid, PreviewData>>>,
}

impl PreviewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a preview and hand back the handle that owns it
    pub fn register(&self, entry_id: Uuid, preview: PreviewData) -> PreviewHandle {
        self.lock().insert(entry_id, preview);
        PreviewHandle {
            entry_id,
            cache: self.clone(),
        }
    }

    pub fn get(&self, entry_id: Uuid) -> Option<PreviewData> {
        self.lock().get(&entry_id).cloned()
    }

    /// Number of previews currently held
    pub fn live(&self) -> usize {
        self.lock().len()
    }

    fn release(&self, entry_id: Uuid) {
        if self.lock().remove(&entry_id).is_none() {
            tracing::warn!("Preview for entry {} was already released", entry_id);
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, PreviewData>> {
        // A poisoned map still holds valid previews
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for PreviewCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewCache")
            .field("live", &self.live())
            .finish()
    }
}

/// Exclusive ownership of one registered preview; released on drop
pub struct PreviewHandle {
    entry_id: Uuid,
    cache: PreviewCache,
}

impl PreviewHandle {
    pub fn entry_id(&self) -> Uuid {
        self.entry_id
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.cache.release(self.entry_id);
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("entry_id", &self.entry_id)
            .finish()
    }
}
