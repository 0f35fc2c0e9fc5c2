use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;

use crate::core::error::{AppError, Result};
use crate::features::annotation::models::{AnnotationItem, AnnotationSuggestion};
use crate::features::annotation::services::AnnotationProvider;
use crate::features::entries::models::RawFile;
use crate::features::metadata_writer::models::{Artifact, WriteRequest};
use crate::features::metadata_writer::services::download_name;
use crate::features::metadata_writer::services::MetadataWriter;
use crate::shared::constants::OUTPUT_CONTENT_TYPE;

/// Small JPEG-typed file; `name` and `last_modified` drive its signature
pub fn jpeg(name: &str, last_modified: i64) -> RawFile {
    RawFile::new(
        name,
        "image/jpeg",
        last_modified,
        Bytes::from_static(b"\xFF\xD8\xFF\xE0fake-jpeg"),
    )
}

enum Reply {
    Suggestions(Vec<AnnotationSuggestion>),
    Provider(String),
    Transport(String),
}

/// Annotation provider with a canned reply
pub struct FakeAnnotationProvider {
    reply: Reply,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeAnnotationProvider {
    pub fn returning(suggestions: Vec<AnnotationSuggestion>) -> Self {
        Self {
            reply: Reply::Suggestions(suggestions),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: AppError) -> Self {
        let reply = match error {
            AppError::Transport(msg) => Reply::Transport(msg),
            other => Reply::Provider(other.user_message()),
        };
        Self {
            reply,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Hold each reply back for `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnnotationProvider for FakeAnnotationProvider {
    async fn suggest(&self, _items: &[AnnotationItem]) -> Result<Vec<AnnotationSuggestion>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        match &self.reply {
            Reply::Suggestions(s) => Ok(s.clone()),
            Reply::Provider(msg) => Err(AppError::ExternalServiceError(msg.clone())),
            Reply::Transport(msg) => Err(AppError::Transport(msg.clone())),
        }
    }
}

/// Metadata writer that records requests and tracks overlapping calls
pub struct FakeMetadataWriter {
    failures: HashMap<String, String>,
    unreachable: bool,
    delay: Duration,
    requests: Mutex<Vec<WriteRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeMetadataWriter {
    fn build(failures: HashMap<String, String>, unreachable: bool) -> Self {
        Self {
            failures,
            unreachable,
            delay: Duration::from_millis(5),
            requests: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn succeeding() -> Self {
        Self::build(HashMap::new(), false)
    }

    /// Fail with `message` for every file named in `names`
    pub fn failing_for(names: &[&str], message: &str) -> Self {
        let failures = names
            .iter()
            .map(|n| (n.to_string(), message.to_string()))
            .collect();
        Self::build(failures, false)
    }

    pub fn unreachable() -> Self {
        Self::build(HashMap::new(), true)
    }

    /// Time each write takes
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<WriteRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataWriter for FakeMetadataWriter {
    async fn write(&self, request: WriteRequest) -> Result<Artifact> {
        self.requests.lock().unwrap().push(request.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.unreachable {
            return Err(AppError::Transport("connection refused".to_string()));
        }
        if let Some(message) = self.failures.get(&request.file.name) {
            return Err(AppError::ExternalServiceError(message.clone()));
        }

        Ok(Artifact {
            file_name: download_name(&request.file),
            content_type: OUTPUT_CONTENT_TYPE.to_string(),
            data: Bytes::from(format!("tagged:{}", request.file.name)),
        })
    }
}
