use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use crate::core::config::MetadataWriterConfig;
use crate::core::error::{AppError, Result};
use crate::features::metadata_writer::models::{Artifact, WriteRequest};
use crate::features::metadata_writer::services::download_name;
use crate::shared::constants::{MSG_WRITE_FAILED, OUTPUT_CONTENT_TYPE};
use crate::shared::types::ServiceErrorDto;

/// Writes title and keywords into an image and returns the resulting JPEG
#[async_trait]
pub trait MetadataWriter: Send + Sync {
    async fn write(&self, request: WriteRequest) -> Result<Artifact>;
}

/// Multipart HTTP client for the metadata-writer service.
///
/// Calls pass through a semaphore so that no more than
/// `max_concurrency` writes are in flight across the whole process.
pub struct HttpMetadataWriter {
    client: Client,
    service_url: String,
    gate: Semaphore,
}

impl HttpMetadataWriter {
    pub fn new(config: &MetadataWriterConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent("MetastampCore/0.1 (metadata-writer)")
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            service_url: config.service_url.clone(),
            gate: Semaphore::new(config.max_concurrency.max(1)),
        })
    }

    fn build_form(request: &WriteRequest) -> Result<Form> {
        let part = Part::bytes(request.file.data.to_vec())
            .file_name(request.file.name.clone())
            .mime_str(request.file.media_type())
            .map_err(|e| AppError::Internal(format!("Invalid media type: {}", e)))?;

        Ok(Form::new()
            .part("file", part)
            .text("title", request.title.clone())
            .text("tags", request.tags.clone()))
    }
}

#[async_trait]
impl MetadataWriter for HttpMetadataWriter {
    async fn write(&self, request: WriteRequest) -> Result<Artifact> {
        let form = Self::build_form(&request)?;

        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| AppError::Internal("Metadata writer gate closed".to_string()))?;

        debug!(
            "Writing metadata for {} ({} bytes)",
            request.file.name, request.file.size
        );

        let response = self
            .client
            .post(&self.service_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!("Metadata writer request failed: {:?}", e);
                AppError::Transport(format!("Metadata writer unreachable: {}", e))
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            error!("Failed to read metadata writer response: {:?}", e);
            AppError::Transport(format!("Metadata writer response unreadable: {}", e))
        })?;

        if !status.is_success() {
            let message = ServiceErrorDto::message_from(&body)
                .unwrap_or_else(|| MSG_WRITE_FAILED.to_string());
            warn!(
                "Metadata writer returned {} for {}: {}",
                status, request.file.name, message
            );
            return Err(AppError::ExternalServiceError(message));
        }

        if body.is_empty() {
            return Err(AppError::ExternalServiceError(
                "The metadata writer returned an empty file".to_string(),
            ));
        }

        Ok(Artifact {
            file_name: download_name(&request.file),
            content_type: OUTPUT_CONTENT_TYPE.to_string(),
            data: body,
        })
    }
}
