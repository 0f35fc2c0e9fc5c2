use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::core::config::AnnotationConfig;
use crate::core::error::{AppError, Result};
use crate::features::annotation::dtos::{AnnotationResponseDto, ManifestItemDto};
use crate::features::annotation::models::{AnnotationItem, AnnotationSuggestion};
use crate::features::annotation::services::normalize_tags;
use crate::shared::constants::MSG_ANNOTATION_FAILED;
use crate::shared::types::ServiceErrorDto;

/// Source of title/tag suggestions for a batch of images
#[async_trait]
pub trait AnnotationProvider: Send + Sync {
    /// Request suggestions for every item in one call.
    ///
    /// Returned suggestions are correlated to item ids; an empty list means
    /// the provider answered without results.
    async fn suggest(&self, items: &[AnnotationItem]) -> Result<Vec<AnnotationSuggestion>>;
}

/// Multipart HTTP client for the annotation service
pub struct HttpAnnotationClient {
    client: Client,
    service_url: String,
}

impl HttpAnnotationClient {
    pub fn new(config: &AnnotationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent("MetastampCore/0.1 (annotation)")
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            service_url: config.service_url.clone(),
        })
    }

    /// `manifest` JSON followed by one `files` part per item, same order
    fn build_form(items: &[AnnotationItem]) -> Result<Form> {
        let manifest: Vec<ManifestItemDto> = items
            .iter()
            .map(|item| ManifestItemDto {
                id: item.id,
                name: item.file.name.clone(),
            })
            .collect();
        let manifest = serde_json::to_string(&manifest)
            .map_err(|e| AppError::Internal(format!("Failed to encode manifest: {}", e)))?;

        let mut form = Form::new().text("manifest", manifest);
        for item in items {
            let part = Part::bytes(item.file.data.to_vec())
                .file_name(item.file.name.clone())
                .mime_str(item.file.media_type())
                .map_err(|e| AppError::Internal(format!("Invalid media type: {}", e)))?;
            form = form.part("files", part);
        }

        Ok(form)
    }
}

#[async_trait]
impl AnnotationProvider for HttpAnnotationClient {
    async fn suggest(&self, items: &[AnnotationItem]) -> Result<Vec<AnnotationSuggestion>> {
        let form = Self::build_form(items)?;

        debug!(
            "Requesting suggestions for {} images from {}",
            items.len(),
            self.service_url
        );

        let response = self
            .client
            .post(&self.service_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!("Annotation request failed: {:?}", e);
                AppError::Transport("Could not reach the suggestion service".to_string())
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            error!("Failed to read annotation response: {:?}", e);
            AppError::Transport("The suggestion service response could not be read".to_string())
        })?;

        if !status.is_success() {
            let message = ServiceErrorDto::message_from(&body)
                .unwrap_or_else(|| MSG_ANNOTATION_FAILED.to_string());
            warn!("Annotation service returned {}: {}", status, message);
            return Err(AppError::ExternalServiceError(message));
        }

        parse_suggestions(items, &body)
    }
}

/// Decode a success body and correlate each result to an item.
///
/// Results carry explicit ids; a result without one falls back to the
/// item at the same position in the manifest.
pub fn parse_suggestions(
    items: &[AnnotationItem],
    body: &[u8],
) -> Result<Vec<AnnotationSuggestion>> {
    let parsed: AnnotationResponseDto = serde_json::from_slice(body).map_err(|e| {
        warn!("Unparseable annotation response: {}", e);
        AppError::Transport("The suggestion service returned an unreadable response".to_string())
    })?;

    let results = match (parsed.results, parsed.error) {
        (Some(results), _) => results,
        (None, Some(error)) if !error.trim().is_empty() => {
            return Err(AppError::ExternalServiceError(error));
        }
        (None, _) => Vec::new(),
    };

    let suggestions = results
        .into_iter()
        .enumerate()
        .filter_map(|(index, result)| {
            let id = match result.id.as_deref() {
                Some(raw) => match Uuid::parse_str(raw.trim()) {
                    Ok(id) => id,
                    Err(_) => {
                        debug!("Ignoring suggestion with unknown id '{}'", raw);
                        return None;
                    }
                },
                None => items.get(index)?.id,
            };

            let title = result
                .title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());
            let tags = result.tags.as_ref().map(normalize_tags).unwrap_or_default();

            Some(AnnotationSuggestion { id, title, tags })
        })
        .collect();

    Ok(suggestions)
}
