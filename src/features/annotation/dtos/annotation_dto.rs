use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One manifest row sent alongside the image parts, in part order
#[derive(Debug, Clone, Serialize)]
pub struct ManifestItemDto {
    pub id: Uuid,
    pub name: String,
}

/// Body returned by the annotation service
#[derive(Debug, Deserialize)]
pub struct AnnotationResponseDto {
    #[serde(default)]
    pub results: Option<Vec<AnnotationResultDto>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A single suggestion; every field is optional on the wire
#[derive(Debug, Default, Deserialize)]
pub struct AnnotationResultDto {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Option<TagsField>,
}

/// Tags arrive either as a list or as one delimited string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagsField {
    List(Vec<serde_json::Value>),
    Text(String),
}
