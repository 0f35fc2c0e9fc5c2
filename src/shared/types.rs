use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
}

/// `{"error": "..."}` body returned by both external collaborators
#[derive(Debug, Deserialize)]
pub struct ServiceErrorDto {
    pub error: String,
}

impl ServiceErrorDto {
    /// Non-blank error message from a raw body, if it has one
    pub fn message_from(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ServiceErrorDto>(body)
            .ok()
            .map(|b| b.error.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}
