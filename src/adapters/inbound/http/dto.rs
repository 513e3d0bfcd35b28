use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    errors::{PortalError, StorageError},
    models::{UploadAuthorization, UploadMethod},
};

use crate::adapters::outbound::storage::{EXPIRES_PARAM, SIGNATURE_PARAM};

/// Query for the upload authorization endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct UploadUrlQuery {
    pub filename: Option<String>,
}

/// Query form of the download endpoint, `?file=<key>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadQuery {
    pub file: Option<String>,
}

/// Listing output selection
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingQuery {
    pub format: Option<String>,
}

/// Signature carried by a development store upload URL
#[derive(Debug, Clone, Deserialize)]
pub struct StoreAuthQuery {
    #[serde(rename = "X-Portal-Expires")]
    pub expires: Option<i64>,
    #[serde(rename = "X-Portal-Signature")]
    pub signature: Option<String>,
}

/// DTO for an issued upload authorization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadUrlResponseDto {
    pub id: Uuid,
    pub key: String,
    pub url: String,
    pub method: UploadMethod,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<UploadAuthorization> for UploadUrlResponseDto {
    fn from(auth: UploadAuthorization) -> Self {
        Self {
            id: auth.id,
            key: auth.target_key.to_string(),
            url: auth.url,
            method: auth.method,
            issued_at: auth.issued_at,
            expires_at: auth.expires_at,
        }
    }
}

/// DTO for a development store write
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredObjectDto {
    pub key: String,
    pub size: u64,
    pub etag: Option<String>,
}

/// DTO for error responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub error: String,
    pub message: String,
    pub path: String,
    pub retryable: bool,
}

impl ErrorResponseDto {
    pub fn from_portal_error(error: &PortalError) -> Self {
        Self {
            error: error.kind().to_string(),
            message: error.to_string(),
            path: error.path().to_string(),
            retryable: error.is_retryable(),
        }
    }

    pub fn from_storage_error(path: &str, error: &StorageError) -> Self {
        let kind = match error {
            StorageError::ObjectNotFound { .. } => "NotFound",
            StorageError::AuthorizationRejected { .. } => "AccessDenied",
            StorageError::ValidationError { .. } => "InvalidKey",
            _ => "UpstreamUnavailable",
        };
        Self {
            error: kind.to_string(),
            message: error.to_string(),
            path: path.to_string(),
            retryable: error.is_upstream_fault(),
        }
    }

    /// Rejection for a store write without signature parameters
    pub fn missing_signature(path: &str) -> Self {
        Self {
            error: "AccessDenied".to_string(),
            message: format!(
                "upload requires {} and {} query parameters",
                EXPIRES_PARAM, SIGNATURE_PARAM
            ),
            path: path.to_string(),
            retryable: false,
        }
    }
}
