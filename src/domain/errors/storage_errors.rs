use crate::domain::value_objects::ObjectKey;

/// Errors reported by the object store adapter
#[derive(Debug, Clone)]
pub enum StorageError {
    /// Object not found
    ObjectNotFound { key: ObjectKey },

    /// Signed write rejected because the authorization is expired or forged
    AuthorizationRejected { key: String, reason: String },

    /// The store did not answer within the configured timeout
    Timeout { operation: String, seconds: u64 },

    /// The store cannot mint upload credentials
    SigningUnavailable { message: String },

    /// Validation error
    ValidationError { message: String },

    /// Infrastructure error with external source
    InfrastructureError {
        message: String,
        source: Option<String>, // Store error as string to allow Clone
    },
}

impl StorageError {
    /// Whether the fault lies with the store rather than the request
    pub fn is_upstream_fault(&self) -> bool {
        matches!(
            self,
            StorageError::Timeout { .. }
                | StorageError::SigningUnavailable { .. }
                | StorageError::InfrastructureError { .. }
        )
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::ObjectNotFound { key } => {
                write!(f, "Object not found: {}", key)
            }
            StorageError::AuthorizationRejected { key, reason } => {
                write!(f, "Upload authorization rejected for '{}': {}", key, reason)
            }
            StorageError::Timeout { operation, seconds } => {
                write!(
                    f,
                    "Store operation '{}' timed out after {}s",
                    operation, seconds
                )
            }
            StorageError::SigningUnavailable { message } => {
                write!(f, "Cannot mint upload credentials: {}", message)
            }
            StorageError::ValidationError { message } => {
                write!(f, "Validation error: {}", message)
            }
            StorageError::InfrastructureError { message, .. } => {
                write!(f, "Infrastructure error: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
