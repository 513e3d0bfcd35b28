use crate::domain::{errors::StorageError, models::RouteClass};

/// Errors surfaced by the portal's request-time decision layer.
///
/// Every variant carries the offending path so callers can decide on retry
/// without parsing the message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortalError {
    /// Client-supplied path escapes the namespace or is malformed
    #[error("invalid key '{path}': {reason}")]
    InvalidKey { path: String, reason: String },

    /// No object or virtual directory exists at the path
    #[error("not found: '{path}'")]
    NotFound { path: String },

    /// The method is not permitted for the route class the path matched
    #[error("method {method} not allowed for {class} route '{path}'")]
    MethodNotAllowed {
        path: String,
        method: String,
        class: RouteClass,
    },

    /// The object store failed or timed out
    #[error("upstream unavailable for '{path}': {message}")]
    UpstreamUnavailable { path: String, message: String },
}

impl PortalError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            PortalError::InvalidKey { .. } => "InvalidKey",
            PortalError::NotFound { .. } => "NotFound",
            PortalError::MethodNotAllowed { .. } => "MethodNotAllowed",
            PortalError::UpstreamUnavailable { .. } => "UpstreamUnavailable",
        }
    }

    pub fn path(&self) -> &str {
        match self {
            PortalError::InvalidKey { path, .. }
            | PortalError::NotFound { path }
            | PortalError::MethodNotAllowed { path, .. }
            | PortalError::UpstreamUnavailable { path, .. } => path,
        }
    }

    /// Only store faults are worth retrying; client errors never are.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PortalError::UpstreamUnavailable { .. })
    }

    /// Map an adapter failure onto the portal taxonomy for `path`
    pub fn from_storage(path: &str, err: StorageError) -> Self {
        match err {
            StorageError::ObjectNotFound { .. } => PortalError::NotFound {
                path: path.to_string(),
            },
            StorageError::ValidationError { message } => PortalError::InvalidKey {
                path: path.to_string(),
                reason: message,
            },
            other => PortalError::UpstreamUnavailable {
                path: path.to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Result type for portal operations
pub type PortalResult<T> = Result<T, PortalError>;
