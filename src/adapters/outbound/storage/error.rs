use crate::domain::{errors::StorageError, value_objects::ObjectKey};

/// Convert object_store errors to domain storage errors
impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => {
                // Try to create ObjectKey, fallback to validation error if invalid
                match ObjectKey::new(path.to_string()) {
                    Ok(key) => StorageError::ObjectNotFound { key },
                    Err(_) => StorageError::ValidationError {
                        message: format!("Invalid object path from store: {}", path),
                    },
                }
            }
            object_store::Error::NotSupported { .. } => StorageError::InfrastructureError {
                message: "Operation not supported by the store".to_string(),
                source: Some(err.to_string()),
            },
            object_store::Error::Unauthenticated { .. }
            | object_store::Error::PermissionDenied { .. } => StorageError::SigningUnavailable {
                message: err.to_string(),
            },
            _ => StorageError::InfrastructureError {
                message: format!("Object store operation failed: {}", err),
                source: Some(err.to_string()),
            },
        }
    }
}

/// Map a store failure for a known key, so not-found errors keep the requested key
pub(crate) fn for_key(key: &ObjectKey, err: object_store::Error) -> StorageError {
    match err {
        object_store::Error::NotFound { .. } => StorageError::ObjectNotFound { key: key.clone() },
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_keeps_key() {
        let key = ObjectKey::new("docs/a.txt".to_string()).unwrap();
        let err = for_key(
            &key,
            object_store::Error::NotFound {
                path: "docs/a.txt".to_string(),
                source: "missing".into(),
            },
        );
        match err {
            StorageError::ObjectNotFound { key: k } => assert_eq!(k, key),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_generic_failures_are_upstream_faults() {
        let err: StorageError = object_store::Error::Generic {
            store: "S3",
            source: "connection reset".into(),
        }
        .into();
        assert!(err.is_upstream_fault());
    }
}
