use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};

use crate::{
    adapters::inbound::http::{
        dto::{ErrorResponseDto, StoreAuthQuery, StoredObjectDto},
        router::StoreState,
    },
    domain::{errors::StorageError, value_objects::ObjectKey},
};

type StoreRejection = (StatusCode, Json<ErrorResponseDto>);

fn storage_status(error: &StorageError) -> StatusCode {
    match error {
        StorageError::AuthorizationRejected { .. } => StatusCode::FORBIDDEN,
        StorageError::ValidationError { .. } => StatusCode::BAD_REQUEST,
        StorageError::ObjectNotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Handle a signed upload to the development store
pub async fn store_put_object(
    State(state): State<StoreState>,
    Path(key): Path<String>,
    Query(auth): Query<StoreAuthQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<StoredObjectDto>), StoreRejection> {
    let object_key = ObjectKey::new(key.clone()).map_err(|e| {
        let error = StorageError::ValidationError {
            message: e.to_string(),
        };
        (
            storage_status(&error),
            Json(ErrorResponseDto::from_storage_error(&key, &error)),
        )
    })?;

    let (Some(expires), Some(signature)) = (auth.expires, auth.signature) else {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponseDto::missing_signature(&key)),
        ));
    };

    let reject = |error: StorageError| {
        (
            storage_status(&error),
            Json(ErrorResponseDto::from_storage_error(&key, &error)),
        )
    };

    state
        .signer
        .authorize_put(&object_key, expires, &signature, Utc::now())
        .map_err(|e| {
            warn!(key = %object_key, error = %e, "rejected store upload");
            reject(e)
        })?;

    let content_type = headers
        .get("content-type")
        .and_then(|ct| ct.to_str().ok())
        .filter(|ct| !ct.is_empty());

    let metadata = state
        .store
        .put_object(&object_key, body, content_type)
        .await
        .map_err(reject)?;

    info!(key = %object_key, size = metadata.content_length, "stored upload");

    Ok((
        StatusCode::OK,
        Json(StoredObjectDto {
            key: object_key.to_string(),
            size: metadata.content_length,
            etag: metadata.etag,
        }),
    ))
}
