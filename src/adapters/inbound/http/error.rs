use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::{
    header::{ALLOW, CACHE_CONTROL},
    HeaderValue, StatusCode,
};

use crate::domain::errors::PortalError;

use super::dto::ErrorResponseDto;

/// HTTP status for each portal error kind
pub fn status_for(error: &PortalError) -> StatusCode {
    match error {
        PortalError::InvalidKey { .. } => StatusCode::BAD_REQUEST,
        PortalError::NotFound { .. } => StatusCode::NOT_FOUND,
        PortalError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
        PortalError::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let mut response = (status, Json(ErrorResponseDto::from_portal_error(&self))).into_response();

        let headers = response.headers_mut();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        if let PortalError::MethodNotAllowed { class, .. } = &self {
            if let Ok(allow) = HeaderValue::from_str(&class.allow_header()) {
                headers.insert(ALLOW, allow);
            }
        }

        response
    }
}
