use axum::{
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, Method, Uri},
    response::{Html, IntoResponse, Response},
    Json,
};
use http::{
    header::{ACCEPT, VARY},
    HeaderValue,
};
use tracing::debug;

use crate::{
    adapters::inbound::http::{
        dto::{DownloadQuery, ListingQuery, UploadUrlQuery, UploadUrlResponseDto},
        render::render_listing_html,
        router::AppState,
    },
    domain::{
        errors::{PortalError, PortalResult},
        models::RouteClass,
        value_objects::ObjectKey,
    },
    ports::services::Disposition,
};

/// Single entry point for portal traffic.
///
/// Classifies the request, hands it to the class's handler and tags the
/// response with the class for the cache policy layer.
pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let path = match urlencoding::decode(uri.path()) {
        Ok(path) => path.into_owned(),
        Err(_) => {
            return PortalError::InvalidKey {
                path: uri.path().to_string(),
                reason: "path is not valid UTF-8".to_string(),
            }
            .into_response()
        }
    };

    let class = match state.routing.classify(&path, &method) {
        Ok(class) => class,
        Err(e) => return e.into_response(),
    };
    let remainder = state.routing.match_path(&path).remainder;
    debug!(%method, path = %path, %class, "classified request");

    let result = match class {
        RouteClass::UploadAuth => issue_upload_url(&state, &uri).await,
        RouteClass::DownloadPassthrough => download(&state, &method, &uri, remainder).await,
        RouteClass::Listing => listing_or_object(&state, &method, &uri, &headers, remainder).await,
    };

    match result {
        Ok(mut response) => {
            response.extensions_mut().insert(class);
            response
        }
        Err(e) => e.into_response(),
    }
}

/// Handle `GET <upload prefix>?filename=<name>`
async fn issue_upload_url(state: &AppState, uri: &Uri) -> PortalResult<Response> {
    let query = Query::<UploadUrlQuery>::try_from_uri(uri).map_err(|e| PortalError::InvalidKey {
        path: uri.path().to_string(),
        reason: e.body_text(),
    })?;

    let filename = query
        .0
        .filename
        .filter(|f| !f.is_empty())
        .ok_or_else(|| PortalError::InvalidKey {
            path: uri.path().to_string(),
            reason: "missing filename parameter".to_string(),
        })?;

    let authorization = state
        .upload_service
        .issue_upload_authorization(&filename)
        .await?;

    Ok(Json(UploadUrlResponseDto::from(authorization)).into_response())
}

/// Handle `<download prefix>/<key>` and `<download prefix>?file=<key>`
async fn download(
    state: &AppState,
    method: &Method,
    uri: &Uri,
    remainder: &str,
) -> PortalResult<Response> {
    let requested = if remainder.is_empty() {
        Query::<DownloadQuery>::try_from_uri(uri)
            .map(|q| q.0)
            .unwrap_or_default()
            .file
            .unwrap_or_default()
    } else {
        remainder.to_string()
    };

    if requested.is_empty() {
        return Err(PortalError::InvalidKey {
            path: uri.path().to_string(),
            reason: "missing file parameter".to_string(),
        });
    }

    let key = ObjectKey::new(requested.clone()).map_err(|e| PortalError::InvalidKey {
        path: requested,
        reason: e.to_string(),
    })?;

    serve_object(state, method, &key, Disposition::Attachment).await
}

/// Relay an object, or just its headers for HEAD
async fn serve_object(
    state: &AppState,
    method: &Method,
    key: &ObjectKey,
    disposition: Disposition,
) -> PortalResult<Response> {
    let (headers, body) = if method == Method::HEAD {
        (
            state.download_service.head(key, disposition).await?,
            Body::empty(),
        )
    } else {
        let object = state.download_service.fetch(key, disposition).await?;
        (object.headers, Body::from(object.body))
    };

    let mut response = Response::new(body);
    *response.headers_mut() = headers;
    Ok(response)
}

/// Default route: an object path is served inline, anything else is listed
async fn listing_or_object(
    state: &AppState,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    remainder: &str,
) -> PortalResult<Response> {
    if !remainder.is_empty() && !remainder.ends_with('/') {
        if let Ok(key) = ObjectKey::new(remainder.to_string()) {
            match serve_object(state, method, &key, Disposition::Inline).await {
                Err(PortalError::NotFound { .. }) => {}
                other => return other,
            }
        }
    }

    let document = state.listing_renderer.render_listing(remainder).await?;

    let mut response = if wants_json(uri, headers) {
        Json(document).into_response()
    } else {
        let upload_path = state
            .routing
            .prefix_for(RouteClass::UploadAuth)
            .unwrap_or_default();
        let download_path = state
            .routing
            .prefix_for(RouteClass::DownloadPassthrough)
            .unwrap_or_default();
        Html(render_listing_html(&document, upload_path, download_path)).into_response()
    };
    response
        .headers_mut()
        .insert(VARY, HeaderValue::from_static("Accept"));

    if method == Method::HEAD {
        let (parts, _) = response.into_parts();
        return Ok(Response::from_parts(parts, Body::empty()));
    }
    Ok(response)
}

fn wants_json(uri: &Uri, headers: &HeaderMap) -> bool {
    let format = Query::<ListingQuery>::try_from_uri(uri)
        .ok()
        .and_then(|q| q.0.format);
    if let Some(format) = format {
        return format.eq_ignore_ascii_case("json");
    }

    headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|accept| accept.contains("application/json"))
        .unwrap_or(false)
}
