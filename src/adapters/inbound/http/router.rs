use axum::{routing::put, Router};
use http::Method;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{
    handlers::{dispatch, store_put_object},
    middleware::CachePolicyLayer,
};
use crate::{
    adapters::outbound::storage::LocalUploadSigner,
    ports::{
        services::{DownloadService, ListingRenderer, UploadAuthorizationService},
        storage::ObjectStore,
    },
    services::RoutingPolicy,
};

/// Application state containing all services
#[derive(Clone)]
pub struct AppState {
    pub upload_service: Arc<dyn UploadAuthorizationService>,
    pub listing_renderer: Arc<dyn ListingRenderer>,
    pub download_service: Arc<dyn DownloadService>,
    pub routing: Arc<RoutingPolicy>,
}

/// State for the development store endpoint
#[derive(Clone)]
pub struct StoreState {
    pub store: Arc<dyn ObjectStore>,
    pub signer: Arc<LocalUploadSigner>,
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::PUT, Method::OPTIONS])
        .allow_headers(Any)
}

/// Create the portal router.
///
/// Every path goes through one dispatcher so classification, and the 405s it
/// produces, stay in the routing policy rather than in axum's route table.
pub fn create_router(state: AppState) -> Router {
    let policy = state.routing.clone();

    Router::new()
        .fallback(dispatch)
        .with_state(state)
        .layer(CachePolicyLayer::new(policy))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// Create the development store router, which accepts signed PUTs only
pub fn create_store_router(state: StoreState) -> Router {
    Router::new()
        .route("/{*key}", put(store_put_object))
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::create_in_memory_app;
    use axum_test::TestServer;
    use http::{header, HeaderValue, StatusCode};

    #[tokio::test]
    async fn test_preflight_is_answered_before_routing() {
        let app = create_in_memory_app().unwrap();
        let server = TestServer::new(create_router(app.state())).unwrap();

        let response = server
            .method(Method::OPTIONS, "/upload-url")
            .add_header(header::ORIGIN, HeaderValue::from_static("https://example.com"))
            .add_header(
                header::ACCESS_CONTROL_REQUEST_METHOD,
                HeaderValue::from_static("GET"),
            )
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            HeaderValue::from_static("*")
        );
    }

    #[tokio::test]
    async fn test_store_router_rejects_unsigned_put() {
        let app = create_in_memory_app().unwrap();
        let server = TestServer::new(create_store_router(app.store_state().unwrap())).unwrap();

        let response = server.put("/uploads/a.txt").bytes("x".into()).await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }
}
