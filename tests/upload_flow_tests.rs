use axum_test::TestServer;
use bytes::Bytes;
use chrono::Utc;
use file_portal::{
    adapters::inbound::http::{
        router::{create_router, create_store_router},
        UploadUrlResponseDto,
    },
    app::{AppBuilder, AppServices, StorageBackend},
    services::UploadSettings,
    ObjectKey,
};
use http::{HeaderValue, StatusCode};
use std::time::Duration;

const STORE_ENDPOINT: &str = "http://store.test";

fn build_app(root: &str, ttl: Duration) -> AppServices {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::InMemory {
            signing_secret: "integration-secret".to_string(),
            public_endpoint: STORE_ENDPOINT.to_string(),
        })
        .with_upload_settings(UploadSettings {
            root: root.to_string(),
            ttl,
        })
        .build()
        .unwrap()
}

/// Split a presigned URL into its store path and query pairs
fn split_url(url: &str) -> (String, Vec<(String, String)>) {
    let rest = url.strip_prefix(STORE_ENDPOINT).unwrap();
    let (path, query) = rest.split_once('?').unwrap();
    let pairs = query
        .split('&')
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap();
            (k.to_string(), v.to_string())
        })
        .collect();
    (path.to_string(), pairs)
}

async fn signed_put(store: &TestServer, url: &str, body: &'static [u8]) -> StatusCode {
    let (path, query) = split_url(url);
    let mut request = store
        .put(&path)
        .add_header("content-type", HeaderValue::from_static("text/plain"))
        .bytes(Bytes::from_static(body));
    for (k, v) in query {
        request = request.add_query_param(&k, v);
    }
    request.await.status_code()
}

#[tokio::test]
async fn test_upload_then_list_and_download() {
    let app = build_app("uploads/", Duration::from_secs(300));
    let portal = TestServer::new(create_router(app.state())).unwrap();
    let store = TestServer::new(create_store_router(app.store_state().unwrap())).unwrap();

    let issued = portal
        .get("/upload-url")
        .add_query_param("filename", "report 2024.pdf")
        .await;
    assert_eq!(issued.status_code(), StatusCode::OK);
    let authorization = issued.json::<UploadUrlResponseDto>();
    assert_eq!(authorization.key, "uploads/report 2024.pdf");
    assert!(authorization.expires_at > authorization.issued_at);
    assert_eq!(
        (authorization.expires_at - authorization.issued_at).num_seconds(),
        300
    );

    assert_eq!(
        signed_put(&store, &authorization.url, b"%PDF-1.7").await,
        StatusCode::OK
    );

    let download = portal.get("/download/uploads/report%202024.pdf").await;
    assert_eq!(download.status_code(), StatusCode::OK);
    assert_eq!(download.as_bytes().as_ref(), b"%PDF-1.7");
    assert_eq!(
        download.header("content-disposition"),
        "attachment; filename=\"report 2024.pdf\"; filename*=UTF-8''report%202024.pdf"
    );

    let listing = portal.get("/uploads/").add_query_param("format", "json").await;
    assert_eq!(listing.status_code(), StatusCode::OK);
    assert!(listing.text().contains("\"name\":\"report 2024.pdf\""));
}

#[tokio::test]
async fn test_url_expiry_matches_configured_ttl() {
    let app = build_app("", Duration::from_secs(120));
    let portal = TestServer::new(create_router(app.state())).unwrap();

    let authorization = portal
        .get("/upload-url")
        .add_query_param("filename", "a.txt")
        .await
        .json::<UploadUrlResponseDto>();

    let (_, query) = split_url(&authorization.url);
    let expires: i64 = query
        .iter()
        .find(|(k, _)| k == "X-Portal-Expires")
        .map(|(_, v)| v.parse().unwrap())
        .unwrap();

    assert!((expires - authorization.expires_at.timestamp()).abs() <= 1);
}

#[tokio::test]
async fn test_stale_upload_url_is_rejected() {
    let app = build_app("", Duration::from_secs(300));
    let store = TestServer::new(create_store_router(app.store_state().unwrap())).unwrap();
    let signer = app.local_signer.as_ref().unwrap();

    let key = ObjectKey::new("late.txt".to_string()).unwrap();
    let stale = signer
        .url_for(&key, Utc::now().timestamp() - 1)
        .unwrap();

    assert_eq!(signed_put(&store, &stale, b"too late").await, StatusCode::FORBIDDEN);
    assert!(app.store.head_object(&key).await.is_err());
}

#[tokio::test]
async fn test_url_cannot_be_reused_for_another_key() {
    let app = build_app("", Duration::from_secs(300));
    let portal = TestServer::new(create_router(app.state())).unwrap();
    let store = TestServer::new(create_store_router(app.store_state().unwrap())).unwrap();

    let authorization = portal
        .get("/upload-url")
        .add_query_param("filename", "allowed.txt")
        .await
        .json::<UploadUrlResponseDto>();
    let forged = authorization.url.replace("allowed.txt", "other.txt");

    assert_eq!(signed_put(&store, &forged, b"nope").await, StatusCode::FORBIDDEN);
    assert_eq!(
        signed_put(&store, &authorization.url, b"yes").await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_issuing_has_no_store_side_effects() {
    let app = build_app("", Duration::from_secs(300));
    let portal = TestServer::new(create_router(app.state())).unwrap();

    portal
        .get("/upload-url")
        .add_query_param("filename", "ghost.txt")
        .await;

    let key = ObjectKey::new("ghost.txt".to_string()).unwrap();
    assert!(app.store.head_object(&key).await.is_err());

    let root = portal.get("/").add_query_param("format", "json").await;
    assert_eq!(root.status_code(), StatusCode::OK);
    assert!(!root.text().contains("ghost.txt"));
}
