use object_store::memory::InMemory;
use std::{sync::Arc, time::Duration};
use tracing::info;

use crate::{
    adapters::{
        inbound::http::{AppState, StoreState},
        outbound::storage::{
            create_s3_store, ApacheObjectStoreAdapter, LocalUploadSigner, ObjectStoreUploadSigner,
            S3Config, DEFAULT_STORE_TIMEOUT,
        },
    },
    domain::value_objects::ObjectKey,
    ports::{
        services::{DownloadService, ListingRenderer, UploadAuthorizationService},
        storage::{ObjectStore, UploadSigner},
    },
    services::{
        CachePolicy, DownloadServiceImpl, DownloadSettings, ListingRendererImpl, ListingSettings,
        RoutePatterns, RoutingPolicy, UploadAuthorizationServiceImpl, UploadSettings,
        MAX_UPLOAD_TTL,
    },
};

pub const DEFAULT_DEV_STORE_ENDPOINT: &str = "http://127.0.0.1:8081";

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage_backend: StorageBackend,
    pub routes: RoutePatterns,
    pub cache: CachePolicy,
    pub upload: UploadSettings,
    pub listing: ListingSettings,
    pub download: DownloadSettings,
    /// Bound on every individual store call
    pub store_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::in_memory(),
            routes: RoutePatterns::default(),
            cache: CachePolicy::default(),
            upload: UploadSettings::default(),
            listing: ListingSettings::default(),
            download: DownloadSettings::default(),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

/// Storage backend configuration
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// Process-local store; uploads go through the development store endpoint
    InMemory {
        signing_secret: String,
        public_endpoint: String,
    },
    S3(S3Config),
}

impl StorageBackend {
    /// In-memory backend with a fresh random signing secret
    pub fn in_memory() -> Self {
        Self::in_memory_at(DEFAULT_DEV_STORE_ENDPOINT)
    }

    /// In-memory backend whose upload URLs point at `public_endpoint`
    pub fn in_memory_at(public_endpoint: impl Into<String>) -> Self {
        StorageBackend::InMemory {
            signing_secret: uuid::Uuid::new_v4().simple().to_string(),
            public_endpoint: public_endpoint.into(),
        }
    }
}

/// Application services container
pub struct AppServices {
    pub store: Arc<dyn ObjectStore>,
    /// Present for the in-memory backend, whose store endpoint checks these signatures
    pub local_signer: Option<LocalUploadSigner>,
    pub upload_service: Arc<dyn UploadAuthorizationService>,
    pub listing_renderer: Arc<dyn ListingRenderer>,
    pub download_service: Arc<dyn DownloadService>,
    pub routing: RoutingPolicy,
}

impl AppServices {
    /// State for the portal router
    pub fn state(&self) -> AppState {
        AppState {
            upload_service: self.upload_service.clone(),
            listing_renderer: self.listing_renderer.clone(),
            download_service: self.download_service.clone(),
            routing: Arc::new(self.routing.clone()),
        }
    }

    /// State for the development store router, when the backend has one
    pub fn store_state(&self) -> Option<StoreState> {
        self.local_signer.as_ref().map(|signer| StoreState {
            store: self.store.clone(),
            signer: Arc::new(signer.clone()),
        })
    }
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
}

impl AppBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Configure the application with custom settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure storage backend
    pub fn with_storage_backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage_backend = backend;
        self
    }

    pub fn with_upload_settings(mut self, upload: UploadSettings) -> Self {
        self.config.upload = upload;
        self
    }

    pub fn with_listing_settings(mut self, listing: ListingSettings) -> Self {
        self.config.listing = listing;
        self
    }

    pub fn with_routes(mut self, routes: RoutePatterns) -> Self {
        self.config.routes = routes;
        self
    }

    /// Build the complete application with services
    pub fn build(self) -> Result<AppServices, AppError> {
        self.validate()?;

        let routing = RoutingPolicy::new(self.config.routes.clone(), self.config.cache)
            .map_err(|e| AppError::Configuration {
                message: e.to_string(),
            })?;

        let (store, signer, local_signer) = self.create_storage()?;

        let upload_service =
            UploadAuthorizationServiceImpl::new(signer, self.config.upload.clone());
        let listing_renderer = ListingRendererImpl::new(store.clone(), self.config.listing.clone());
        let download_service = DownloadServiceImpl::new(store.clone(), self.config.download.clone());

        info!(
            upload_prefix = %self.config.routes.upload_prefix,
            download_prefix = %self.config.routes.download_prefix,
            upload_ttl_secs = self.config.upload.ttl.as_secs(),
            "portal services ready"
        );

        Ok(AppServices {
            store,
            local_signer,
            upload_service: Arc::new(upload_service),
            listing_renderer: Arc::new(listing_renderer),
            download_service: Arc::new(download_service),
            routing,
        })
    }

    fn validate(&self) -> Result<(), AppError> {
        let config = &self.config;
        let invalid = |message: String| Err(AppError::Configuration { message });

        let ttl = config.upload.ttl;
        if ttl < Duration::from_secs(1) || ttl > MAX_UPLOAD_TTL {
            return invalid(format!(
                "upload URL lifetime must be between 1 and {} seconds, got {}",
                MAX_UPLOAD_TTL.as_secs(),
                ttl.as_secs()
            ));
        }

        let root = &config.upload.root;
        if !root.is_empty() {
            let body = root.strip_suffix('/').unwrap_or("");
            if ObjectKey::new(body.to_string()).is_err() {
                return invalid(format!(
                    "upload root must be empty or a relative directory ending in '/', got {:?}",
                    root
                ));
            }
        }

        if config.listing.page_size == 0 {
            return invalid("listing page size must be at least 1".to_string());
        }
        if config.store_timeout.is_zero() || config.listing.timeout.is_zero() {
            return invalid("store timeouts must be non-zero".to_string());
        }

        let fallback = &config.download.fallback_filename;
        if fallback.is_empty() || fallback.contains('/') {
            return invalid(format!(
                "fallback filename must be a non-empty name without '/', got {:?}",
                fallback
            ));
        }

        Ok(())
    }

    /// Create the store adapter and the matching upload signer
    #[allow(clippy::type_complexity)]
    fn create_storage(
        &self,
    ) -> Result<
        (
            Arc<dyn ObjectStore>,
            Arc<dyn UploadSigner>,
            Option<LocalUploadSigner>,
        ),
        AppError,
    > {
        match &self.config.storage_backend {
            StorageBackend::InMemory {
                signing_secret,
                public_endpoint,
            } => {
                if signing_secret.is_empty() {
                    return Err(AppError::Configuration {
                        message: "development store signing secret must not be empty"
                            .to_string(),
                    });
                }

                let store: Arc<dyn ObjectStore> = Arc::new(
                    ApacheObjectStoreAdapter::new(Arc::new(InMemory::new()))
                        .with_timeout(self.config.store_timeout),
                );
                let signer = LocalUploadSigner::new(signing_secret.as_bytes(), public_endpoint);
                let upload_signer: Arc<dyn UploadSigner> = Arc::new(signer.clone());
                Ok((store, upload_signer, Some(signer)))
            }
            StorageBackend::S3(s3) => {
                let client = create_s3_store(s3).map_err(|e| AppError::StorageInit {
                    message: format!("{:#}", e),
                })?;
                let store: Arc<dyn ObjectStore> = Arc::new(
                    ApacheObjectStoreAdapter::new(client.clone())
                        .with_timeout(self.config.store_timeout),
                );
                let upload_signer: Arc<dyn UploadSigner> =
                    Arc::new(ObjectStoreUploadSigner::new(client));
                Ok((store, upload_signer, None))
            }
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage initialization error: {message}")]
    StorageInit { message: String },
}

/// Create an in-memory application for testing and development
pub fn create_in_memory_app() -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::in_memory())
        .build()
}

/// Create an S3-backed application
pub fn create_s3_app(config: S3Config) -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::S3(config))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_in_memory_app() {
        let app = create_in_memory_app().unwrap();
        assert!(app.local_signer.is_some());
        assert!(app.store_state().is_some());
    }

    #[test]
    fn test_s3_app_has_no_dev_store() {
        let app = create_s3_app(S3Config {
            bucket: "portal".to_string(),
            region: "us-east-1".to_string(),
            access_key: Some("key".to_string()),
            secret_key: Some("secret".to_string()),
            endpoint: Some("http://localhost:9000".to_string()),
            allow_http: true,
        })
        .unwrap();
        assert!(app.store_state().is_none());
    }

    #[test]
    fn test_ttl_out_of_range_is_rejected() {
        for ttl in [Duration::ZERO, MAX_UPLOAD_TTL + Duration::from_secs(1)] {
            let result = AppBuilder::new()
                .with_upload_settings(UploadSettings {
                    root: String::new(),
                    ttl,
                })
                .build();
            assert!(matches!(result, Err(AppError::Configuration { .. })));
        }
    }

    #[test]
    fn test_upload_root_must_be_a_directory() {
        for root in ["uploads", "/uploads/", "../up/", "a//b/"] {
            let result = AppBuilder::new()
                .with_upload_settings(UploadSettings {
                    root: root.to_string(),
                    ttl: Duration::from_secs(60),
                })
                .build();
            assert!(result.is_err(), "root {root:?} was accepted");
        }

        assert!(AppBuilder::new()
            .with_upload_settings(UploadSettings {
                root: "uploads/".to_string(),
                ttl: Duration::from_secs(60),
            })
            .build()
            .is_ok());
    }

    #[test]
    fn test_duplicate_route_prefixes_fail_at_startup() {
        let result = AppBuilder::new()
            .with_routes(RoutePatterns {
                upload_prefix: "/files".to_string(),
                download_prefix: "/files".to_string(),
            })
            .build();
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let result = AppBuilder::new()
            .with_listing_settings(ListingSettings {
                page_size: 0,
                ..Default::default()
            })
            .build();
        assert!(result.is_err());
    }
}
