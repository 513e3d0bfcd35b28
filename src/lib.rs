pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - core entities, value objects and errors
pub use domain::{
    ListingDocument, ListingEntry, ListingPrefix, ObjectKey, ObjectMetadata, PortalError,
    PortalResult, RouteClass, StorageError, UploadAuthorization, ValidationError,
};

// Port types - interfaces for external systems
pub use ports::{
    DownloadService, ListingRenderer, ObjectStore, UploadAuthorizationService, UploadSigner,
};

// Service implementations - request-time decision logic
pub use services::{
    rewrite_download_response, DownloadServiceImpl, ListingRendererImpl, RoutingPolicy,
    UploadAuthorizationServiceImpl,
};

// Application factory and configuration
pub use app::{
    create_in_memory_app, create_s3_app, AppBuilder, AppConfig, AppError,
    AppServices, StorageBackend,
};

// Adapter types - infrastructure implementations
pub use adapters::inbound::http::{create_router, create_store_router, AppState, StoreState};
pub use adapters::outbound::storage::{
    ApacheObjectStoreAdapter, LocalUploadSigner, ObjectStoreUploadSigner, S3Config,
};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        create_in_memory_app, create_router, create_s3_app, create_store_router,
        ApacheObjectStoreAdapter, AppBuilder, AppConfig, AppServices, ListingRenderer, ObjectKey,
        ObjectStore, PortalError, RoutingPolicy, StorageBackend, UploadAuthorizationService,
    };
}
