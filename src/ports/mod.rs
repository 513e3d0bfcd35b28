pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use services::{
    Disposition, DownloadService, ListingRenderer, ObjectResponse, UploadAuthorizationService,
};
pub use storage::{ListPage, ObjectStore, UploadSigner};
