mod download_service;
mod listing_service;
mod upload_service;

pub use download_service::{Disposition, DownloadService, ObjectResponse};
pub use listing_service::ListingRenderer;
pub use upload_service::UploadAuthorizationService;
