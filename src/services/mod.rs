mod download_service_impl;
mod listing_service_impl;
mod routing_policy;
mod upload_service_impl;

pub use download_service_impl::{
    object_headers, rewrite_download_response, DownloadServiceImpl, DownloadSettings,
    DEFAULT_FALLBACK_FILENAME,
};
pub use listing_service_impl::{synthesize_entries, ListingRendererImpl, ListingSettings};
pub use routing_policy::{CachePolicy, RouteMatch, RoutePatterns, RoutingPolicy};
pub use upload_service_impl::{
    UploadAuthorizationServiceImpl, UploadSettings, DEFAULT_UPLOAD_TTL, MAX_UPLOAD_TTL,
};
