pub mod listing;
pub mod object;
pub mod route;
pub mod upload;

pub use listing::{ListingDocument, ListingEntry};
pub use object::{ObjectInfo, ObjectMetadata, StoredObject};
pub use route::{CacheDirective, RouteClass};
pub use upload::{UploadAuthorization, UploadMethod};
