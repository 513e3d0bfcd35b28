use bytes::Bytes;
use chrono::{DateTime, Utc};

/// A stored object as reported by the store's listing.
///
/// `key` stays a plain string: listings surface whatever the store holds,
/// including keys this layer would refuse to mint authorizations for.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub etag: Option<String>,
}

/// Metadata about a single object, as returned by get/head
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMetadata {
    pub content_type: Option<String>,
    pub content_length: u64,
    pub etag: Option<String>,
    pub last_modified: DateTime<Utc>,
}

/// An object's bytes plus the metadata the store returned with them
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub metadata: ObjectMetadata,
    pub data: Bytes,
}
