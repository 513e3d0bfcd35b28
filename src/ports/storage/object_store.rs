use crate::domain::{
    errors::StorageResult,
    models::{ObjectInfo, ObjectMetadata, StoredObject},
    value_objects::ObjectKey,
};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// Port for object storage operations
/// This abstracts the actual storage backend (S3, in-memory, etc.)
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Store object data
    async fn put_object(
        &self,
        key: &ObjectKey,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<ObjectMetadata>;

    /// Retrieve object data together with its metadata
    async fn get_object(&self, key: &ObjectKey) -> StorageResult<StoredObject>;

    /// Retrieve metadata without the body
    async fn head_object(&self, key: &ObjectKey) -> StorageResult<ObjectMetadata>;

    /// List one page of objects under `prefix`.
    ///
    /// `continuation` is the `next_token` of the previous page; a page without
    /// a `next_token` is the last one.
    async fn list_page(
        &self,
        prefix: Option<&str>,
        continuation: Option<&str>,
        max_keys: usize,
    ) -> StorageResult<ListPage>;
}

/// One page of a prefix listing
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub objects: Vec<ObjectInfo>,
    pub next_token: Option<String>,
}

/// Port for minting write-only URLs against the store.
///
/// The store itself enforces what the URL grants; this side only chooses the
/// key and lifetime.
#[async_trait]
pub trait UploadSigner: Send + Sync + 'static {
    /// Sign a PUT of exactly `key`, valid for `expires_in`
    async fn sign_put(&self, key: &ObjectKey, expires_in: Duration) -> StorageResult<String>;
}
