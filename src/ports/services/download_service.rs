use crate::domain::{errors::PortalResult, value_objects::ObjectKey};
use async_trait::async_trait;
use bytes::Bytes;
use http::HeaderMap;

/// How the browser should treat a passed-through object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Force a save dialog
    Attachment,
    /// Leave the store's headers as they are
    Inline,
}

/// Headers and body relayed to the client
#[derive(Debug, Clone)]
pub struct ObjectResponse {
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Port for object passthrough
#[async_trait]
pub trait DownloadService: Send + Sync + 'static {
    /// Fetch the object and build the response headers for it
    async fn fetch(&self, key: &ObjectKey, disposition: Disposition)
        -> PortalResult<ObjectResponse>;

    /// Same headers as `fetch`, without reading the body
    async fn head(&self, key: &ObjectKey, disposition: Disposition) -> PortalResult<HeaderMap>;
}
