use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use object_store::{
    path::Path as ObjectPath, Attribute, Attributes, GetOptions, GetResult, ObjectMeta,
    ObjectStore as ApacheObjectStore, PutOptions, PutPayload,
};
use percent_encoding::percent_decode_str;
use std::{future::Future, sync::Arc, time::Duration};
use tracing::debug;

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::{ObjectInfo, ObjectMetadata, StoredObject},
        value_objects::ObjectKey,
    },
    ports::storage::{ListPage, ObjectStore},
};

use super::error::for_key;

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Adapter that implements our ObjectStore trait using Apache object_store
pub struct ApacheObjectStoreAdapter {
    inner: Arc<dyn ApacheObjectStore>,
    timeout: Duration,
}

impl ApacheObjectStoreAdapter {
    pub fn new(store: Arc<dyn ApacheObjectStore>) -> Self {
        Self {
            inner: store,
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bound a store call by the adapter timeout
    async fn bounded<T>(
        &self,
        operation: &str,
        call: impl Future<Output = StorageResult<T>>,
    ) -> StorageResult<T> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StorageError::Timeout {
                operation: operation.to_string(),
                seconds: self.timeout.as_secs(),
            })?
    }
}

fn metadata_from(result: &GetResult) -> ObjectMetadata {
    let content_type = result.attributes.get(&Attribute::ContentType).map(|v| {
        let value: &str = v.as_ref();
        value.to_string()
    });

    ObjectMetadata {
        content_type,
        content_length: result.meta.size as u64,
        etag: result.meta.e_tag.clone(),
        last_modified: result.meta.last_modified,
    }
}

/// Key as it was written. `ObjectPath::from` percent-encodes characters such
/// as `#` and `%` in each part, so listed locations are decoded part by part.
fn raw_key(location: &ObjectPath) -> String {
    location
        .parts()
        .map(|part| {
            percent_decode_str(part.as_ref())
                .decode_utf8_lossy()
                .into_owned()
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Continuation tokens stay in store form, so they are parsed, not re-encoded
fn offset_path(token: &str) -> StorageResult<ObjectPath> {
    ObjectPath::parse(token).map_err(|e| StorageError::ValidationError {
        message: format!("invalid continuation token '{}': {}", token, e),
    })
}

#[async_trait]
impl ObjectStore for ApacheObjectStoreAdapter {
    async fn put_object(
        &self,
        key: &ObjectKey,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<ObjectMetadata> {
        let path = ObjectPath::from(key.as_str());
        let size = data.len() as u64;

        let mut attributes = Attributes::new();
        if let Some(ct) = content_type {
            attributes.insert(Attribute::ContentType, ct.to_string().into());
        }
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        let result = self
            .bounded("put", async {
                self.inner
                    .put_opts(&path, PutPayload::from(data), options)
                    .await
                    .map_err(|e| for_key(key, e))
            })
            .await?;

        Ok(ObjectMetadata {
            content_type: content_type.map(str::to_string),
            content_length: size,
            etag: result.e_tag,
            last_modified: chrono::Utc::now(),
        })
    }

    async fn get_object(&self, key: &ObjectKey) -> StorageResult<StoredObject> {
        let path = ObjectPath::from(key.as_str());

        self.bounded("get", async {
            let result = self.inner.get(&path).await.map_err(|e| for_key(key, e))?;
            let metadata = metadata_from(&result);
            let data = result.bytes().await.map_err(|e| for_key(key, e))?;
            Ok(StoredObject { metadata, data })
        })
        .await
    }

    async fn head_object(&self, key: &ObjectKey) -> StorageResult<ObjectMetadata> {
        let path = ObjectPath::from(key.as_str());
        let options = GetOptions {
            head: true,
            ..Default::default()
        };

        self.bounded("head", async {
            let result = self
                .inner
                .get_opts(&path, options)
                .await
                .map_err(|e| for_key(key, e))?;
            Ok(metadata_from(&result))
        })
        .await
    }

    async fn list_page(
        &self,
        prefix: Option<&str>,
        continuation: Option<&str>,
        max_keys: usize,
    ) -> StorageResult<ListPage> {
        let prefix_path = prefix.map(ObjectPath::from);
        let max_keys = max_keys.max(1);

        let offset = continuation.map(offset_path).transpose()?;

        let metas: Vec<ObjectMeta> = self
            .bounded("list", async {
                // Stores list in key order, so the last location of a page is
                // a valid offset for the next one.
                let stream = match &offset {
                    Some(offset) => self.inner.list_with_offset(prefix_path.as_ref(), offset),
                    None => self.inner.list(prefix_path.as_ref()),
                };

                stream
                    .take(max_keys)
                    .map_err(StorageError::from)
                    .try_collect()
                    .await
            })
            .await?;

        let next_token = if metas.len() == max_keys {
            metas.last().map(|meta| meta.location.to_string())
        } else {
            None
        };

        let objects: Vec<ObjectInfo> = metas
            .into_iter()
            .map(|meta| ObjectInfo {
                key: raw_key(&meta.location),
                size: meta.size as u64,
                last_modified: meta.last_modified,
                etag: meta.e_tag,
            })
            .collect();

        debug!(
            prefix = prefix.unwrap_or(""),
            continuation = continuation.unwrap_or(""),
            returned = objects.len(),
            more = next_token.is_some(),
            "listed page"
        );

        Ok(ListPage {
            objects,
            next_token,
        })
    }
}
