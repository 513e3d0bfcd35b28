use async_trait::async_trait;
use http::{
    header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, ETAG, LAST_MODIFIED},
    HeaderMap, HeaderValue,
};
use std::sync::Arc;
use tracing::warn;

use crate::{
    domain::{
        errors::{PortalError, PortalResult},
        models::ObjectMetadata,
        value_objects::ObjectKey,
    },
    ports::{
        services::{Disposition, DownloadService, ObjectResponse},
        storage::ObjectStore,
    },
};

pub const DEFAULT_FALLBACK_FILENAME: &str = "download";

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct DownloadSettings {
    /// Filename used when a key has no final segment
    pub fallback_filename: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            fallback_filename: DEFAULT_FALLBACK_FILENAME.to_string(),
        }
    }
}

/// Relays objects from the store, forcing a save dialog on the download route
#[derive(Clone)]
pub struct DownloadServiceImpl {
    store: Arc<dyn ObjectStore>,
    settings: DownloadSettings,
}

impl DownloadServiceImpl {
    pub fn new(store: Arc<dyn ObjectStore>, settings: DownloadSettings) -> Self {
        Self { store, settings }
    }

    fn finish_headers(
        &self,
        key: &ObjectKey,
        metadata: &ObjectMetadata,
        disposition: Disposition,
    ) -> HeaderMap {
        let headers = object_headers(metadata);
        match disposition {
            Disposition::Attachment => {
                rewrite_download_response(key.as_str(), headers, &self.settings.fallback_filename)
            }
            Disposition::Inline => headers,
        }
    }
}

#[async_trait]
impl DownloadService for DownloadServiceImpl {
    async fn fetch(
        &self,
        key: &ObjectKey,
        disposition: Disposition,
    ) -> PortalResult<ObjectResponse> {
        let object = self.store.get_object(key).await.map_err(|e| {
            if e.is_upstream_fault() {
                warn!(key = %key, error = %e, "object fetch failed");
            }
            PortalError::from_storage(key.as_str(), e)
        })?;

        Ok(ObjectResponse {
            headers: self.finish_headers(key, &object.metadata, disposition),
            body: object.data,
        })
    }

    async fn head(&self, key: &ObjectKey, disposition: Disposition) -> PortalResult<HeaderMap> {
        let metadata = self.store.head_object(key).await.map_err(|e| {
            if e.is_upstream_fault() {
                warn!(key = %key, error = %e, "object head failed");
            }
            PortalError::from_storage(key.as_str(), e)
        })?;

        Ok(self.finish_headers(key, &metadata, disposition))
    }
}

/// Response headers the store would have sent for this object
pub fn object_headers(metadata: &ObjectMetadata) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let content_type = metadata
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    headers.insert(CONTENT_TYPE, content_type);
    headers.insert(CONTENT_LENGTH, HeaderValue::from(metadata.content_length));

    if let Some(etag) = &metadata.etag {
        let quoted = if etag.starts_with('"') || etag.starts_with("W/") {
            etag.clone()
        } else {
            format!("\"{}\"", etag)
        };
        if let Ok(value) = HeaderValue::from_str(&quoted) {
            headers.insert(ETAG, value);
        }
    }

    let last_modified = metadata
        .last_modified
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string();
    if let Ok(value) = HeaderValue::from_str(&last_modified) {
        headers.insert(LAST_MODIFIED, value);
    }

    headers
}

/// Force `attachment` disposition, naming the file after the key's last segment.
///
/// Only `Content-Disposition` changes. Keys without a final segment use
/// `fallback_filename`; names that cannot be expressed in a header degrade to a
/// bare `attachment` rather than failing the download.
pub fn rewrite_download_response(
    object_key: &str,
    mut headers: HeaderMap,
    fallback_filename: &str,
) -> HeaderMap {
    let filename = match object_key.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ if !fallback_filename.is_empty() => fallback_filename,
        _ => DEFAULT_FALLBACK_FILENAME,
    };

    let value = HeaderValue::from_str(&disposition_value(filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    headers.insert(CONTENT_DISPOSITION, value);
    headers
}

/// `attachment` with an ASCII `filename` and an RFC 5987 `filename*`
fn disposition_value(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii,
        urlencoding::encode(filename)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn store_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
        headers.insert(ETAG, HeaderValue::from_static("\"abc\""));
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_static("inline; filename=\"other.pdf\""),
        );
        headers
    }

    #[test]
    fn test_filename_from_last_segment() {
        let headers = rewrite_download_response("a/b/report.pdf", store_headers(), "download");

        assert_eq!(
            headers.get(CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"report.pdf\"; filename*=UTF-8''report.pdf"
        );
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/pdf");
        assert_eq!(headers.get(ETAG).unwrap(), "\"abc\"");
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn test_empty_final_segment_uses_fallback() {
        let headers = rewrite_download_response("a/b/", HeaderMap::new(), "file.bin");
        assert_eq!(
            headers.get(CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"file.bin\"; filename*=UTF-8''file.bin"
        );

        let headers = rewrite_download_response("", HeaderMap::new(), "");
        assert_eq!(
            headers.get(CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"download\"; filename*=UTF-8''download"
        );
    }

    #[test]
    fn test_non_ascii_and_quotes_are_escaped() {
        let headers = rewrite_download_response("docs/résumé \"v2\".pdf", HeaderMap::new(), "x");
        let value = headers.get(CONTENT_DISPOSITION).unwrap().to_str().unwrap();

        assert!(value.starts_with("attachment; filename=\"r_sum_ _v2_.pdf\""));
        assert!(value.ends_with("filename*=UTF-8''r%C3%A9sum%C3%A9%20%22v2%22.pdf"));
    }

    #[test]
    fn test_object_headers_quote_bare_etags() {
        let metadata = ObjectMetadata {
            content_type: None,
            content_length: 42,
            etag: Some("7".to_string()),
            last_modified: Utc.with_ymd_and_hms(2024, 3, 5, 7, 9, 11).unwrap(),
        };
        let headers = object_headers(&metadata);

        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), DEFAULT_CONTENT_TYPE);
        assert_eq!(headers.get(CONTENT_LENGTH).unwrap(), "42");
        assert_eq!(headers.get(ETAG).unwrap(), "\"7\"");
        assert_eq!(
            headers.get(LAST_MODIFIED).unwrap(),
            "Tue, 05 Mar 2024 07:09:11 GMT"
        );
    }
}
