use async_trait::async_trait;
use chrono::Utc;
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    domain::{
        errors::{PortalError, PortalResult},
        models::{UploadAuthorization, UploadMethod},
        value_objects::ObjectKey,
    },
    ports::{services::UploadAuthorizationService, storage::UploadSigner},
};

/// Default lifetime of an upload URL
pub const DEFAULT_UPLOAD_TTL: Duration = Duration::from_secs(300);

/// Longest lifetime a presigned URL may carry
pub const MAX_UPLOAD_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Where uploads land and how long their URLs live
#[derive(Debug, Clone)]
pub struct UploadSettings {
    /// Directory prefix every upload key is placed under ("" for the bucket root)
    pub root: String,
    pub ttl: Duration,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            root: String::new(),
            ttl: DEFAULT_UPLOAD_TTL,
        }
    }
}

/// Issues PUT-only authorizations through the store's signer
#[derive(Clone)]
pub struct UploadAuthorizationServiceImpl {
    signer: Arc<dyn UploadSigner>,
    settings: UploadSettings,
}

impl UploadAuthorizationServiceImpl {
    pub fn new(signer: Arc<dyn UploadSigner>, settings: UploadSettings) -> Self {
        Self { signer, settings }
    }
}

#[async_trait]
impl UploadAuthorizationService for UploadAuthorizationServiceImpl {
    async fn issue_upload_authorization(
        &self,
        requested_key: &str,
    ) -> PortalResult<UploadAuthorization> {
        let target_key = ObjectKey::under_root(&self.settings.root, requested_key).map_err(
            |e| PortalError::InvalidKey {
                path: requested_key.to_string(),
                reason: e.to_string(),
            },
        )?;

        // Captured before signing: the advertised expiry must not outlast the URL
        let issued_at = Utc::now();
        let url = self
            .signer
            .sign_put(&target_key, self.settings.ttl)
            .await
            .map_err(|e| {
                warn!(key = %target_key, error = %e, "failed to sign upload url");
                PortalError::from_storage(target_key.as_str(), e)
            })?;

        let ttl_secs = i64::try_from(self.settings.ttl.as_secs()).unwrap_or(i64::MAX);
        let expires_at = issued_at + chrono::Duration::seconds(ttl_secs);

        let authorization = UploadAuthorization {
            id: Uuid::new_v4(),
            target_key,
            url,
            method: UploadMethod::Put,
            issued_at,
            expires_at,
        };

        info!(
            id = %authorization.id,
            key = %authorization.target_key,
            expires_at = %authorization.expires_at,
            "issued upload authorization"
        );

        Ok(authorization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{StorageError, StorageResult};

    struct EchoSigner;

    #[async_trait]
    impl UploadSigner for EchoSigner {
        async fn sign_put(&self, key: &ObjectKey, expires_in: Duration) -> StorageResult<String> {
            Ok(format!(
                "https://store.test/{}?expires={}",
                key,
                expires_in.as_secs()
            ))
        }
    }

    struct BrokenSigner;

    #[async_trait]
    impl UploadSigner for BrokenSigner {
        async fn sign_put(&self, _key: &ObjectKey, _expires_in: Duration) -> StorageResult<String> {
            Err(StorageError::SigningUnavailable {
                message: "no credentials".to_string(),
            })
        }
    }

    fn service(root: &str) -> UploadAuthorizationServiceImpl {
        UploadAuthorizationServiceImpl::new(
            Arc::new(EchoSigner),
            UploadSettings {
                root: root.to_string(),
                ttl: Duration::from_secs(300),
            },
        )
    }

    #[tokio::test]
    async fn test_authorization_is_bound_to_requested_key() {
        let before = Utc::now();
        let auth = service("")
            .issue_upload_authorization("uploads/x.zip")
            .await
            .unwrap();

        assert_eq!(auth.target_key.as_str(), "uploads/x.zip");
        assert_eq!(auth.method, UploadMethod::Put);
        assert!(auth.expires_at > auth.issued_at);
        assert!(auth.issued_at >= before);
        assert_eq!(auth.expires_at - auth.issued_at, chrono::Duration::seconds(300));
        assert!(auth.url.contains("uploads/x.zip"));
    }

    #[tokio::test]
    async fn test_upload_root_is_prepended() {
        let auth = service("incoming/")
            .issue_upload_authorization("report.pdf")
            .await
            .unwrap();
        assert_eq!(auth.target_key.as_str(), "incoming/report.pdf");
    }

    #[tokio::test]
    async fn test_traversal_is_invalid_key() {
        for bad in ["../x.zip", "uploads/../../x.zip", "", "a//b", "a/./b"] {
            let err = service("incoming/")
                .issue_upload_authorization(bad)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), "InvalidKey", "{bad:?} should be rejected");
            assert_eq!(err.path(), bad);
        }
    }

    #[tokio::test]
    async fn test_signer_failure_is_upstream_unavailable() {
        let service =
            UploadAuthorizationServiceImpl::new(Arc::new(BrokenSigner), UploadSettings::default());
        let err = service
            .issue_upload_authorization("x.zip")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "UpstreamUnavailable");
        assert!(err.is_retryable());
    }
}
