use crate::domain::{errors::PortalResult, models::UploadAuthorization};
use async_trait::async_trait;

/// Port for issuing short-lived upload permission
#[async_trait]
pub trait UploadAuthorizationService: Send + Sync + 'static {
    /// Mint a PUT-only authorization bound to `requested_key` under the upload root
    async fn issue_upload_authorization(
        &self,
        requested_key: &str,
    ) -> PortalResult<UploadAuthorization>;
}
