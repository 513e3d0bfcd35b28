use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use http::Method;
use object_store::{path::Path as ObjectPath, signer::Signer};
use sha2::Sha256;
use std::{sync::Arc, time::Duration};

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        value_objects::ObjectKey,
    },
    ports::storage::UploadSigner,
};

type HmacSha256 = Hmac<Sha256>;

pub const EXPIRES_PARAM: &str = "X-Portal-Expires";
pub const SIGNATURE_PARAM: &str = "X-Portal-Signature";

/// Presigns uploads with the store's own request signer (SigV4 for S3)
pub struct ObjectStoreUploadSigner {
    signer: Arc<dyn Signer>,
}

impl ObjectStoreUploadSigner {
    pub fn new(signer: Arc<dyn Signer>) -> Self {
        Self { signer }
    }
}

#[async_trait]
impl UploadSigner for ObjectStoreUploadSigner {
    async fn sign_put(&self, key: &ObjectKey, expires_in: Duration) -> StorageResult<String> {
        let path = ObjectPath::from(key.as_str());
        let url = self
            .signer
            .signed_url(Method::PUT, &path, expires_in)
            .await
            .map_err(|e| StorageError::SigningUnavailable {
                message: e.to_string(),
            })?;
        Ok(url.to_string())
    }
}

/// HMAC signer for the development store.
///
/// URLs carry the expiry and a signature over `PUT`, the key and the expiry,
/// so a URL cannot be replayed for another key or after it lapses.
#[derive(Clone)]
pub struct LocalUploadSigner {
    secret: Vec<u8>,
    public_endpoint: String,
}

impl LocalUploadSigner {
    pub fn new(secret: impl Into<Vec<u8>>, public_endpoint: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            public_endpoint: public_endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn public_endpoint(&self) -> &str {
        &self.public_endpoint
    }

    fn mac(&self, key: &ObjectKey, expires: i64) -> StorageResult<HmacSha256> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|e| StorageError::SigningUnavailable {
                message: format!("invalid signing secret: {}", e),
            })?;
        mac.update(format!("PUT\n{}\n{}", key.as_str(), expires).as_bytes());
        Ok(mac)
    }

    /// Signature for a PUT of `key` that lapses at unix time `expires`
    pub fn signature(&self, key: &ObjectKey, expires: i64) -> StorageResult<String> {
        Ok(hex::encode(self.mac(key, expires)?.finalize().into_bytes()))
    }

    /// URL for a PUT of `key` that lapses at unix time `expires`
    pub fn url_for(&self, key: &ObjectKey, expires: i64) -> StorageResult<String> {
        let encoded: Vec<String> = key
            .as_str()
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();

        Ok(format!(
            "{}/{}?{}={}&{}={}",
            self.public_endpoint,
            encoded.join("/"),
            EXPIRES_PARAM,
            expires,
            SIGNATURE_PARAM,
            self.signature(key, expires)?
        ))
    }

    /// Check a presented authorization for a PUT of `key` at `now`
    pub fn authorize_put(
        &self,
        key: &ObjectKey,
        expires: i64,
        signature: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<()> {
        let rejected = |reason: &str| StorageError::AuthorizationRejected {
            key: key.to_string(),
            reason: reason.to_string(),
        };

        if now.timestamp() > expires {
            return Err(rejected("authorization expired"));
        }

        let presented = hex::decode(signature).map_err(|_| rejected("malformed signature"))?;
        self.mac(key, expires)?
            .verify_slice(&presented)
            .map_err(|_| rejected("signature mismatch"))
    }
}

#[async_trait]
impl UploadSigner for LocalUploadSigner {
    async fn sign_put(&self, key: &ObjectKey, expires_in: Duration) -> StorageResult<String> {
        let ttl = chrono::Duration::from_std(expires_in).map_err(|e| {
            StorageError::SigningUnavailable {
                message: format!("invalid expiry: {}", e),
            }
        })?;
        let expires = (Utc::now() + ttl).timestamp();
        self.url_for(key, expires)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> LocalUploadSigner {
        LocalUploadSigner::new("test-secret", "http://127.0.0.1:9000/")
    }

    fn key(k: &str) -> ObjectKey {
        ObjectKey::new(k.to_string()).unwrap()
    }

    #[test]
    fn test_url_shape() {
        let url = signer().url_for(&key("uploads/my file.txt"), 1_700_000_000).unwrap();
        assert!(url.starts_with("http://127.0.0.1:9000/uploads/my%20file.txt?X-Portal-Expires=1700000000&X-Portal-Signature="));
    }

    #[test]
    fn test_valid_signature_is_accepted() {
        let signer = signer();
        let k = key("uploads/a.txt");
        let expires = Utc::now().timestamp() + 60;
        let sig = signer.signature(&k, expires).unwrap();

        assert!(signer.authorize_put(&k, expires, &sig, Utc::now()).is_ok());
    }

    #[test]
    fn test_signature_is_bound_to_key() {
        let signer = signer();
        let expires = Utc::now().timestamp() + 60;
        let sig = signer.signature(&key("uploads/a.txt"), expires).unwrap();

        let err = signer
            .authorize_put(&key("uploads/b.txt"), expires, &sig, Utc::now())
            .unwrap_err();
        assert!(matches!(err, StorageError::AuthorizationRejected { .. }));
    }

    #[test]
    fn test_stale_authorization_is_rejected() {
        let signer = signer();
        let k = key("uploads/a.txt");
        let expires = 1_000;
        let sig = signer.signature(&k, expires).unwrap();

        match signer.authorize_put(&k, expires, &sig, Utc::now()) {
            Err(StorageError::AuthorizationRejected { reason, .. }) => {
                assert_eq!(reason, "authorization expired")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_tampered_expiry_is_rejected() {
        let signer = signer();
        let k = key("uploads/a.txt");
        let expires = Utc::now().timestamp() + 60;
        let sig = signer.signature(&k, expires).unwrap();

        assert!(signer
            .authorize_put(&k, expires + 3600, &sig, Utc::now())
            .is_err());
        assert!(signer
            .authorize_put(&k, expires, "not-hex", Utc::now())
            .is_err());
    }

    #[tokio::test]
    async fn test_sign_put_expires_after_ttl() {
        let url = signer()
            .sign_put(&key("a.txt"), Duration::from_secs(300))
            .await
            .unwrap();
        let expires: i64 = url
            .split("X-Portal-Expires=")
            .nth(1)
            .and_then(|rest| rest.split('&').next())
            .unwrap()
            .parse()
            .unwrap();
        let delta = expires - Utc::now().timestamp();
        assert!((295..=300).contains(&delta));
    }
}
