//! S3-compatible backend construction

use anyhow::{Context, Result};
use object_store::aws::{AmazonS3, AmazonS3Builder};
use std::sync::Arc;

/// Configuration for S3 storage backend
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub endpoint: Option<String>,
    pub allow_http: bool,
}

/// Create an S3 store from configuration.
///
/// The concrete type is returned so the same client can serve both as the
/// object store and as the upload signer.
pub fn create_s3_store(config: &S3Config) -> Result<Arc<AmazonS3>> {
    let mut builder = AmazonS3Builder::new()
        .with_bucket_name(&config.bucket)
        .with_region(&config.region)
        .with_allow_http(config.allow_http);

    if let Some(access_key) = &config.access_key {
        builder = builder.with_access_key_id(access_key);
    }

    if let Some(secret_key) = &config.secret_key {
        builder = builder.with_secret_access_key(secret_key);
    }

    if let Some(endpoint) = &config.endpoint {
        builder = builder.with_endpoint(endpoint);
    }

    let store = builder
        .build()
        .with_context(|| format!("Failed to build S3 store for bucket {}", config.bucket))?;

    Ok(Arc::new(store))
}
