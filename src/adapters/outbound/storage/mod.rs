// Infrastructure error conversions
pub mod error;

// Storage implementations
pub mod apache_object_store_adapter;
pub mod s3;
pub mod signer;

// Re-export key types
pub use apache_object_store_adapter::{ApacheObjectStoreAdapter, DEFAULT_STORE_TIMEOUT};
pub use s3::{create_s3_store, S3Config};
pub use signer::{LocalUploadSigner, ObjectStoreUploadSigner, EXPIRES_PARAM, SIGNATURE_PARAM};
