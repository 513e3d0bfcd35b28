use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::ObjectKey;

/// The only operation an upload authorization ever grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UploadMethod {
    Put,
}

impl UploadMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadMethod::Put => "PUT",
        }
    }
}

/// A bearer credential permitting a single PUT of `target_key` until `expires_at`
#[derive(Debug, Clone)]
pub struct UploadAuthorization {
    pub id: Uuid,
    pub target_key: ObjectKey,
    pub url: String,
    pub method: UploadMethod,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
