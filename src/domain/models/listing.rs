use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One direct child of a virtual directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ListingEntry {
    File {
        name: String,
        key: String,
        size: u64,
        last_modified: DateTime<Utc>,
        #[serde(skip_serializing_if = "Option::is_none")]
        etag: Option<String>,
    },
    Directory {
        name: String,
        prefix: String,
        object_count: u64,
        total_size: u64,
        last_modified: DateTime<Utc>,
    },
}

impl ListingEntry {
    pub fn name(&self) -> &str {
        match self {
            ListingEntry::File { name, .. } | ListingEntry::Directory { name, .. } => name,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, ListingEntry::Directory { .. })
    }

    /// Files sort before directories; names order each group bytewise.
    pub(crate) fn sort_key(&self) -> (u8, &[u8]) {
        let group = if self.is_directory() { 1 } else { 0 };
        (group, self.name().as_bytes())
    }
}

/// A complete snapshot of one virtual directory.
///
/// Field order is the serialization order; it must not depend on anything but
/// the store contents so cached copies stay valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDocument {
    pub prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub entries: Vec<ListingEntry>,
}
