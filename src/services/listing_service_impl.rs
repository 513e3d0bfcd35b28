use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{collections::BTreeMap, sync::Arc, time::Duration};
use tracing::{debug, warn};

use crate::{
    domain::{
        errors::{PortalError, PortalResult},
        models::{ListingDocument, ListingEntry, ObjectInfo},
        value_objects::ListingPrefix,
    },
    ports::{services::ListingRenderer, storage::ObjectStore},
};

/// Tuning for listing queries
#[derive(Debug, Clone)]
pub struct ListingSettings {
    /// Keys requested per store page
    pub page_size: usize,
    /// Upper bound for stitching every page of one listing
    pub timeout: Duration,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            page_size: 1000,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Builds virtual directories from the store's flat key namespace
#[derive(Clone)]
pub struct ListingRendererImpl {
    store: Arc<dyn ObjectStore>,
    settings: ListingSettings,
}

impl ListingRendererImpl {
    pub fn new(store: Arc<dyn ObjectStore>, settings: ListingSettings) -> Self {
        Self { store, settings }
    }

    /// Follow continuation tokens until the store reports no further page
    async fn collect_all(&self, prefix: &ListingPrefix) -> PortalResult<Vec<ObjectInfo>> {
        let store_prefix = if prefix.is_root() {
            None
        } else {
            Some(prefix.as_str())
        };

        let mut objects = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .store
                .list_page(store_prefix, token.as_deref(), self.settings.page_size)
                .await
                .map_err(|e| {
                    warn!(prefix = %prefix, page = pages, error = %e, "listing page failed");
                    PortalError::from_storage(prefix.as_str(), e)
                })?;
            pages += 1;
            objects.extend(page.objects);

            match page.next_token {
                None => break,
                Some(next) if token.as_deref() == Some(next.as_str()) => {
                    return Err(PortalError::UpstreamUnavailable {
                        path: prefix.to_string(),
                        message: format!("store repeated continuation token '{}'", next),
                    });
                }
                Some(next) => token = Some(next),
            }
        }

        debug!(prefix = %prefix, pages, objects = objects.len(), "listing stitched");
        Ok(objects)
    }
}

#[async_trait]
impl ListingRenderer for ListingRendererImpl {
    async fn render_listing(&self, virtual_path: &str) -> PortalResult<ListingDocument> {
        let prefix = ListingPrefix::parse(virtual_path).map_err(|e| PortalError::InvalidKey {
            path: virtual_path.to_string(),
            reason: e.to_string(),
        })?;

        let objects = tokio::time::timeout(self.settings.timeout, self.collect_all(&prefix))
            .await
            .map_err(|_| PortalError::UpstreamUnavailable {
                path: prefix.to_string(),
                message: format!(
                    "listing did not complete within {}s",
                    self.settings.timeout.as_secs()
                ),
            })??;

        let entries = synthesize_entries(&prefix, &objects);
        if entries.is_empty() && !prefix.is_root() {
            return Err(PortalError::NotFound {
                path: prefix.to_string(),
            });
        }

        Ok(ListingDocument {
            prefix: prefix.to_string(),
            parent: prefix.parent().map(|p| p.to_string()),
            entries,
        })
    }
}

#[derive(Debug)]
struct DirectorySummary {
    object_count: u64,
    total_size: u64,
    last_modified: DateTime<Utc>,
}

/// Collapse keys under `prefix` into one entry per direct child.
///
/// A key directly under the prefix becomes a file entry; every deeper key is
/// folded into the directory entry named by its next segment.
pub fn synthesize_entries(prefix: &ListingPrefix, objects: &[ObjectInfo]) -> Vec<ListingEntry> {
    let mut files: BTreeMap<&str, &ObjectInfo> = BTreeMap::new();
    let mut directories: BTreeMap<&str, DirectorySummary> = BTreeMap::new();

    for object in objects {
        let Some(rest) = object.key.strip_prefix(prefix.as_str()) else {
            continue;
        };

        match rest.split_once('/') {
            None if rest.is_empty() => continue,
            None => {
                files.insert(rest, object);
            }
            Some(("", _)) => {
                debug!(key = %object.key, "skipping key with empty segment");
            }
            Some((segment, _)) => {
                directories
                    .entry(segment)
                    .and_modify(|summary| {
                        summary.object_count += 1;
                        summary.total_size += object.size;
                        summary.last_modified = summary.last_modified.max(object.last_modified);
                    })
                    .or_insert(DirectorySummary {
                        object_count: 1,
                        total_size: object.size,
                        last_modified: object.last_modified,
                    });
            }
        }
    }

    let mut entries: Vec<ListingEntry> = files
        .into_iter()
        .map(|(name, object)| ListingEntry::File {
            name: name.to_string(),
            key: object.key.clone(),
            size: object.size,
            last_modified: object.last_modified,
            etag: object.etag.clone(),
        })
        .chain(
            directories
                .into_iter()
                .map(|(name, summary)| ListingEntry::Directory {
                    name: name.to_string(),
                    prefix: prefix.child(name).to_string(),
                    object_count: summary.object_count,
                    total_size: summary.total_size,
                    last_modified: summary.last_modified,
                }),
        )
        .collect();

    entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    entries
}
