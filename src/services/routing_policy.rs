use http::Method;

use crate::domain::{
    errors::{PortalError, PortalResult, ValidationError},
    models::{CacheDirective, RouteClass},
};

/// Configured path prefixes; anything they do not claim is a listing
#[derive(Debug, Clone)]
pub struct RoutePatterns {
    pub upload_prefix: String,
    pub download_prefix: String,
}

impl Default for RoutePatterns {
    fn default() -> Self {
        Self {
            upload_prefix: "/upload-url".to_string(),
            download_prefix: "/download".to_string(),
        }
    }
}

/// Edge cache lifetimes for the cacheable route classes
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    pub listing_max_age_secs: u64,
    pub download_max_age_secs: u64,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            listing_max_age_secs: 60,
            download_max_age_secs: 86_400,
        }
    }
}

/// Result of matching a path against the route table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub class: RouteClass,
    /// The path with the matched prefix and its separating `/` removed
    pub remainder: &'a str,
}

/// Classifies requests into route classes and decides their cacheability
#[derive(Debug, Clone)]
pub struct RoutingPolicy {
    /// Longest prefix first
    table: Vec<(String, RouteClass)>,
    cache: CachePolicy,
}

impl RoutingPolicy {
    /// Validate the patterns; ambiguous or malformed tables never reach request time
    pub fn new(patterns: RoutePatterns, cache: CachePolicy) -> Result<Self, ValidationError> {
        let mut table = vec![
            (
                validate_prefix("upload", patterns.upload_prefix)?,
                RouteClass::UploadAuth,
            ),
            (
                validate_prefix("download", patterns.download_prefix)?,
                RouteClass::DownloadPassthrough,
            ),
        ];

        table.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        if let Some(pair) = table.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(ValidationError::DuplicateRoutePrefix(pair[0].0.clone()));
        }

        Ok(Self { table, cache })
    }

    /// Match `path` against the table, most specific prefix first
    pub fn match_path<'a>(&self, path: &'a str) -> RouteMatch<'a> {
        for (prefix, class) in &self.table {
            if let Some(rest) = path.strip_prefix(prefix.as_str()) {
                if rest.is_empty() {
                    return RouteMatch {
                        class: *class,
                        remainder: rest,
                    };
                }
                if let Some(remainder) = rest.strip_prefix('/') {
                    return RouteMatch {
                        class: *class,
                        remainder,
                    };
                }
            }
        }

        RouteMatch {
            class: RouteClass::Listing,
            remainder: path.trim_start_matches('/'),
        }
    }

    /// Classify a request. Total: every pair yields a class or `MethodNotAllowed`.
    pub fn classify(&self, path: &str, method: &Method) -> PortalResult<RouteClass> {
        let class = self.match_path(path).class;
        if class.allows(method) {
            Ok(class)
        } else {
            Err(PortalError::MethodNotAllowed {
                path: path.to_string(),
                method: method.to_string(),
                class,
            })
        }
    }

    pub fn cache_directive(&self, class: RouteClass) -> CacheDirective {
        match class {
            RouteClass::UploadAuth => CacheDirective::NoStore,
            RouteClass::Listing => CacheDirective::Optimized {
                max_age_secs: self.cache.listing_max_age_secs,
            },
            RouteClass::DownloadPassthrough => CacheDirective::Optimized {
                max_age_secs: self.cache.download_max_age_secs,
            },
        }
    }

    pub fn prefix_for(&self, class: RouteClass) -> Option<&str> {
        self.table
            .iter()
            .find(|(_, c)| *c == class)
            .map(|(prefix, _)| prefix.as_str())
    }
}

fn validate_prefix(name: &str, prefix: String) -> Result<String, ValidationError> {
    if !prefix.starts_with('/') {
        return Err(ValidationError::RoutePrefixMissingSlash(prefix));
    }
    if prefix == "/" {
        return Err(ValidationError::RoutePrefixIsRoot(name.to_string()));
    }
    if prefix.ends_with('/') {
        return Err(ValidationError::RoutePrefixTrailingSlash(prefix));
    }
    Ok(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RoutingPolicy {
        RoutingPolicy::new(RoutePatterns::default(), CachePolicy::default()).unwrap()
    }

    #[test]
    fn test_classification_by_prefix() {
        let policy = policy();
        assert_eq!(
            policy.classify("/upload-url", &Method::GET),
            Ok(RouteClass::UploadAuth)
        );
        assert_eq!(
            policy.classify("/download/a/b.txt", &Method::GET),
            Ok(RouteClass::DownloadPassthrough)
        );
        assert_eq!(
            policy.classify("/download", &Method::HEAD),
            Ok(RouteClass::DownloadPassthrough)
        );
        assert_eq!(policy.classify("/", &Method::GET), Ok(RouteClass::Listing));
        assert_eq!(
            policy.classify("/docs/sub/", &Method::HEAD),
            Ok(RouteClass::Listing)
        );
    }

    #[test]
    fn test_prefixes_match_on_segment_boundaries() {
        let policy = policy();
        assert_eq!(policy.match_path("/downloads/x").class, RouteClass::Listing);
        assert_eq!(policy.match_path("/upload-urls").class, RouteClass::Listing);
        assert_eq!(policy.match_path("/download/a/b").remainder, "a/b");
        assert_eq!(policy.match_path("/docs/a").remainder, "docs/a");
    }

    #[test]
    fn test_wrong_method_is_not_downgraded() {
        let policy = policy();
        for (path, method) in [
            ("/upload-url", Method::PUT),
            ("/upload-url", Method::HEAD),
            ("/download/x", Method::POST),
            ("/docs/", Method::DELETE),
        ] {
            match policy.classify(path, &method) {
                Err(PortalError::MethodNotAllowed { path: p, .. }) => assert_eq!(p, path),
                other => panic!("{method} {path} gave {other:?}"),
            }
        }
    }

    #[test]
    fn test_most_specific_prefix_wins() {
        let policy = RoutingPolicy::new(
            RoutePatterns {
                upload_prefix: "/files/upload".to_string(),
                download_prefix: "/files".to_string(),
            },
            CachePolicy::default(),
        )
        .unwrap();

        assert_eq!(
            policy.match_path("/files/upload").class,
            RouteClass::UploadAuth
        );
        assert_eq!(
            policy.match_path("/files/uploaded.txt").class,
            RouteClass::DownloadPassthrough
        );
    }

    #[test]
    fn test_invalid_tables_fail_at_construction() {
        let build = |upload: &str, download: &str| {
            RoutingPolicy::new(
                RoutePatterns {
                    upload_prefix: upload.to_string(),
                    download_prefix: download.to_string(),
                },
                CachePolicy::default(),
            )
        };

        assert_eq!(
            build("/same", "/same").unwrap_err(),
            ValidationError::DuplicateRoutePrefix("/same".to_string())
        );
        assert!(build("upload", "/download").is_err());
        assert!(build("/", "/download").is_err());
        assert!(build("/upload/", "/download").is_err());
    }

    #[test]
    fn test_cache_directives() {
        let policy = policy();
        assert_eq!(
            policy.cache_directive(RouteClass::UploadAuth).header_value(),
            "no-store"
        );
        assert_eq!(
            policy.cache_directive(RouteClass::Listing).header_value(),
            "public, max-age=60"
        );
        assert_eq!(
            policy
                .cache_directive(RouteClass::DownloadPassthrough)
                .header_value(),
            "public, max-age=86400"
        );
    }
}
