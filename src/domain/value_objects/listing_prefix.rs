use crate::domain::errors::ValidationError;

use super::object_key::validate_segments;

/// A normalized virtual-directory prefix.
///
/// The root is the empty prefix; every other prefix is relative and ends with
/// exactly one `/`, so a key belongs under it iff the key starts with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingPrefix(String);

impl ListingPrefix {
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Normalize a request path such as `/docs`, `docs/` or `` into a prefix
    pub fn parse(virtual_path: &str) -> Result<Self, ValidationError> {
        let trimmed = virtual_path.trim_start_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        if let Some(c) = trimmed.chars().find(|c| c.is_control() || *c == '\\') {
            return Err(ValidationError::InvalidObjectKeyCharacter(c));
        }

        let body = trimmed.strip_suffix('/').unwrap_or(trimmed);
        validate_segments(body)?;

        Ok(Self(format!("{}/", body)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The enclosing directory, or None at the root
    pub fn parent(&self) -> Option<ListingPrefix> {
        if self.is_root() {
            return None;
        }
        let body = &self.0[..self.0.len() - 1];
        Some(match body.rfind('/') {
            Some(idx) => Self(body[..idx + 1].to_string()),
            None => Self::root(),
        })
    }

    /// Prefix for the child directory `name`
    pub fn child(&self, name: &str) -> ListingPrefix {
        Self(format!("{}{}/", self.0, name))
    }
}

impl std::fmt::Display for ListingPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(ListingPrefix::parse("").unwrap().as_str(), "");
        assert_eq!(ListingPrefix::parse("/").unwrap().as_str(), "");
        assert_eq!(ListingPrefix::parse("docs/").unwrap().as_str(), "docs/");
        assert_eq!(ListingPrefix::parse("/docs").unwrap().as_str(), "docs/");
        assert_eq!(ListingPrefix::parse("/a/b/").unwrap().as_str(), "a/b/");
    }

    #[test]
    fn test_rejects_traversal_and_empty_segments() {
        assert!(ListingPrefix::parse("docs/../secret/").is_err());
        assert!(ListingPrefix::parse("docs//sub/").is_err());
        assert!(ListingPrefix::parse("./").is_err());
    }

    #[test]
    fn test_parent_and_child() {
        let prefix = ListingPrefix::parse("a/b/").unwrap();
        assert_eq!(prefix.parent().unwrap().as_str(), "a/");
        assert_eq!(prefix.parent().unwrap().parent().unwrap(), ListingPrefix::root());
        assert_eq!(ListingPrefix::root().parent(), None);
        assert_eq!(prefix.child("c").as_str(), "a/b/c/");
    }
}
