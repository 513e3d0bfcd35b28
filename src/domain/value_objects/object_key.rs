use crate::domain::errors::ValidationError;

pub const MAX_OBJECT_KEY_BYTES: usize = 1024;

/// A validated object key that stays strictly inside the bucket namespace.
///
/// Keys are slash-delimited, relative, and free of `.`/`..` segments, so joining
/// one onto any root can never escape that root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Create a new ObjectKey with validation
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyObjectKey);
        }

        if value.len() > MAX_OBJECT_KEY_BYTES {
            return Err(ValidationError::ObjectKeyTooLong {
                actual: value.len(),
                max: MAX_OBJECT_KEY_BYTES,
            });
        }

        if let Some(c) = value.chars().find(|c| c.is_control() || *c == '\\') {
            return Err(ValidationError::InvalidObjectKeyCharacter(c));
        }

        if value.starts_with('/') {
            return Err(ValidationError::ObjectKeyStartsWithSlash);
        }

        if value.ends_with('/') {
            return Err(ValidationError::ObjectKeyEndsWithSlash);
        }

        validate_segments(&value)?;

        Ok(Self(value))
    }

    /// Resolve `requested` underneath `root` (a directory prefix, possibly empty)
    pub fn under_root(root: &str, requested: &str) -> Result<Self, ValidationError> {
        let requested = requested.trim_start_matches('/');
        if requested.is_empty() {
            return Err(ValidationError::EmptyObjectKey);
        }
        validate_segments(requested)?;
        Self::new(format!("{}{}", root, requested))
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the file name part of the key (everything after the last '/')
    pub fn file_name(&self) -> &str {
        self.0.rfind('/').map_or(&self.0, |idx| &self.0[idx + 1..])
    }
}

/// Reject empty and relative (`.`/`..`) segments
pub(crate) fn validate_segments(value: &str) -> Result<(), ValidationError> {
    for segment in value.split('/') {
        match segment {
            "" => return Err(ValidationError::ObjectKeyContainsEmptySegment),
            "." | ".." => return Err(ValidationError::ObjectKeyContainsTraversal),
            _ => {}
        }
    }
    Ok(())
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_object_key() {
        assert!(ObjectKey::new("file.txt".to_string()).is_ok());
        assert!(ObjectKey::new("folder/file.txt".to_string()).is_ok());
        assert!(ObjectKey::new("deep/folder/structure/file.txt".to_string()).is_ok());
        assert!(ObjectKey::new("names/with spaces/..hidden".to_string()).is_ok());
    }

    #[test]
    fn test_invalid_object_key() {
        assert!(ObjectKey::new("".to_string()).is_err());
        assert!(ObjectKey::new("/leading-slash".to_string()).is_err());
        assert!(ObjectKey::new("trailing/".to_string()).is_err());
        assert!(ObjectKey::new("double//slash".to_string()).is_err());
        assert!(ObjectKey::new("null\0byte".to_string()).is_err());
        assert!(ObjectKey::new("back\\slash".to_string()).is_err());
        assert!(ObjectKey::new("x".repeat(1025)).is_err());
    }

    #[test]
    fn test_traversal_is_rejected() {
        assert_eq!(
            ObjectKey::new("../etc/passwd".to_string()),
            Err(ValidationError::ObjectKeyContainsTraversal)
        );
        assert_eq!(
            ObjectKey::new("uploads/../../x".to_string()),
            Err(ValidationError::ObjectKeyContainsTraversal)
        );
        assert_eq!(
            ObjectKey::new("uploads/./x".to_string()),
            Err(ValidationError::ObjectKeyContainsTraversal)
        );
    }

    #[test]
    fn test_under_root() {
        let key = ObjectKey::under_root("uploads/", "x.zip").unwrap();
        assert_eq!(key.as_str(), "uploads/x.zip");

        let key = ObjectKey::under_root("", "/report.pdf").unwrap();
        assert_eq!(key.as_str(), "report.pdf");

        assert!(ObjectKey::under_root("uploads/", "../escape.txt").is_err());
        assert!(ObjectKey::under_root("uploads/", "").is_err());
        assert!(ObjectKey::under_root("uploads/", "/").is_err());
    }

    #[test]
    fn test_object_key_parts() {
        let key = ObjectKey::new("folder/subfolder/file.txt".to_string()).unwrap();
        assert_eq!(key.file_name(), "file.txt");

        let root_key = ObjectKey::new("file.txt".to_string()).unwrap();
        assert_eq!(root_key.file_name(), "file.txt");
    }
}
