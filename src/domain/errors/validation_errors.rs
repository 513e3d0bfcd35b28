/// Validation errors for domain value objects
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    // ObjectKey validation errors
    EmptyObjectKey,
    ObjectKeyTooLong {
        actual: usize,
        max: usize,
    },
    InvalidObjectKeyCharacter(char),
    ObjectKeyStartsWithSlash,
    ObjectKeyContainsEmptySegment,
    ObjectKeyContainsTraversal,
    ObjectKeyEndsWithSlash,

    // Route pattern validation errors
    RoutePrefixMissingSlash(String),
    RoutePrefixIsRoot(String),
    RoutePrefixTrailingSlash(String),
    DuplicateRoutePrefix(String),

    // Settings validation errors
    InvalidField {
        field: String,
        value: String,
        expected: String,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ObjectKey errors
            ValidationError::EmptyObjectKey => write!(f, "Object key cannot be empty"),
            ValidationError::ObjectKeyTooLong { actual, max } => {
                write!(f, "Object key too long: {} bytes (max: {})", actual, max)
            }
            ValidationError::InvalidObjectKeyCharacter(c) => {
                write!(f, "Invalid character in object key: {:?}", c)
            }
            ValidationError::ObjectKeyStartsWithSlash => {
                write!(f, "Object key cannot start with '/'")
            }
            ValidationError::ObjectKeyContainsEmptySegment => {
                write!(f, "Object key cannot contain empty path segments")
            }
            ValidationError::ObjectKeyContainsTraversal => {
                write!(f, "Object key cannot contain '.' or '..' segments")
            }
            ValidationError::ObjectKeyEndsWithSlash => {
                write!(f, "Object key cannot end with '/'")
            }

            // Route pattern errors
            ValidationError::RoutePrefixMissingSlash(prefix) => {
                write!(f, "Route prefix must start with '/': {}", prefix)
            }
            ValidationError::RoutePrefixIsRoot(name) => {
                write!(f, "Route prefix for {} cannot be '/'", name)
            }
            ValidationError::RoutePrefixTrailingSlash(prefix) => {
                write!(f, "Route prefix cannot end with '/': {}", prefix)
            }
            ValidationError::DuplicateRoutePrefix(prefix) => {
                write!(f, "Route prefix bound to more than one route class: {}", prefix)
            }

            ValidationError::InvalidField {
                field,
                value,
                expected,
            } => {
                write!(
                    f,
                    "Invalid value for field '{}': '{}' (expected: {})",
                    field, value, expected
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
