use thiserror::Error;

/// Errors raised while parsing core value types.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
}

/// Errors returned by the storage contract.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

/// Errors returned by the shortening engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShortenerError {
    /// The short code was never allocated or has expired.
    #[error("{0}")]
    NotFound(String),
    /// The backing store could not be reached or misbehaved.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ShortenerError {
    /// Message used for every lookup miss.
    pub const UNKNOWN_SHORT_URL: &'static str = "unknown short url";

    pub fn unknown_short_url() -> Self {
        Self::NotFound(Self::UNKNOWN_SHORT_URL.to_string())
    }

    /// Whether the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<StorageError> for ShortenerError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::NotFound(_) => Self::unknown_short_url(),
            other => Self::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<CoreError> for ShortenerError {
    fn from(value: CoreError) -> Self {
        match value {
            CoreError::InvalidShortCode(message) => Self::InvalidInput(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_not_found_maps_to_unknown_short_url() {
        let err = ShortenerError::from(StorageError::NotFound("db_shortlink:x".into()));
        assert_eq!(err, ShortenerError::NotFound("unknown short url".into()));
        assert!(!err.is_retryable());
    }

    #[test]
    fn storage_failures_map_to_store_unavailable() {
        for err in [
            StorageError::Unavailable("connection refused".into()),
            StorageError::Timeout("timed out".into()),
            StorageError::InvalidData("bad json".into()),
            StorageError::Operation("WRONGTYPE".into()),
        ] {
            let mapped = ShortenerError::from(err);
            assert!(matches!(mapped, ShortenerError::StoreUnavailable(_)));
            assert!(mapped.is_retryable());
        }
    }

    #[test]
    fn not_found_displays_plain_message() {
        assert_eq!(
            ShortenerError::unknown_short_url().to_string(),
            "unknown short url"
        );
    }
}
