//! Local failures: reading config, touching the token file, parsing JSON.
//!
//! Anything that comes back over the wire is an [`crate::api::ApiError`]
//! instead.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedlineError {
    #[error("IO error: {0}")]
    Io(String),

    /// A document on disk could not be parsed or written.
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: &'static str, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    /// The token store refused a write.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl FeedlineError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<std::io::Error> for FeedlineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for FeedlineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON",
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedlineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: FeedlineError = io.into();
        assert!(err.is_io());
        assert!(err.to_string().contains("PermissionDenied"));
    }

    #[test]
    fn test_json_error_is_serialization() {
        let parse = serde_json::from_str::<serde_json::Value>("{ broken").unwrap_err();
        let err: FeedlineError = parse.into();
        assert!(err.is_serialization());
        assert!(err.to_string().starts_with("Serialization error: JSON"));
    }

    #[test]
    fn test_storage_error_is_not_config() {
        let err = FeedlineError::storage("disk full");
        assert!(!err.is_config());
        assert_eq!(err.to_string(), "Storage error: disk full");
    }
}
