//! Backend error taxonomy and its user-facing rendering.

use crate::notification::Severity;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every way a call to the backend can fail.
///
/// [`ApiError::from_status`] is the single place where HTTP status codes
/// become variants; transports only have to report the status and whatever
/// `message` the response body carried.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, TLS, ...)
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    /// Duplicate resource, e.g. liking a post twice
    #[error("Conflict: {}", .0.as_deref().unwrap_or("resource already exists"))]
    Conflict(Option<String>),

    /// 400 / 422
    #[error("Validation failed ({status}): {message}")]
    Validation { status: u16, message: String },

    #[error("Not found")]
    NotFound,

    /// 5xx
    #[error("Server error ({status})")]
    Server { status: u16 },

    /// The response arrived but its body did not have the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Unexpected response ({status}): {message}")]
    Unknown { status: u16, message: String },
}

impl ApiError {
    /// Maps an HTTP status (and the optional `message` from the error body)
    /// to a variant.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            400 | 422 => Self::Validation {
                status,
                message: message.unwrap_or_default(),
            },
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict(message),
            500..=599 => Self::Server { status },
            _ => Self::Unknown {
                status,
                message: message.unwrap_or_default(),
            },
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// HTTP status behind this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Forbidden => Some(403),
            Self::NotFound => Some(404),
            Self::Conflict(_) => Some(409),
            Self::Validation { status, .. }
            | Self::Server { status }
            | Self::Unknown { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) => None,
        }
    }
}

/// A backend error rendered for the notification surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
    pub severity: Severity,
    pub details: Option<String>,
}

impl ErrorMessage {
    fn new(message: &str, severity: Severity, details: impl Into<String>) -> Self {
        Self {
            message: message.to_string(),
            severity,
            details: Some(details.into()),
        }
    }

    /// One line suitable for a toast: `"<message>: <details>"`.
    pub fn summary(&self) -> String {
        match &self.details {
            Some(details) if !details.is_empty() => format!("{}: {}", self.message, details),
            _ => self.message.clone(),
        }
    }
}

fn or_default(message: &str, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message.to_string()
    }
}

impl From<&ApiError> for ErrorMessage {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Network(details) => {
                ErrorMessage::new("Connection error", Severity::Error, details.clone())
            }
            ApiError::Validation { status: 422, message } => ErrorMessage::new(
                "Invalid data",
                Severity::Error,
                or_default(message, "The provided data is not valid"),
            ),
            ApiError::Validation { message, .. } => ErrorMessage::new(
                "Invalid request",
                Severity::Error,
                or_default(message, "The submitted data is not valid"),
            ),
            ApiError::Unauthorized => ErrorMessage::new(
                "Unauthorized",
                Severity::Error,
                "Your session has expired. Please sign in again",
            ),
            ApiError::Forbidden => ErrorMessage::new(
                "Access denied",
                Severity::Error,
                "You do not have permission to perform this action",
            ),
            ApiError::NotFound => ErrorMessage::new(
                "Resource not found",
                Severity::Error,
                "The requested resource does not exist",
            ),
            ApiError::Conflict(message) => ErrorMessage::new(
                "Conflict",
                Severity::Warning,
                or_default(
                    message.as_deref().unwrap_or_default(),
                    "A resource with this data already exists",
                ),
            ),
            ApiError::Server { .. } => ErrorMessage::new(
                "Server error",
                Severity::Error,
                "An internal server error occurred",
            ),
            ApiError::Decode(details) => {
                ErrorMessage::new("Unexpected error", Severity::Error, details.clone())
            }
            ApiError::Unknown { status, message } => ErrorMessage::new(
                "Unexpected error",
                Severity::Error,
                format!("Error {}: {}", status, message),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_taxonomy() {
        assert_eq!(ApiError::from_status(401, None), ApiError::Unauthorized);
        assert_eq!(ApiError::from_status(403, None), ApiError::Forbidden);
        assert_eq!(ApiError::from_status(404, None), ApiError::NotFound);
        assert_eq!(
            ApiError::from_status(409, Some("already liked".into())),
            ApiError::Conflict(Some("already liked".into()))
        );
        assert!(matches!(
            ApiError::from_status(422, None),
            ApiError::Validation { status: 422, .. }
        ));
        assert_eq!(ApiError::from_status(503, None), ApiError::Server { status: 503 });
        assert!(matches!(
            ApiError::from_status(418, None),
            ApiError::Unknown { status: 418, .. }
        ));
    }

    #[test]
    fn test_conflict_renders_as_warning() {
        let message = ErrorMessage::from(&ApiError::Conflict(None));
        assert_eq!(message.severity, Severity::Warning);
        assert_eq!(
            message.details.as_deref(),
            Some("A resource with this data already exists")
        );
    }

    #[test]
    fn test_validation_prefers_server_message() {
        let err = ApiError::from_status(400, Some("alias taken".into()));
        let message = ErrorMessage::from(&err);
        assert_eq!(message.message, "Invalid request");
        assert_eq!(message.summary(), "Invalid request: alias taken");
    }

    #[test]
    fn test_status_round_trips_for_response_errors() {
        assert_eq!(ApiError::Unauthorized.status(), Some(401));
        assert_eq!(ApiError::network("refused").status(), None);
    }
}
