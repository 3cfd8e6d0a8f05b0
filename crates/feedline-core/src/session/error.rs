use crate::api::ApiError;
use crate::error::FeedlineError;
use crate::user::ValidationIssue;
use thiserror::Error;

/// Why a login, registration or refresh did not produce a session.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    /// Client-side validation failed; nothing was sent.
    #[error("Invalid input: {}", join_issues(.0))]
    InvalidInput(Vec<ValidationIssue>),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("No refresh token available")]
    NoRefreshToken,

    /// The session was replaced (e.g. logged out) while the request was in
    /// flight; its result was discarded.
    #[error("Session changed while the request was in flight")]
    SessionChanged,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Token storage error: {0}")]
    Storage(String),
}

impl AuthError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(ApiError::Unauthorized))
    }
}

impl From<FeedlineError> for AuthError {
    fn from(err: FeedlineError) -> Self {
        Self::Storage(err.to_string())
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
