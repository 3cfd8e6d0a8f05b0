use crate::api::ApiError;
use thiserror::Error;

/// Why a feed action did not go through.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    #[error("Post message cannot be empty")]
    EmptyMessage,

    #[error("Only administrators can delete posts")]
    PermissionDenied,

    #[error("Post {0} is not in the feed")]
    PostNotFound(i64),

    /// Unlike was requested but the viewer's like could not be found.
    #[error("No like by the current user on post {0}")]
    LikeNotFound(i64),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl FeedError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(ApiError::Unauthorized))
    }

    /// The backend error behind this failure, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// A type alias for `Result<T, FeedError>`.
pub type FeedResult<T> = std::result::Result<T, FeedError>;
