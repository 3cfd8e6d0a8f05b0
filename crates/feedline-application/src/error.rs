use feedline_core::api::ApiError;
use feedline_core::feed::FeedError;
use feedline_core::session::AuthError;
use thiserror::Error;

/// Failure of a client use case.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The action needs a signed-in user and there is none.
    #[error("Not signed in")]
    NotAuthenticated,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("Failed to initialise the client: {0}")]
    Setup(String),
}

impl ClientError {
    /// The backend error behind this failure, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Auth(AuthError::Api(err)) => Some(err),
            Self::Feed(err) => err.api_error(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.api_error(), Some(ApiError::Unauthorized))
    }
}

/// A type alias for `Result<T, ClientError>`.
pub type ClientResult<T> = std::result::Result<T, ClientError>;
