//! Backend seams.
//!
//! The session manager and the feed reconciler talk to the backend only
//! through these traits. `feedline-interaction` provides the HTTP
//! implementation; tests provide in-memory ones.
//!
//! Paths are relative to the BFF base (`/api/v1/bff`).

mod error;

pub use error::{ApiError, ErrorMessage};

use crate::post::{CreateLikeRequest, CreatePostRequest, Like, Post};
use crate::session::{AuthTokens, Credentials};
use crate::user::{RegisterRequest, User};
use async_trait::async_trait;

/// A type alias for `Result<T, ApiError>`.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Authentication endpoints under `/auth`.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthTokens>;

    /// `POST /auth/register`
    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthTokens>;

    /// `POST /auth/refresh`
    async fn refresh(&self, refresh_token: &str) -> ApiResult<AuthTokens>;

    /// `GET /auth/users/{id}`
    async fn get_user(&self, user_id: i64) -> ApiResult<User>;
}

/// Post and like endpoints.
#[async_trait]
pub trait FeedApi: Send + Sync {
    /// `GET /feed?userId={id}`
    async fn get_feed(&self, user_id: i64) -> ApiResult<Vec<Post>>;

    /// `GET /posts`
    async fn get_all_posts(&self) -> ApiResult<Vec<Post>>;

    /// `POST /posts`
    async fn create_post(&self, request: &CreatePostRequest) -> ApiResult<Post>;

    /// `DELETE /posts/{id}` (administrators only)
    async fn delete_post(&self, post_id: i64) -> ApiResult<()>;

    /// `GET /posts/{id}/likes`
    async fn get_likes(&self, post_id: i64) -> ApiResult<Vec<Like>>;

    /// `POST /posts/{id}/likes`
    async fn add_like(&self, post_id: i64, request: &CreateLikeRequest) -> ApiResult<Like>;

    /// `DELETE /posts/{id}/likes/{likeId}`
    async fn remove_like(&self, post_id: i64, like_id: i64) -> ApiResult<()>;
}
