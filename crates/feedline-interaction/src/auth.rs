use crate::backend::HttpBackend;
use async_trait::async_trait;
use feedline_core::api::{ApiResult, AuthApi};
use feedline_core::session::{AuthTokens, Credentials, RefreshRequest};
use feedline_core::user::{RegisterRequest, User};

#[async_trait]
impl AuthApi for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthTokens> {
        self.post_json("/auth/login", credentials, false).await
    }

    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthTokens> {
        self.post_json("/auth/register", request, false).await
    }

    async fn refresh(&self, refresh_token: &str) -> ApiResult<AuthTokens> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.post_json("/auth/refresh", &body, false).await
    }

    async fn get_user(&self, user_id: i64) -> ApiResult<User> {
        self.get_json(&format!("/auth/users/{}", user_id), &[]).await
    }
}
