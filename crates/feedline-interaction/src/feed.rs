use crate::backend::HttpBackend;
use async_trait::async_trait;
use feedline_core::api::{ApiResult, FeedApi};
use feedline_core::post::{CreateLikeRequest, CreatePostRequest, Like, Post};

#[async_trait]
impl FeedApi for HttpBackend {
    async fn get_feed(&self, user_id: i64) -> ApiResult<Vec<Post>> {
        self.get_json("/feed", &[("userId", user_id.to_string())])
            .await
    }

    async fn get_all_posts(&self) -> ApiResult<Vec<Post>> {
        self.get_json("/posts", &[]).await
    }

    async fn create_post(&self, request: &CreatePostRequest) -> ApiResult<Post> {
        self.post_json("/posts", request, true).await
    }

    async fn delete_post(&self, post_id: i64) -> ApiResult<()> {
        self.delete(&format!("/posts/{}", post_id)).await
    }

    async fn get_likes(&self, post_id: i64) -> ApiResult<Vec<Like>> {
        self.get_json(&format!("/posts/{}/likes", post_id), &[])
            .await
    }

    async fn add_like(&self, post_id: i64, request: &CreateLikeRequest) -> ApiResult<Like> {
        self.post_json(&format!("/posts/{}/likes", post_id), request, true)
            .await
    }

    async fn remove_like(&self, post_id: i64, like_id: i64) -> ApiResult<()> {
        self.delete(&format!("/posts/{}/likes/{}", post_id, like_id))
            .await
    }
}
