//! Post and like domain models.

use serde::{Deserialize, Serialize};

/// A feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub author_alias: String,
    pub message: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub likes_count: u32,
    /// Whether the viewer liked this post. Authoritative when the backend
    /// sends it; `None` means the reconciler's like-state cache decides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_user_liked: Option<bool>,
}

impl Post {
    /// Upper-cased first letter of the author's alias, used for avatars.
    pub fn author_initial(&self) -> Option<char> {
        self.author_alias.chars().next().map(|c| c.to_ascii_uppercase())
    }

    pub fn is_authored_by(&self, user_id: i64) -> bool {
        self.author_id == user_id
    }
}

/// A like as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
    #[serde(default)]
    pub created_at: String,
}

/// Payload of `POST /posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub author_id: i64,
    pub message: String,
}

/// Payload of `POST /posts/{id}/likes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLikeRequest {
    pub user_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_without_like_flag() {
        let json = r#"[{
            "id": 1,
            "authorId": 2,
            "authorAlias": "zoe",
            "message": "hello",
            "createdAt": "2024-05-01T12:00:00",
            "likesCount": 3
        }]"#;

        let posts: Vec<Post> = serde_json::from_str(json).unwrap();
        assert_eq!(posts[0].likes_count, 3);
        assert_eq!(posts[0].has_user_liked, None);
        assert_eq!(posts[0].author_initial(), Some('Z'));
    }

    #[test]
    fn test_post_with_like_flag() {
        let json = r#"{"id":1,"authorId":2,"authorAlias":"zoe","message":"hi","likesCount":0,"hasUserLiked":true}"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.has_user_liked, Some(true));
        assert!(post.is_authored_by(2));
    }

    #[test]
    fn test_like_request_is_camel_case() {
        let body = serde_json::to_value(CreateLikeRequest { user_id: 9 }).unwrap();
        assert_eq!(body, serde_json::json!({ "userId": 9 }));
    }
}
