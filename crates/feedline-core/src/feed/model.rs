//! Feed state published by the reconciler.

use crate::post::Post;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which listing the feed was last loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedSource {
    /// `GET /feed?userId=`: the personalised feed of `user_id`.
    Feed { user_id: i64 },
    /// `GET /posts`, viewed by `viewer_id`.
    AllPosts { viewer_id: i64 },
}

impl FeedSource {
    /// Whose likes the feed reflects.
    pub fn viewer_id(&self) -> i64 {
        match self {
            FeedSource::Feed { user_id } => *user_id,
            FeedSource::AllPosts { viewer_id } => *viewer_id,
        }
    }
}

/// Result of a like toggle that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LikeOutcome {
    Liked,
    Unliked,
    /// The backend already had the like; local state now agrees with it.
    AlreadyLiked,
    /// Another like/unlike was still pending; nothing was sent.
    Skipped,
}

/// Snapshot of the feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSnapshot {
    pub posts: Vec<Post>,
    /// Viewer's like state for posts the backend sent without one.
    pub like_cache: HashMap<i64, bool>,
    pub source: Option<FeedSource>,
    pub loading: bool,
    /// Bumped on every load and clear; results captured under an older
    /// value are dropped.
    pub generation: u64,
    /// Viewer's like id per post, learned from add-like responses and
    /// like lists.
    pub(crate) like_ids: HashMap<i64, i64>,
}

impl FeedSnapshot {
    pub fn post(&self, post_id: i64) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    /// `has_user_liked` when the backend sent it, else the cache, else false.
    pub fn is_liked(&self, post_id: i64) -> bool {
        self.post(post_id)
            .and_then(|p| p.has_user_liked)
            .or_else(|| self.like_cache.get(&post_id).copied())
            .unwrap_or(false)
    }
}
