use super::error::{FeedError, FeedResult};
use super::model::{FeedSnapshot, FeedSource, LikeOutcome};
use crate::api::{ApiError, FeedApi};
use crate::post::{CreateLikeRequest, CreatePostRequest, Post};
use crate::user::User;
use futures::stream::{self, StreamExt};
use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

pub const DEFAULT_LIKE_STATE_CONCURRENCY: usize = 8;

/// Owns the post collection and the viewer's like state.
///
/// Like and unlike are applied optimistically: the post is updated before
/// the request goes out and restored if it fails. Only one like/unlike may
/// be pending at a time across the whole feed.
///
/// Cheap to clone; clones share the same feed.
#[derive(Clone)]
pub struct FeedReconciler {
    api: Arc<dyn FeedApi>,
    state: Arc<watch::Sender<FeedSnapshot>>,
    like_in_flight: Arc<AtomicBool>,
    like_state_concurrency: usize,
}

/// What a post looked like before an optimistic change.
#[derive(Debug, Clone, Copy)]
struct LikeRollback {
    generation: u64,
    liked: bool,
    likes_count: u32,
    has_user_liked: Option<bool>,
    cached: Option<bool>,
}

/// Holds the single-flight slot; released on drop.
struct LikeFlight<'a>(&'a AtomicBool);

impl<'a> LikeFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for LikeFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl FeedReconciler {
    pub fn new(api: Arc<dyn FeedApi>) -> Self {
        let (state, _) = watch::channel(FeedSnapshot::default());
        Self {
            api,
            state: Arc::new(state),
            like_in_flight: Arc::new(AtomicBool::new(false)),
            like_state_concurrency: DEFAULT_LIKE_STATE_CONCURRENCY,
        }
    }

    /// Caps concurrent `GET /posts/{id}/likes` calls during a load.
    pub fn with_like_state_concurrency(mut self, limit: usize) -> Self {
        self.like_state_concurrency = limit.max(1);
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.state.borrow().clone()
    }

    pub fn posts(&self) -> Vec<Post> {
        self.state.borrow().posts.clone()
    }

    pub fn has_user_liked(&self, post_id: i64) -> bool {
        self.state.borrow().is_liked(post_id)
    }

    pub fn is_like_pending(&self) -> bool {
        self.like_in_flight.load(Ordering::Acquire)
    }

    pub fn source(&self) -> Option<FeedSource> {
        self.state.borrow().source
    }

    /// Loads the personalised feed of `user_id`.
    pub async fn load_feed(&self, user_id: i64) -> FeedResult<Vec<Post>> {
        self.load(FeedSource::Feed { user_id }).await
    }

    /// Loads every post, with like state as seen by `viewer_id`.
    pub async fn load_all_posts(&self, viewer_id: i64) -> FeedResult<Vec<Post>> {
        self.load(FeedSource::AllPosts { viewer_id }).await
    }

    /// Reloads the last source. Without one, returns the current posts.
    pub async fn reload(&self) -> FeedResult<Vec<Post>> {
        match self.source() {
            Some(source) => self.load(source).await,
            None => Ok(self.posts()),
        }
    }

    /// Replaces the collection with `source`, then resolves like state for
    /// every post the backend sent without `has_user_liked`.
    ///
    /// A failed like-state fetch counts as not liked and does not fail the
    /// load.
    pub async fn load(&self, source: FeedSource) -> FeedResult<Vec<Post>> {
        let mut generation = 0;
        self.state.send_modify(|feed| {
            feed.generation += 1;
            feed.source = Some(source);
            feed.loading = true;
            generation = feed.generation;
        });
        tracing::debug!(?source, generation, "Loading feed");

        let fetched = match source {
            FeedSource::Feed { user_id } => self.api.get_feed(user_id).await,
            FeedSource::AllPosts { .. } => self.api.get_all_posts().await,
        };
        let posts = match fetched {
            Ok(posts) => posts,
            Err(err) => {
                tracing::warn!(?source, "Failed to load feed: {}", err);
                self.state.send_if_modified(|feed| {
                    if feed.generation != generation {
                        return false;
                    }
                    feed.loading = false;
                    true
                });
                return Err(err.into());
            }
        };

        let unresolved: Vec<i64> = posts
            .iter()
            .filter(|p| p.has_user_liked.is_none())
            .map(|p| p.id)
            .collect();

        let applied = self.state.send_if_modified(|feed| {
            if feed.generation != generation {
                return false;
            }
            feed.posts = posts.clone();
            true
        });
        if !applied {
            tracing::debug!(generation, "Discarding superseded feed load");
            return Ok(posts);
        }
        tracing::info!(count = posts.len(), "Feed loaded");

        if !unresolved.is_empty() {
            self.resolve_like_states(source.viewer_id(), unresolved, generation)
                .await;
        }

        self.state.send_if_modified(|feed| {
            if feed.generation != generation {
                return false;
            }
            feed.loading = false;
            true
        });
        Ok(posts)
    }

    async fn resolve_like_states(&self, viewer_id: i64, post_ids: Vec<i64>, generation: u64) {
        let fetches = stream::iter(post_ids)
            .map(|post_id| {
                let api = Arc::clone(&self.api);
                async move { (post_id, api.get_likes(post_id).await) }
            })
            .buffer_unordered(self.like_state_concurrency);
        let mut fetches = pin!(fetches);

        while let Some((post_id, result)) = fetches.next().await {
            let mine = match result {
                Ok(likes) => likes.into_iter().find(|like| like.user_id == viewer_id),
                Err(err) => {
                    tracing::warn!(post_id, "Failed to fetch like state: {}", err);
                    None
                }
            };
            self.state.send_if_modified(|feed| {
                if feed.generation != generation {
                    return false;
                }
                feed.like_cache.insert(post_id, mine.is_some());
                match &mine {
                    Some(like) => feed.like_ids.insert(post_id, like.id),
                    None => feed.like_ids.remove(&post_id),
                };
                true
            });
        }
    }

    /// Publishes a post and prepends the stored copy to the feed.
    ///
    /// A blank message is rejected without contacting the backend.
    pub async fn create_post(&self, author_id: i64, message: &str) -> FeedResult<Post> {
        let message = message.trim();
        if message.is_empty() {
            return Err(FeedError::EmptyMessage);
        }

        let generation = self.state.borrow().generation;
        let request = CreatePostRequest {
            author_id,
            message: message.to_string(),
        };
        let post = self.api.create_post(&request).await?;

        self.state.send_if_modified(|feed| {
            if feed.generation != generation || feed.post(post.id).is_some() {
                return false;
            }
            feed.posts.insert(0, post.clone());
            true
        });
        tracing::info!(post_id = post.id, "Post created");
        Ok(post)
    }

    /// Likes `post_id` if the viewer has not liked it yet, unlikes it
    /// otherwise.
    ///
    /// Returns [`LikeOutcome::Skipped`] without any request while another
    /// toggle is pending.
    pub async fn toggle_like(&self, viewer_id: i64, post_id: i64) -> FeedResult<LikeOutcome> {
        let Some(_flight) = LikeFlight::acquire(&self.like_in_flight) else {
            tracing::debug!(post_id, "Like already in flight; ignoring toggle");
            return Ok(LikeOutcome::Skipped);
        };

        let rollback = self
            .apply_optimistic(post_id)
            .ok_or(FeedError::PostNotFound(post_id))?;

        if rollback.liked {
            self.unlike(viewer_id, post_id, rollback).await
        } else {
            self.like(viewer_id, post_id, rollback).await
        }
    }

    async fn like(
        &self,
        viewer_id: i64,
        post_id: i64,
        rollback: LikeRollback,
    ) -> FeedResult<LikeOutcome> {
        let request = CreateLikeRequest { user_id: viewer_id };
        match self.api.add_like(post_id, &request).await {
            Ok(like) => {
                self.update_post(post_id, rollback.generation, |feed| {
                    feed.like_cache.insert(post_id, true);
                    feed.like_ids.insert(post_id, like.id);
                });
                tracing::debug!(post_id, like_id = like.id, "Like committed");
                Ok(LikeOutcome::Liked)
            }
            Err(ApiError::Conflict(_)) => {
                self.update_post(post_id, rollback.generation, |feed| {
                    if let Some(post) = feed.posts.iter_mut().find(|p| p.id == post_id) {
                        post.likes_count = rollback.likes_count;
                        post.has_user_liked = Some(true);
                    }
                    feed.like_cache.insert(post_id, true);
                });
                tracing::info!(post_id, "Post was already liked");
                Ok(LikeOutcome::AlreadyLiked)
            }
            Err(err) => {
                self.roll_back(post_id, rollback);
                tracing::warn!(post_id, "Like failed, rolled back: {}", err);
                Err(err.into())
            }
        }
    }

    async fn unlike(
        &self,
        viewer_id: i64,
        post_id: i64,
        rollback: LikeRollback,
    ) -> FeedResult<LikeOutcome> {
        let like_id = match self.find_like_id(viewer_id, post_id).await {
            Ok(Some(like_id)) => like_id,
            Ok(None) => {
                self.roll_back(post_id, rollback);
                tracing::warn!(post_id, "No like to remove, rolled back");
                return Err(FeedError::LikeNotFound(post_id));
            }
            Err(err) => {
                self.roll_back(post_id, rollback);
                tracing::warn!(post_id, "Like lookup failed, rolled back: {}", err);
                return Err(err.into());
            }
        };

        match self.api.remove_like(post_id, like_id).await {
            Ok(()) => {
                self.update_post(post_id, rollback.generation, |feed| {
                    feed.like_cache.insert(post_id, false);
                    feed.like_ids.remove(&post_id);
                });
                tracing::debug!(post_id, like_id, "Unlike committed");
                Ok(LikeOutcome::Unliked)
            }
            Err(err) => {
                self.roll_back(post_id, rollback);
                tracing::warn!(post_id, "Unlike failed, rolled back: {}", err);
                Err(err.into())
            }
        }
    }

    async fn find_like_id(&self, viewer_id: i64, post_id: i64) -> Result<Option<i64>, ApiError> {
        let remembered = self.state.borrow().like_ids.get(&post_id).copied();
        if remembered.is_some() {
            return Ok(remembered);
        }
        let likes = self.api.get_likes(post_id).await?;
        Ok(likes
            .into_iter()
            .find(|like| like.user_id == viewer_id)
            .map(|like| like.id))
    }

    /// Flips the post's like state and count in place and returns what it
    /// was before, or `None` if the post is not in the feed.
    fn apply_optimistic(&self, post_id: i64) -> Option<LikeRollback> {
        let mut rollback = None;
        self.state.send_if_modified(|feed| {
            let liked = feed.is_liked(post_id);
            let generation = feed.generation;
            let cached = feed.like_cache.get(&post_id).copied();
            let Some(post) = feed.posts.iter_mut().find(|p| p.id == post_id) else {
                return false;
            };
            rollback = Some(LikeRollback {
                generation,
                liked,
                likes_count: post.likes_count,
                has_user_liked: post.has_user_liked,
                cached,
            });
            if liked {
                post.likes_count = post.likes_count.saturating_sub(1);
                post.has_user_liked = Some(false);
            } else {
                post.likes_count = post.likes_count.saturating_add(1);
                post.has_user_liked = Some(true);
            }
            true
        });
        rollback
    }

    fn roll_back(&self, post_id: i64, rollback: LikeRollback) {
        self.update_post(post_id, rollback.generation, |feed| {
            if let Some(post) = feed.posts.iter_mut().find(|p| p.id == post_id) {
                post.likes_count = rollback.likes_count;
                post.has_user_liked = rollback.has_user_liked;
            }
            match rollback.cached {
                Some(liked) => feed.like_cache.insert(post_id, liked),
                None => feed.like_cache.remove(&post_id),
            };
        });
    }

    /// Applies `change` unless the feed moved to a new generation.
    fn update_post(&self, post_id: i64, generation: u64, change: impl FnOnce(&mut FeedSnapshot)) {
        let applied = self.state.send_if_modified(|feed| {
            if feed.generation != generation {
                return false;
            }
            change(feed);
            true
        });
        if !applied {
            tracing::debug!(post_id, "Feed changed while the like was pending; dropping result");
        }
    }

    /// Deletes a post. Administrators only; anyone else is refused before
    /// any request is made.
    ///
    /// On success the post is removed locally and the last source is
    /// reloaded. A failed reload is logged, not returned, unless the backend
    /// rejected the session: that `Unauthorized` is passed up even though
    /// the post is gone.
    pub async fn delete_post(&self, viewer: &User, post_id: i64) -> FeedResult<()> {
        if !viewer.is_admin() {
            tracing::warn!(user_id = viewer.id, post_id, "Delete refused: not an administrator");
            return Err(FeedError::PermissionDenied);
        }

        self.api.delete_post(post_id).await?;
        tracing::info!(post_id, "Post deleted");

        self.state.send_if_modified(|feed| {
            let before = feed.posts.len();
            feed.posts.retain(|p| p.id != post_id);
            feed.like_cache.remove(&post_id);
            feed.like_ids.remove(&post_id);
            feed.posts.len() != before
        });

        let Some(source) = self.source() else {
            return Ok(());
        };
        match self.load(source).await {
            Err(err) if err.is_unauthorized() => Err(err),
            Err(err) => {
                tracing::warn!("Reload after delete failed: {}", err);
                Ok(())
            }
            Ok(_) => Ok(()),
        }
    }

    /// Drops every post and cached like state. Pending results from before
    /// the clear are discarded when they arrive.
    pub fn clear(&self) {
        self.state.send_modify(|feed| {
            *feed = FeedSnapshot {
                generation: feed.generation + 1,
                ..FeedSnapshot::default()
            };
        });
        tracing::debug!("Feed cleared");
    }
}
