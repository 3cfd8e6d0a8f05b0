//! Feedline client use cases.
//!
//! `FeedlineClient` wires the session manager, the feed reconciler, the
//! notification center and a navigator into the actions a front end offers.

use crate::error::{ClientError, ClientResult};
use feedline_core::api::{ApiError, AuthApi, ErrorMessage, FeedApi};
use feedline_core::config::ClientConfig;
use feedline_core::feed::{FeedError, FeedReconciler, LikeOutcome};
use feedline_core::navigation::{Navigator, Route};
use feedline_core::notification::NotificationCenter;
use feedline_core::post::Post;
use feedline_core::session::{AuthError, Session, SessionManager, TokenStore};
use feedline_core::user::{RegisterRequest, User};
use feedline_infrastructure::FileTokenStore;
use feedline_interaction::HttpBackend;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Front-end facing client.
///
/// # Responsibilities
///
/// - Restoring the session at startup and routing accordingly
/// - Requiring a session before feed actions
/// - Turning failures into notifications
/// - Central 401 handling: sign out, drop the feed, route to login
/// - Dropping the feed whenever the session ends, whatever ended it
/// - Sending the user to login when the session ends without being asked to
pub struct FeedlineClient {
    session: SessionManager,
    feed: FeedReconciler,
    notifications: NotificationCenter,
    navigator: Arc<dyn Navigator>,
    expiry: ExpiryNotice,
    sign_out_watcher: Mutex<Option<JoinHandle<()>>>,
}

const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";

/// Warns once per ended session and routes to login.
#[derive(Clone)]
struct ExpiryNotice {
    notifications: NotificationCenter,
    navigator: Arc<dyn Navigator>,
    announced_epoch: Arc<AtomicU64>,
}

impl ExpiryNotice {
    fn announce(&self, epoch: u64) {
        if self.announced_epoch.swap(epoch, Ordering::AcqRel) == epoch {
            return;
        }
        self.notifications.show_warning(SESSION_EXPIRED);
        self.navigator.navigate(Route::Login);
    }
}

impl FeedlineClient {
    pub fn new(
        auth_api: Arc<dyn AuthApi>,
        feed_api: Arc<dyn FeedApi>,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
        config: &ClientConfig,
    ) -> Self {
        let session = SessionManager::new(auth_api, tokens)
            .with_access_margin(config.access_token_margin_secs);
        let feed =
            FeedReconciler::new(feed_api).with_like_state_concurrency(config.like_state_concurrency);
        let notifications = NotificationCenter::new();
        let expiry = ExpiryNotice {
            notifications: notifications.clone(),
            navigator: navigator.clone(),
            announced_epoch: Arc::new(AtomicU64::new(0)),
        };
        Self {
            session,
            feed,
            notifications,
            navigator,
            expiry,
            sign_out_watcher: Mutex::new(None),
        }
    }

    /// Builds a client that talks HTTP to `config.api_base_url` and keeps its
    /// tokens in `tokens.json` under `config.data_dir`.
    pub fn connect(config: &ClientConfig, navigator: Arc<dyn Navigator>) -> ClientResult<Self> {
        let tokens: Arc<dyn TokenStore> = Arc::new(
            FileTokenStore::new(config.data_dir.as_deref())
                .map_err(|e| ClientError::Setup(e.to_string()))?,
        );
        let backend = Arc::new(HttpBackend::from_config(config, tokens.clone()));
        tracing::debug!(api = %backend.base_url(), "Client configured");
        Ok(Self::new(
            backend.clone(),
            backend,
            tokens,
            navigator,
            config,
        ))
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn feed(&self) -> &FeedReconciler {
        &self.feed
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Restores the persisted session and routes to the feed or the login
    /// screen. Also starts watching for sign-outs so the feed never outlives
    /// its session.
    pub async fn start(&self) -> Session {
        self.watch_sign_outs();

        let session = self.session.check_auth_status().await;
        let route = if session.authenticated {
            Route::Posts
        } else {
            Route::Login
        };
        tracing::info!(authenticated = session.authenticated, "Client started");
        self.navigator.navigate(route);
        session
    }

    fn watch_sign_outs(&self) {
        let Ok(mut slot) = self.sign_out_watcher.lock() else {
            return;
        };
        if slot.is_some() {
            return;
        }

        // Epochs only move forward and every sign-out records a reason, so
        // a login and sign-out coalesced into one wake-up are still seen.
        let mut sessions = self.session.subscribe();
        let mut handled_epoch = sessions.borrow_and_update().epoch;
        let feed = self.feed.clone();
        let expiry = self.expiry.clone();
        *slot = Some(tokio::spawn(async move {
            while sessions.changed().await.is_ok() {
                let (epoch, ended_by) = {
                    let session = sessions.borrow_and_update();
                    (session.epoch, session.ended_by)
                };
                let Some(reason) = ended_by else {
                    continue;
                };
                if epoch == handled_epoch {
                    continue;
                }
                handled_epoch = epoch;
                tracing::debug!(?reason, "Session ended; clearing feed");
                feed.clear();
                if reason.is_involuntary() {
                    expiry.announce(epoch);
                }
            }
        }));
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        match self.session.login(email, password).await {
            Ok(session) => {
                self.notifications.show_success("Signed in successfully");
                self.navigator.navigate(Route::Posts);
                Ok(session)
            }
            Err(err) => {
                self.report_auth_error(&err).await;
                Err(err.into())
            }
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> ClientResult<Session> {
        match self.session.register(request).await {
            Ok(session) => {
                self.notifications.show_success("Account created successfully");
                self.navigator.navigate(Route::Posts);
                Ok(session)
            }
            Err(err) => {
                self.report_auth_error(&err).await;
                Err(err.into())
            }
        }
    }

    pub async fn logout(&self) {
        self.session.logout().await;
        self.feed.clear();
        self.notifications.show_info("Signed out");
        self.navigator.navigate(Route::Login);
    }

    /// Validates the stored session; routes to login when there is none.
    pub async fn require_session(&self) -> ClientResult<Session> {
        let session = self.session.check_auth_status().await;
        if session.authenticated && session.user_id.is_some() {
            return Ok(session);
        }
        self.feed.clear();
        self.navigator.navigate(Route::Login);
        Err(ClientError::NotAuthenticated)
    }

    fn user_id(session: &Session) -> ClientResult<i64> {
        session.user_id.ok_or(ClientError::NotAuthenticated)
    }

    /// The signed-in user's profile, fetched if it has not arrived yet.
    pub async fn current_user(&self) -> ClientResult<User> {
        let session = self.require_session().await?;
        if let Some(user) = session.current_user {
            return Ok(user);
        }
        let user_id = Self::user_id(&session)?;
        match self.session.load_user_profile(user_id).await {
            Ok(user) => Ok(user),
            Err(err) => {
                self.report_auth_error(&err).await;
                Err(err.into())
            }
        }
    }

    /// Loads the signed-in user's personalised feed.
    pub async fn load_feed(&self) -> ClientResult<Vec<Post>> {
        let user_id = Self::user_id(&self.require_session().await?)?;
        let result = self.feed.load_feed(user_id).await;
        self.settle(result).await
    }

    /// Loads every post.
    pub async fn load_all_posts(&self) -> ClientResult<Vec<Post>> {
        let user_id = Self::user_id(&self.require_session().await?)?;
        let result = self.feed.load_all_posts(user_id).await;
        self.settle(result).await
    }

    pub async fn create_post(&self, message: &str) -> ClientResult<Post> {
        let user_id = Self::user_id(&self.require_session().await?)?;
        let result = self.feed.create_post(user_id, message).await;
        if result.is_ok() {
            self.notifications.show_success("Post published");
        }
        self.settle(result).await
    }

    pub async fn toggle_like(&self, post_id: i64) -> ClientResult<LikeOutcome> {
        let user_id = Self::user_id(&self.require_session().await?)?;
        let result = self.feed.toggle_like(user_id, post_id).await;
        if let Ok(LikeOutcome::AlreadyLiked) = result {
            self.notifications.show_info("You already liked this post");
        }
        self.settle(result).await
    }

    /// Deletes a post as the signed-in user. Only administrators get past
    /// the local check.
    pub async fn delete_post(&self, post_id: i64) -> ClientResult<()> {
        let viewer = self.current_user().await?;
        let result = self.feed.delete_post(&viewer, post_id).await;
        if result.is_ok() {
            self.notifications.show_success("Post deleted");
        }
        self.settle(result).await
    }

    /// Reaction to any backend failure.
    ///
    /// `Unauthorized` ends the session: tokens are cleared, the feed is
    /// dropped and the user is sent to the login screen. Everything else is
    /// shown as a notification.
    pub async fn handle_api_error(&self, err: &ApiError) {
        if err.is_unauthorized() {
            self.session.handle_unauthorized().await;
            self.feed.clear();
            self.expiry.announce(self.session.snapshot().epoch);
            return;
        }
        self.notifications.report(&ErrorMessage::from(err));
    }

    async fn settle<T>(&self, result: Result<T, FeedError>) -> ClientResult<T> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                self.report_feed_error(&err).await;
                Err(err.into())
            }
        }
    }

    async fn report_feed_error(&self, err: &FeedError) {
        match err {
            FeedError::Api(api) => self.handle_api_error(api).await,
            FeedError::EmptyMessage => {
                self.notifications.show_warning(err.to_string());
            }
            _ => {
                self.notifications.show_error(err.to_string());
            }
        }
    }

    async fn report_auth_error(&self, err: &AuthError) {
        match err {
            AuthError::Api(api) => self.handle_api_error(api).await,
            // A newer session replaced this one; nothing to tell the user.
            AuthError::SessionChanged => {}
            _ => {
                self.notifications.show_error(err.to_string());
            }
        }
    }
}

impl Drop for FeedlineClient {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.sign_out_watcher.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}
