use super::error::AuthError;
use super::model::{AuthTokens, Credentials, PersistedTokens, Session, SignOutReason};
use super::repository::TokenStore;
use super::token;
use crate::api::{ApiError, AuthApi};
use crate::user::{RegisterRequest, User, validate_login, validate_registration};
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, watch};

/// A type alias for `Result<T, AuthError>`.
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Owns the authentication state of the client.
///
/// `SessionManager` is responsible for:
/// - Establishing a session from login or registration
/// - Persisting and clearing tokens in the [`TokenStore`]
/// - Validating stored tokens at startup and refreshing them when needed
/// - Loading the user profile once tokens are in place
/// - Publishing every transition as a [`Session`] snapshot
///
/// The manager is cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct SessionManager {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn TokenStore>,
    /// Current snapshot; subscribers observe every transition
    state: Arc<watch::Sender<Session>>,
    /// Serializes state + storage transitions so a logout can never be
    /// undone by a concurrent write
    transitions: Arc<Mutex<()>>,
    /// Epoch whose profile fetch is outstanding; 0 when none is
    profile_in_flight: Arc<AtomicU64>,
    access_margin_secs: i64,
}

impl SessionManager {
    /// Creates a signed-out manager. Call [`check_auth_status`] to pick up
    /// tokens persisted by a previous run.
    ///
    /// [`check_auth_status`]: SessionManager::check_auth_status
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            api,
            store,
            state: Arc::new(state),
            transitions: Arc::new(Mutex::new(())),
            profile_in_flight: Arc::new(AtomicU64::new(0)),
            access_margin_secs: token::ACCESS_TOKEN_MARGIN_SECS,
        }
    }

    /// Overrides how early access tokens are considered expired.
    pub fn with_access_margin(mut self, margin_secs: i64) -> Self {
        self.access_margin_secs = margin_secs;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Cached flag; never touches the network.
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().authenticated
    }

    pub fn get_token(&self) -> Option<String> {
        self.state.borrow().access_token.clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().current_user.clone()
    }

    fn epoch(&self) -> u64 {
        self.state.borrow().epoch
    }

    /// Signs in with email and password.
    ///
    /// On success the tokens are persisted, `authenticated` flips to true and
    /// the profile is fetched in the background; `current_user` follows in a
    /// later snapshot.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the email or password fail client-side checks
    /// - `InvalidCredentials` if the backend answers 401
    /// - `Api` for any other backend failure
    /// - `Storage` if the tokens cannot be persisted
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<Session> {
        validate_login(email, password).map_err(AuthError::InvalidInput)?;

        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let tokens = self
            .api
            .login(&credentials)
            .await
            .map_err(|err| match err {
                ApiError::Unauthorized => AuthError::InvalidCredentials,
                other => AuthError::Api(other),
            })?;

        tracing::info!(user_id = tokens.user_id, "Login succeeded");
        self.establish(tokens).await
    }

    /// Creates an account and signs in with it.
    ///
    /// Every registration rule is checked first; a request that fails them
    /// is never sent.
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<Session> {
        validate_registration(&request, Utc::now().date_naive())
            .map_err(AuthError::InvalidInput)?;

        let tokens = self.api.register(&request).await?;

        tracing::info!(user_id = tokens.user_id, "Registration succeeded");
        self.establish(tokens).await
    }

    /// Clears persisted tokens and the in-memory session.
    ///
    /// Idempotent: calling it on a signed-out session publishes nothing.
    pub async fn logout(&self) {
        self.end(SignOutReason::Logout).await;
    }

    /// Reaction to a 401 from any backend call.
    pub async fn handle_unauthorized(&self) {
        tracing::warn!("Backend rejected the access token; signing out");
        self.end(SignOutReason::Unauthorized).await;
    }

    async fn end(&self, reason: SignOutReason) {
        let _guard = self.transitions.lock().await;
        self.clear_locked(reason).await;
    }

    /// Exchanges the stored refresh token for a new token triple.
    ///
    /// Any failure signs the session out, unless the session was already
    /// replaced while the request was in flight.
    pub async fn refresh_session(&self) -> AuthResult<Session> {
        let (epoch, in_memory) = {
            let session = self.state.borrow();
            (session.epoch, session.refresh_token.clone())
        };

        let refresh_token = match in_memory {
            Some(refresh_token) => Some(refresh_token),
            None => self
                .store
                .load()
                .await
                .ok()
                .flatten()
                .map(|tokens| tokens.refresh_token),
        };
        let Some(refresh_token) = refresh_token else {
            tracing::warn!("No refresh token available; signing out");
            self.end(SignOutReason::Expired).await;
            return Err(AuthError::NoRefreshToken);
        };

        let tokens = match self.api.refresh(&refresh_token).await {
            Ok(tokens) => tokens,
            Err(err) => {
                tracing::warn!("Token refresh failed: {}", err);
                if self.epoch() == epoch {
                    self.end(SignOutReason::Expired).await;
                }
                return Err(err.into());
            }
        };

        let _guard = self.transitions.lock().await;
        if self.epoch() != epoch {
            tracing::debug!("Discarding refreshed tokens for a previous session");
            return Err(AuthError::SessionChanged);
        }
        if let Err(err) = self.persist(&tokens).await {
            self.clear_locked(SignOutReason::Expired).await;
            return Err(err);
        }

        let mut snapshot = Session::default();
        self.state.send_modify(|session| {
            if session.user_id != Some(tokens.user_id) {
                session.current_user = None;
            }
            session.access_token = Some(tokens.access_token.clone());
            session.refresh_token = Some(tokens.refresh_token.clone());
            session.user_id = Some(tokens.user_id);
            session.authenticated = true;
            snapshot = session.clone();
        });

        tracing::info!(user_id = tokens.user_id, "Session refreshed");
        Ok(snapshot)
    }

    /// Validates the persisted tokens and brings the session in line.
    ///
    /// Run at startup and before requests that need authentication:
    /// - no stored tokens: signed out
    /// - access token valid: authenticated, profile loaded if missing
    /// - access token expired, refresh token valid: refresh, then as above
    /// - both expired: signed out
    ///
    /// Never fails; problems degrade to a signed-out session.
    pub async fn check_auth_status(&self) -> Session {
        let persisted = match self.store.load().await {
            Ok(persisted) => persisted,
            Err(err) => {
                tracing::warn!("Failed to read persisted tokens: {}", err);
                None
            }
        };

        let Some(persisted) = persisted else {
            let _guard = self.transitions.lock().await;
            self.clear_locked(SignOutReason::Expired).await;
            return self.snapshot();
        };

        let now = Utc::now().timestamp();
        if !token::is_expired_with_margin(&persisted.access_token, now, self.access_margin_secs) {
            let snapshot = self.adopt(&persisted).await;
            if snapshot.current_user.is_none() {
                self.spawn_profile_load(persisted.user_id, snapshot.epoch);
            }
            return snapshot;
        }

        if token::is_refresh_token_expired(&persisted.refresh_token, now) {
            tracing::info!("Access and refresh tokens expired; signing out");
            self.end(SignOutReason::Expired).await;
            return self.snapshot();
        }

        tracing::debug!("Access token expired; refreshing session");
        self.adopt(&persisted).await;
        match self.refresh_session().await {
            Ok(snapshot) => {
                if snapshot.current_user.is_none() {
                    if let Some(user_id) = snapshot.user_id {
                        self.spawn_profile_load(user_id, snapshot.epoch);
                    }
                }
                snapshot
            }
            Err(err) => {
                tracing::debug!("Startup refresh did not produce a session: {}", err);
                self.snapshot()
            }
        }
    }

    /// Fetches the profile for `user_id` and attaches it to the current
    /// session.
    pub async fn load_user_profile(&self, user_id: i64) -> AuthResult<User> {
        self.load_profile_for(user_id, self.epoch()).await
    }

    /// Profile fetch bound to a session generation. The result is dropped if
    /// the session changed meanwhile; only a 401 signs the session out.
    pub(crate) async fn load_profile_for(&self, user_id: i64, epoch: u64) -> AuthResult<User> {
        match self.api.get_user(user_id).await {
            Ok(user) => {
                let applied = self.state.send_if_modified(|session| {
                    if session.epoch != epoch || session.user_id != Some(user_id) {
                        return false;
                    }
                    session.current_user = Some(user.clone());
                    true
                });
                if applied {
                    tracing::debug!(user_id, "User profile loaded");
                    Ok(user)
                } else {
                    tracing::debug!(user_id, "Discarding profile for a previous session");
                    Err(AuthError::SessionChanged)
                }
            }
            Err(ApiError::Unauthorized) => {
                if self.epoch() == epoch {
                    self.handle_unauthorized().await;
                }
                Err(AuthError::Api(ApiError::Unauthorized))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// At most one background fetch per session generation.
    fn spawn_profile_load(&self, user_id: i64, epoch: u64) {
        if self.profile_in_flight.swap(epoch, Ordering::AcqRel) == epoch {
            tracing::debug!(user_id, "Profile fetch already pending");
            return;
        }
        let manager = self.clone();
        tokio::spawn(async move {
            let result = manager.load_profile_for(user_id, epoch).await;
            let _ = manager.profile_in_flight.compare_exchange(
                epoch,
                0,
                Ordering::AcqRel,
                Ordering::Relaxed,
            );
            if let Err(err) = result {
                tracing::warn!(user_id, "Failed to load user profile: {}", err);
            }
        });
    }

    async fn establish(&self, tokens: AuthTokens) -> AuthResult<Session> {
        let snapshot = {
            let _guard = self.transitions.lock().await;
            self.persist(&tokens).await?;

            let mut snapshot = Session::default();
            self.state.send_modify(|session| {
                *session = Session {
                    access_token: Some(tokens.access_token.clone()),
                    refresh_token: Some(tokens.refresh_token.clone()),
                    user_id: Some(tokens.user_id),
                    current_user: None,
                    authenticated: true,
                    epoch: session.epoch + 1,
                    ended_by: None,
                };
                snapshot = session.clone();
            });
            snapshot
        };

        self.spawn_profile_load(tokens.user_id, snapshot.epoch);
        Ok(snapshot)
    }

    /// Marks the session authenticated with tokens read from the store.
    /// Keeps the generation (and profile) when the same user is already
    /// signed in, and publishes nothing if the snapshot is unchanged.
    async fn adopt(&self, persisted: &PersistedTokens) -> Session {
        let _guard = self.transitions.lock().await;
        let mut snapshot = Session::default();
        self.state.send_if_modified(|session| {
            let continuing = session.authenticated && session.user_id == Some(persisted.user_id);
            let next = Session {
                access_token: Some(persisted.access_token.clone()),
                refresh_token: Some(persisted.refresh_token.clone()),
                user_id: Some(persisted.user_id),
                current_user: if continuing { session.current_user.clone() } else { None },
                authenticated: true,
                epoch: if continuing { session.epoch } else { session.epoch + 1 },
                ended_by: None,
            };
            snapshot = next.clone();
            if *session == next {
                return false;
            }
            *session = next;
            true
        });
        snapshot
    }

    async fn persist(&self, tokens: &AuthTokens) -> AuthResult<()> {
        let persisted = PersistedTokens::from_tokens(tokens, Utc::now().timestamp_millis());
        self.store.save(&persisted).await.map_err(|err| {
            tracing::error!("Failed to persist session tokens: {}", err);
            AuthError::from(err)
        })
    }

    /// Caller must hold `transitions`.
    async fn clear_locked(&self, reason: SignOutReason) {
        if let Err(err) = self.store.clear().await {
            tracing::warn!("Failed to clear persisted tokens: {}", err);
        }
        let changed = self.state.send_if_modified(|session| {
            if session.is_cleared() {
                return false;
            }
            *session = Session::ended(session.epoch + 1, reason);
            true
        });
        if changed {
            tracing::info!(?reason, "Session cleared");
        }
    }
}
