//! FeedlineClient use cases against an in-memory backend.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use feedline_application::{ClientError, FeedlineClient};
use feedline_core::api::{ApiError, ApiResult, AuthApi, FeedApi};
use feedline_core::config::ClientConfig;
use feedline_core::feed::{FeedError, LikeOutcome};
use feedline_core::navigation::{RecordingNavigator, Route};
use feedline_core::notification::Severity;
use feedline_core::post::{CreateLikeRequest, CreatePostRequest, Like, Post};
use feedline_core::session::{AuthTokens, Credentials, PersistedTokens, TokenStore};
use feedline_core::user::{RegisterRequest, User};
use feedline_infrastructure::MemoryTokenStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const USER_ID: i64 = 3;

fn jwt_expiring_in(secs: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + secs;
    format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#),
        URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{}}}"#, exp))
    )
}

fn post(id: i64, likes_count: u32) -> Post {
    Post {
        id,
        author_id: 1,
        author_alias: "zoe".to_string(),
        message: format!("post {}", id),
        created_at: String::new(),
        likes_count,
        has_user_liked: Some(false),
    }
}

// In-memory backend for testing
struct MockBackend {
    role: String,
    posts: Mutex<Vec<Post>>,
    feed_error: Mutex<Option<ApiError>>,
    user_error: Mutex<Option<ApiError>>,
    add_like_error: Mutex<Option<ApiError>>,
    calls: Mutex<Vec<String>>,
}

impl MockBackend {
    fn new(role: &str) -> Self {
        Self {
            role: role.to_string(),
            posts: Mutex::new(vec![post(1, 3), post(2, 0)]),
            feed_error: Mutex::new(None),
            user_error: Mutex::new(None),
            add_like_error: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn feed_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| !c.starts_with("auth:"))
            .count()
    }

    fn tokens(&self) -> AuthTokens {
        AuthTokens {
            access_token: jwt_expiring_in(3_600),
            refresh_token: jwt_expiring_in(86_400),
            user_id: USER_ID,
        }
    }
}

#[async_trait::async_trait]
impl AuthApi for MockBackend {
    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthTokens> {
        self.record("auth:login");
        if credentials.password == "wrongPass1" {
            return Err(ApiError::Unauthorized);
        }
        Ok(self.tokens())
    }

    async fn register(&self, _request: &RegisterRequest) -> ApiResult<AuthTokens> {
        self.record("auth:register");
        Err(ApiError::Conflict(Some("Email already registered".to_string())))
    }

    async fn refresh(&self, _refresh_token: &str) -> ApiResult<AuthTokens> {
        self.record("auth:refresh");
        Ok(self.tokens())
    }

    async fn get_user(&self, user_id: i64) -> ApiResult<User> {
        self.record("auth:get_user");
        if let Some(err) = self.user_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(User {
            id: user_id,
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
            alias: "ana".to_string(),
            email: "ana@example.com".to_string(),
            role: self.role.clone(),
            date_of_birth: String::new(),
            created_at: String::new(),
        })
    }
}

#[async_trait::async_trait]
impl FeedApi for MockBackend {
    async fn get_feed(&self, _user_id: i64) -> ApiResult<Vec<Post>> {
        self.record("get_feed");
        if let Some(err) = self.feed_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.posts.lock().unwrap().clone())
    }

    async fn get_all_posts(&self) -> ApiResult<Vec<Post>> {
        self.record("get_all_posts");
        Ok(self.posts.lock().unwrap().clone())
    }

    async fn create_post(&self, request: &CreatePostRequest) -> ApiResult<Post> {
        self.record("create_post");
        let mut created = post(10, 0);
        created.message = request.message.clone();
        Ok(created)
    }

    async fn delete_post(&self, post_id: i64) -> ApiResult<()> {
        self.record("delete_post");
        self.posts.lock().unwrap().retain(|p| p.id != post_id);
        Ok(())
    }

    async fn get_likes(&self, _post_id: i64) -> ApiResult<Vec<Like>> {
        self.record("get_likes");
        Ok(Vec::new())
    }

    async fn add_like(&self, post_id: i64, request: &CreateLikeRequest) -> ApiResult<Like> {
        self.record("add_like");
        if let Some(err) = self.add_like_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(Like {
            id: 77,
            user_id: request.user_id,
            post_id,
            created_at: String::new(),
        })
    }

    async fn remove_like(&self, _post_id: i64, _like_id: i64) -> ApiResult<()> {
        self.record("remove_like");
        Ok(())
    }
}

struct Harness {
    client: FeedlineClient,
    backend: Arc<MockBackend>,
    store: Arc<MemoryTokenStore>,
    navigator: Arc<RecordingNavigator>,
}

fn harness_with(role: &str, store: MemoryTokenStore) -> Harness {
    let backend = Arc::new(MockBackend::new(role));
    let store = Arc::new(store);
    let navigator = Arc::new(RecordingNavigator::new());
    let client = FeedlineClient::new(
        backend.clone(),
        backend.clone(),
        store.clone(),
        navigator.clone(),
        &ClientConfig::default(),
    );
    Harness {
        client,
        backend,
        store,
        navigator,
    }
}

fn harness(role: &str) -> Harness {
    harness_with(role, MemoryTokenStore::new())
}

async fn wait_for_route(navigator: &RecordingNavigator, route: Route) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while navigator.current() != Some(route) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("navigator should reach the route");
}

fn severities(client: &FeedlineClient) -> Vec<Severity> {
    client
        .notifications()
        .snapshot()
        .iter()
        .map(|n| n.severity)
        .collect()
}

#[tokio::test]
async fn test_start_without_tokens_routes_to_login() {
    let h = harness("USER");

    let session = h.client.start().await;

    assert!(!session.authenticated);
    assert_eq!(h.navigator.current(), Some(Route::Login));
    assert!(h.backend.calls().is_empty());
}

#[tokio::test]
async fn test_start_with_valid_tokens_routes_to_posts() {
    let h = harness_with(
        "USER",
        MemoryTokenStore::with_tokens(PersistedTokens {
            access_token: jwt_expiring_in(3_600),
            refresh_token: jwt_expiring_in(86_400),
            user_id: USER_ID,
            auth_timestamp: 0,
        }),
    );

    let session = h.client.start().await;

    assert!(session.authenticated);
    assert_eq!(h.navigator.current(), Some(Route::Posts));
}

#[tokio::test]
async fn test_login_then_load_feed() {
    let h = harness("USER");
    h.client.start().await;

    h.client.login("ana@example.com", "secret1A").await.unwrap();
    let posts = h.client.load_feed().await.unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(h.navigator.current(), Some(Route::Posts));
    assert_eq!(severities(&h.client), vec![Severity::Success]);
    assert!(h.store.load().await.unwrap().is_some());
}

#[tokio::test]
async fn test_bad_credentials_notify_without_navigation() {
    let h = harness("USER");

    let err = h
        .client
        .login("ana@example.com", "wrongPass1")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Auth(_)));
    assert!(!err.is_unauthorized());
    assert_eq!(severities(&h.client), vec![Severity::Error]);
    assert!(h.navigator.history().is_empty());
}

#[tokio::test]
async fn test_register_conflict_is_a_warning() {
    let h = harness("USER");

    let err = h
        .client
        .register(RegisterRequest {
            email: "ana@example.com".to_string(),
            password: "Passw0rdX".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
            alias: "ana_l".to_string(),
            date_of_birth: "1990-01-01".to_string(),
        })
        .await
        .unwrap_err();

    assert!(err.api_error().is_some_and(ApiError::is_conflict));
    assert_eq!(severities(&h.client), vec![Severity::Warning]);
    assert!(!h.client.session().is_authenticated());
}

#[tokio::test]
async fn test_feed_actions_require_a_session() {
    let h = harness("USER");

    let err = h.client.load_feed().await.unwrap_err();

    assert_eq!(err, ClientError::NotAuthenticated);
    assert_eq!(h.backend.feed_calls(), 0);
    assert_eq!(h.navigator.current(), Some(Route::Login));
}

#[tokio::test]
async fn test_unauthorized_feed_response_ends_session() {
    let h = harness("USER");
    h.client.start().await;
    h.client.login("ana@example.com", "secret1A").await.unwrap();
    h.client.load_feed().await.unwrap();
    *h.backend.feed_error.lock().unwrap() = Some(ApiError::Unauthorized);

    let err = h.client.load_feed().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!h.client.session().is_authenticated());
    assert!(h.store.load().await.unwrap().is_none());
    assert!(h.client.feed().posts().is_empty());
    assert_eq!(h.navigator.current(), Some(Route::Login));
    assert!(severities(&h.client).contains(&Severity::Warning));
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let h = harness("USER");
    h.client.login("ana@example.com", "secret1A").await.unwrap();
    *h.backend.feed_error.lock().unwrap() = Some(ApiError::Server { status: 503 });

    let err = h.client.load_feed().await.unwrap_err();

    assert_eq!(
        err,
        ClientError::Feed(FeedError::Api(ApiError::Server { status: 503 }))
    );
    assert!(h.client.session().is_authenticated());
    assert_eq!(
        severities(&h.client),
        vec![Severity::Success, Severity::Error]
    );
}

#[tokio::test]
async fn test_logout_clears_feed_and_routes_to_login() {
    let h = harness("USER");
    h.client.login("ana@example.com", "secret1A").await.unwrap();
    h.client.load_feed().await.unwrap();

    h.client.logout().await;

    assert!(h.client.feed().posts().is_empty());
    assert!(!h.client.session().is_authenticated());
    assert_eq!(h.navigator.current(), Some(Route::Login));
}

#[tokio::test]
async fn test_session_ending_elsewhere_clears_feed() {
    let h = harness("USER");
    h.client.start().await;
    h.client.login("ana@example.com", "secret1A").await.unwrap();
    h.client.load_feed().await.unwrap();
    let mut feed = h.client.feed().subscribe();

    h.client.session().handle_unauthorized().await;

    tokio::time::timeout(Duration::from_secs(1), feed.wait_for(|f| f.posts.is_empty()))
        .await
        .expect("feed should be cleared")
        .unwrap();
}

#[tokio::test]
async fn test_like_conflict_shows_info() {
    let h = harness("USER");
    h.client.login("ana@example.com", "secret1A").await.unwrap();
    h.client.load_feed().await.unwrap();
    *h.backend.add_like_error.lock().unwrap() = Some(ApiError::Conflict(None));

    let outcome = h.client.toggle_like(1).await.unwrap();

    assert_eq!(outcome, LikeOutcome::AlreadyLiked);
    assert!(h.client.feed().has_user_liked(1));
    assert_eq!(
        severities(&h.client),
        vec![Severity::Success, Severity::Info]
    );
}

#[tokio::test]
async fn test_create_post_prepends_and_notifies() {
    let h = harness("USER");
    h.client.login("ana@example.com", "secret1A").await.unwrap();
    h.client.load_feed().await.unwrap();

    let created = h.client.create_post("fresh news").await.unwrap();

    assert_eq!(created.message, "fresh news");
    assert_eq!(h.client.feed().posts()[0].id, 10);
}

#[tokio::test]
async fn test_non_admin_cannot_delete() {
    let h = harness("USER");
    h.client.login("ana@example.com", "secret1A").await.unwrap();
    h.client.load_feed().await.unwrap();

    let err = h.client.delete_post(1).await.unwrap_err();

    assert_eq!(err, ClientError::Feed(FeedError::PermissionDenied));
    assert!(!h.backend.calls().contains(&"delete_post".to_string()));
    assert_eq!(h.client.feed().posts().len(), 2);
}

#[tokio::test]
async fn test_admin_delete_removes_post() {
    let h = harness("ADMIN");
    h.client.login("ana@example.com", "secret1A").await.unwrap();
    h.client.load_feed().await.unwrap();

    h.client.delete_post(1).await.unwrap();

    let ids: Vec<i64> = h.client.feed().posts().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![2]);
}

#[tokio::test]
async fn test_unauthorized_reload_after_delete_ends_session() {
    let h = harness("ADMIN");
    h.client.start().await;
    h.client.login("ana@example.com", "secret1A").await.unwrap();
    h.client.load_feed().await.unwrap();
    *h.backend.feed_error.lock().unwrap() = Some(ApiError::Unauthorized);

    let err = h.client.delete_post(1).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(h.backend.calls().contains(&"delete_post".to_string()));
    assert!(!h.client.session().is_authenticated());
    assert!(h.store.load().await.unwrap().is_none());
    assert!(h.client.feed().posts().is_empty());
    assert_eq!(h.navigator.current(), Some(Route::Login));
    assert!(severities(&h.client).contains(&Severity::Warning));
}

#[tokio::test]
async fn test_unauthorized_profile_fetch_routes_to_login() {
    let h = harness("USER");
    *h.backend.user_error.lock().unwrap() = Some(ApiError::Unauthorized);
    h.client.start().await;

    h.client.login("ana@example.com", "secret1A").await.unwrap();
    wait_for_route(&h.navigator, Route::Login).await;

    assert!(!h.client.session().is_authenticated());
    assert!(h.store.load().await.unwrap().is_none());
    assert_eq!(
        severities(&h.client),
        vec![Severity::Success, Severity::Warning]
    );
}

#[tokio::test]
async fn test_logout_does_not_warn_about_expiry() {
    let h = harness("USER");
    h.client.start().await;
    h.client.login("ana@example.com", "secret1A").await.unwrap();

    h.client.logout().await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(!severities(&h.client).contains(&Severity::Warning));
    assert_eq!(h.navigator.current(), Some(Route::Login));
}
