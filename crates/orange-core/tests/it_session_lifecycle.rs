//! Integration tests for the session lifecycle against a mock token endpoint

use std::sync::Arc;

use orange_core::api::ApiClient;
use orange_core::auth::{
    CredentialStore, FileStore, MemoryStore, SessionManager, SessionState, ACCESS_TOKEN_KEY,
    REFRESH_TOKEN_KEY,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_with(store: Arc<dyn CredentialStore>) -> Arc<SessionManager> {
    Arc::new(SessionManager::new(store))
}

#[tokio::test]
async fn login_then_logout_clears_everything() {
    //* Given
    let store = Arc::new(MemoryStore::new());
    let session = session_with(store.clone());

    //* When
    session.login("abc", "xyz").expect("login should persist tokens");

    //* Then
    assert_eq!(session.current_token().unwrap().as_deref(), Some("abc"));
    assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("xyz"));
    assert_eq!(session.state(), SessionState::Authenticated);

    session.logout().expect("logout should not fail");
    assert_eq!(session.current_token().unwrap(), None);
    assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap(), None);
    assert_eq!(session.state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn logout_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let session = session_with(store.clone());

    session.logout().expect("first logout");
    session.logout().expect("second logout");

    assert_eq!(session.state(), SessionState::Unauthenticated);
    assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
    assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn initialize_with_valid_token_authenticates() {
    //* Given
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/token/"))
        .and(header("authorization", "Bearer good-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store.set(ACCESS_TOKEN_KEY, "good-token").unwrap();
    let session = session_with(store);
    let api = ApiClient::new(&server.uri(), session.clone()).unwrap();

    //* When
    let state = session.initialize(&api).await.expect("storage is healthy");

    //* Then
    assert_eq!(state, SessionState::Authenticated);
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn initialize_with_expired_token_keeps_it_stored() {
    //* Given
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token_not_valid"))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store.set(ACCESS_TOKEN_KEY, "expired").unwrap();
    let session = session_with(store.clone());
    let api = ApiClient::new(&server.uri(), session.clone()).unwrap();

    //* When
    let state = session.initialize(&api).await.expect("storage is healthy");

    //* Then
    assert_eq!(state, SessionState::Unauthenticated);
    assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("expired"));
}

#[tokio::test]
async fn initialize_on_network_failure_is_unauthenticated() {
    let store = Arc::new(MemoryStore::new());
    store.set(ACCESS_TOKEN_KEY, "abc").unwrap();
    let session = session_with(store.clone());
    // Nothing listens on the discard port
    let api = ApiClient::new("http://127.0.0.1:9", session.clone()).unwrap();

    let state = session.initialize(&api).await.expect("storage is healthy");

    assert_eq!(state, SessionState::Unauthenticated);
    assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("abc"));
}

#[tokio::test]
async fn initialize_without_token_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let session = session_with(Arc::new(MemoryStore::new()));
    let api = ApiClient::new(&server.uri(), session.clone()).unwrap();

    let state = session.initialize(&api).await.expect("storage is healthy");

    assert_eq!(state, SessionState::Unauthenticated);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn tokens_survive_restart() {
    //* Given
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/token/"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    {
        let session = session_with(Arc::new(FileStore::new(dir.path())));
        session.login("abc", "xyz").unwrap();
    }

    //* When
    let session = session_with(Arc::new(FileStore::new(dir.path())));
    let api = ApiClient::new(&server.uri(), session.clone()).unwrap();
    let state = session.initialize(&api).await.unwrap();

    //* Then
    assert_eq!(state, SessionState::Authenticated);
    assert_eq!(session.current_token().unwrap().as_deref(), Some("abc"));
    assert_eq!(session.refresh_token().unwrap().as_deref(), Some("xyz"));
}

#[tokio::test]
async fn obtain_tokens_posts_credentials() {
    //* Given
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .and(body_json(serde_json::json!({"username": "admin", "password": "admin"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"access": "acc", "refresh": "ref"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = session_with(Arc::new(MemoryStore::new()));
    let api = ApiClient::new(&server.uri(), session.clone()).unwrap();

    //* When
    let tokens = api.obtain_tokens("admin", "admin").await.expect("token request");

    //* Then
    assert_eq!(tokens.access, "acc");
    assert_eq!(tokens.refresh, "ref");
    // Obtaining tokens alone does not log in
    assert_eq!(session.state(), SessionState::Unauthenticated);
    assert_eq!(session.current_token().unwrap(), None);
}

#[tokio::test]
async fn login_screen_starts_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"access": "acc", "refresh": "ref"})),
        )
        .mount(&server)
        .await;

    let session = session_with(Arc::new(MemoryStore::new()));
    let api = ApiClient::new(&server.uri(), session.clone()).unwrap();
    let mut login = orange_core::screens::LoginScreen::new(api).with_username("admin");
    login.password = "admin".to_string();

    assert!(login.submit().await);
    assert!(login.password.is_empty());
    assert_eq!(session.state(), SessionState::Authenticated);
    assert_eq!(session.current_token().unwrap().as_deref(), Some("acc"));
}

#[tokio::test]
async fn login_screen_reports_bad_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let session = session_with(Arc::new(MemoryStore::new()));
    let api = ApiClient::new(&server.uri(), session.clone()).unwrap();
    let mut login = orange_core::screens::LoginScreen::new(api).with_username("admin");
    login.password = "wrong".to_string();

    assert!(!login.submit().await);
    assert_eq!(login.error.as_deref(), Some("Invalid username or password"));
    assert_eq!(session.state(), SessionState::Unauthenticated);
}
