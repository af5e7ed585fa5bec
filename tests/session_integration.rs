use std::sync::Arc;

use figment::{
    providers::{Format, Yaml},
    Figment,
};
use mockito::Server;

use vault_session::config::{Config, ConfigV1};
use vault_session::gate::GateDecision;
use vault_session::session::{LoadOutcome, SyncOutcome};
use vault_session::startup::build_state;

const SYNC_BODY: &str =
    r#"{"status": "created", "user_id": "user_1", "message": "User created successfully"}"#;
const PROFILE_BODY: &str = r#"{
    "status": "created",
    "profile": {
        "userId": "user_1",
        "email": "adam@example.com",
        "firstName": "Adam",
        "lastName": "First",
        "createdAt": "2025-01-01T00:00:00Z",
        "updatedAt": "2025-01-01T00:00:00Z"
    }
}"#;

fn load_test_config(backend_uri: &str, signed_in: bool, token: Option<&str>) -> ConfigV1 {
    let token_line = match token {
        Some(token) => format!("token: {}", token),
        None => String::new(),
    };
    let yaml = format!(
        r#"
version: "1.0.0"
backend_uri: "{backend_uri}"
source:
  type: "plain"
  name: "Plain source"
  email: adam@example.com
  first_name: Adam
  last_name: First
  signed_in: {signed_in}
  {token_line}
gate:
  poll_interval_ms: 10
  timeout_ms: 200
routes:
  - path: "/"
    name: home
    public: true
  - path: "/profile"
    name: profile
  - path: "/resume/:id"
    name: resume
logging:
  level: "debug"
  format: "json"
"#
    );

    let config: Config = Figment::new()
        .merge(Yaml::string(&yaml))
        .extract()
        .expect("Failed to parse test config YAML");
    match config {
        Config::ConfigV1(cfg) => cfg,
    }
}

/// Cold load of a protected view by a signed-in user: the gate allows, the
/// sync runs once, and the chained profile load populates the shared cache.
#[tokio::test]
async fn integration_cold_load_sync_and_profile_chain() {
    let mut server = Server::new_async().await;
    let sync = server
        .mock("POST", "/users/sync")
        .match_header("authorization", "Bearer tok_123")
        .with_status(200)
        .with_body(SYNC_BODY)
        .expect(1)
        .create_async()
        .await;
    let profile = server
        .mock("GET", "/profiles/me")
        .match_header("authorization", "Bearer tok_123")
        .with_status(200)
        .with_body(PROFILE_BODY)
        .expect(1)
        .create_async()
        .await;

    let config = load_test_config(&server.url(), true, Some("tok_123"));
    let state = build_state(Arc::new(config));

    assert_eq!(state.gate.authorize("/profile").await, GateDecision::Allow);

    let mut rx = state.session.subscribe();
    assert_eq!(state.coordinator.sync_user().await, SyncOutcome::Completed);

    let snapshot = rx
        .wait_for(|s| s.profile_loaded)
        .await
        .expect("session state channel closed")
        .clone();

    sync.assert_async().await;
    profile.assert_async().await;

    assert!(snapshot.identity_synced);
    let cached = snapshot.cached_profile.expect("profile should be cached");
    assert_eq!(cached.user_id, "user_1");
    assert_eq!(cached.email.as_deref(), Some("adam@example.com"));

    // A later view finds everything cached, with no further traffic.
    assert_eq!(state.coordinator.sync_user().await, SyncOutcome::AlreadySynced);
    match state.coordinator.load_profile().await {
        LoadOutcome::Cached(p) => assert_eq!(p.user_id, "user_1"),
        other => panic!("expected cached profile, got {:?}", other),
    }
}

/// A signed-out user navigating to a protected view is redirected to the
/// sign-in route; public views stay reachable.
#[tokio::test]
async fn integration_signed_out_user_is_redirected() {
    let server = Server::new_async().await;
    let config = load_test_config(&server.url(), false, None);
    let state = build_state(Arc::new(config));

    assert_eq!(state.gate.authorize("/").await, GateDecision::Allow);
    assert_eq!(
        state.gate.authorize("/profile").await,
        GateDecision::Redirect("/sign-in".to_string())
    );
    assert_eq!(
        state.gate.authorize("/resume/42").await,
        GateDecision::Redirect("/sign-in".to_string())
    );
}

/// A backend outage during sync leaves the client usable and degraded:
/// errors recorded, nothing thrown, and the profile load never starts.
#[tokio::test]
async fn integration_backend_outage_degrades_gracefully() {
    let mut server = Server::new_async().await;
    let sync = server
        .mock("POST", "/users/sync")
        .with_status(500)
        .with_body(r#"{"detail": "Internal server error during user sync"}"#)
        .expect(1)
        .create_async()
        .await;
    let profile = server
        .mock("GET", "/profiles/me")
        .expect(0)
        .create_async()
        .await;

    let config = load_test_config(&server.url(), true, Some("tok_123"));
    let state = build_state(Arc::new(config));

    assert_eq!(state.coordinator.sync_user().await, SyncOutcome::Failed);
    assert_eq!(state.coordinator.load_profile().await, LoadOutcome::NotSynced);

    sync.assert_async().await;
    profile.assert_async().await;

    let snapshot = state.session.snapshot();
    assert!(!snapshot.identity_synced);
    assert!(!snapshot.profile_loaded);
    assert_eq!(
        snapshot.last_sync_error.as_deref(),
        Some("backend returned 500: Internal server error during user sync")
    );
}

/// Sign-out reset clears the session so the next sign-in syncs again.
#[tokio::test]
async fn integration_reset_allows_resync() {
    let mut server = Server::new_async().await;
    let sync = server
        .mock("POST", "/users/sync")
        .with_status(200)
        .with_body(SYNC_BODY)
        .expect(2)
        .create_async()
        .await;
    let _profile = server
        .mock("GET", "/profiles/me")
        .with_status(200)
        .with_body(PROFILE_BODY)
        .create_async()
        .await;

    let config = load_test_config(&server.url(), true, Some("tok_123"));
    let state = build_state(Arc::new(config));

    assert_eq!(state.coordinator.sync_user().await, SyncOutcome::Completed);
    state.session.reset();
    assert!(!state.session.snapshot().identity_synced);

    assert_eq!(state.coordinator.sync_user().await, SyncOutcome::Completed);
    sync.assert_async().await;
}
