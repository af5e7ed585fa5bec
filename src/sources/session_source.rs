use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

#[allow(unused_imports)]
use cached::proc_macro::cached;
use reqwest;

use crate::error::SourceError;
use crate::models::UserIdentity;
use crate::sources::base::AuthSource;

/// Config for a source backed by an HTTP identity provider exposing a
/// session endpoint and a token endpoint.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct SessionEndpointSourceConfig {
    pub name: String,
    pub uri: String,
}

#[derive(Debug, Clone)]
struct SessionInfo {
    active: bool,
    identity: UserIdentity,
}

/// A source that learns its session state from the provider's
/// `GET {uri}/session` endpoint. Until that initial fetch resolves the
/// source reports not-loaded, which is what the route gate's bounded poll
/// waits out on a cold start.
pub struct SessionEndpointSource {
    pub config: SessionEndpointSourceConfig,
    loaded: AtomicBool,
    session: Mutex<Option<SessionInfo>>,
}

impl SessionEndpointSource {
    pub fn new(config: &SessionEndpointSourceConfig) -> Self {
        info!(
            "Creating session-endpoint auth source '{}' for {}",
            config.name, config.uri
        );
        Self {
            config: config.clone(),
            loaded: AtomicBool::new(false),
            session: Mutex::new(None),
        }
    }
}

#[async_trait::async_trait]
impl AuthSource for SessionEndpointSource {
    fn get_name(&self) -> &str {
        &self.config.name
    }

    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    fn is_signed_in(&self) -> bool {
        self.session
            .lock()
            .expect("session mutex poisoned")
            .as_ref()
            .map(|s| s.active)
            .unwrap_or(false)
    }

    fn identity(&self) -> Option<UserIdentity> {
        self.session
            .lock()
            .expect("session mutex poisoned")
            .as_ref()
            .filter(|s| s.active)
            .map(|s| s.identity.clone())
    }

    async fn get_token(&self) -> Result<String, SourceError> {
        fetch_token(self.config.uri.clone()).await
    }

    async fn initialize(&self) -> Result<(), SourceError> {
        match fetch_session(self.config.uri.clone()).await {
            Ok(session) => {
                debug!(
                    "Session endpoint '{}' resolved, active={}",
                    self.config.name, session.active
                );
                *self.session.lock().expect("session mutex poisoned") = Some(session);
                self.loaded.store(true, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                // A provider we cannot reach is treated as a settled,
                // signed-out session rather than left unknown forever.
                warn!(
                    "Session endpoint '{}' initialization failed: {}",
                    self.config.name, e
                );
                self.loaded.store(true, Ordering::Release);
                Err(e)
            }
        }
    }
}

/// Queries the provider's session endpoint, returning the current session
/// state and identity claims.
async fn fetch_session(uri: String) -> Result<SessionInfo, SourceError> {
    let client = reqwest::Client::new();
    let url = format!("{}/session", uri);

    debug!("Sending session request to: {}", url);
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| SourceError::Provider(format!("error sending request: {}", e)))?;

    if !response.status().is_success() {
        return Err(SourceError::Provider(format!(
            "unexpected status code: {}",
            response.status()
        )));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| SourceError::Provider(format!("error parsing JSON: {}", e)))?;

    let active = body["active"].as_bool().unwrap_or(false);
    let user = &body["user"];
    let identity = UserIdentity::new(
        user["email"].as_str().map(str::to_string),
        user["first_name"].as_str().map(str::to_string),
        user["last_name"].as_str().map(str::to_string),
    );

    Ok(SessionInfo { active, identity })
}

/// Queries the provider's token endpoint. Results are cached briefly so
/// back-to-back coordinator calls don't hammer the provider.
#[cfg_attr(not(test), cached(time = 60, result = true, sync_writes = true))]
async fn fetch_token(uri: String) -> Result<String, SourceError> {
    let client = reqwest::Client::new();
    let url = format!("{}/token", uri);

    debug!("Sending token request to: {}", url);
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| SourceError::Provider(format!("error sending request: {}", e)))?;

    if !response.status().is_success() {
        return Err(SourceError::Provider(format!(
            "unexpected status code: {}",
            response.status()
        )));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| SourceError::Provider(format!("error parsing JSON: {}", e)))?;

    match body["token"].as_str() {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(SourceError::NoCredential),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use tokio;

    fn config(uri: &str) -> SessionEndpointSourceConfig {
        SessionEndpointSourceConfig {
            name: "test session source".to_string(),
            uri: uri.to_string(),
        }
    }

    /// An active session response makes the source loaded and signed in.
    #[tokio::test]
    async fn test_session_source_active_session() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/session")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"active": true, "user": {"email": "eve@example.com", "first_name": "Eve"}}"#)
            .create_async()
            .await;

        let source = SessionEndpointSource::new(&config(&server.url()));
        assert!(!source.is_loaded());

        source.initialize().await.unwrap();
        m.assert_async().await;

        assert!(source.is_loaded());
        assert!(source.is_signed_in());
        let identity = source.identity().unwrap();
        assert_eq!(identity.email.as_deref(), Some("eve@example.com"));
        assert_eq!(identity.last_name, None);
    }

    /// An inactive session leaves the source loaded but signed out.
    #[tokio::test]
    async fn test_session_source_inactive_session() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/session")
            .with_status(200)
            .with_body(r#"{"active": false}"#)
            .create_async()
            .await;

        let source = SessionEndpointSource::new(&config(&server.url()));
        source.initialize().await.unwrap();
        m.assert_async().await;

        assert!(source.is_loaded());
        assert!(!source.is_signed_in());
        assert!(source.identity().is_none());
    }

    /// A failing session endpoint settles the source as signed out instead
    /// of leaving readiness unknown forever.
    #[tokio::test]
    async fn test_session_source_initialization_failure_settles() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/session")
            .with_status(502)
            .create_async()
            .await;

        let source = SessionEndpointSource::new(&config(&server.url()));
        let result = source.initialize().await;
        m.assert_async().await;

        assert!(result.is_err());
        assert!(source.is_loaded());
        assert!(!source.is_signed_in());
    }

    /// The token endpoint's token field becomes the bearer credential.
    #[tokio::test]
    async fn test_fetch_token_success() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/token")
            .with_status(200)
            .with_body(r#"{"token": "tok_abc"}"#)
            .create_async()
            .await;

        let token = fetch_token(server.url()).await.unwrap();
        m.assert_async().await;
        assert_eq!(token, "tok_abc");
    }

    /// A response without a token maps to NoCredential.
    #[tokio::test]
    async fn test_fetch_token_missing_token() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/token")
            .with_status(200)
            .with_body(r#"{"token": null}"#)
            .create_async()
            .await;

        let err = fetch_token(server.url()).await.unwrap_err();
        m.assert_async().await;
        assert_eq!(err, SourceError::NoCredential);
    }
}
