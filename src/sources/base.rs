use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::plain_source::{PlainSource, PlainSourceConfig};
use super::session_source::{SessionEndpointSource, SessionEndpointSourceConfig};
use crate::error::SourceError;
use crate::models::UserIdentity;

/// Configuration options for each auth readiness source.
#[derive(Deserialize, Serialize, JsonSchema, Debug)]
#[serde(tag = "type")]
pub enum SourceConfig {
    #[serde(rename = "plain")]
    Plain(PlainSourceConfig),

    #[serde(rename = "session-endpoint")]
    SessionEndpoint(SessionEndpointSourceConfig),
}

/// An auth readiness source reports whether the identity provider has
/// finished initializing, whether a user is signed in, and can produce a
/// bearer credential asynchronously.
#[async_trait::async_trait]
pub trait AuthSource: Send + Sync {
    fn get_name(&self) -> &str;

    /// True once the provider has finished its initial handshake. The route
    /// gate polls this before evaluating `is_signed_in`.
    fn is_loaded(&self) -> bool;

    fn is_signed_in(&self) -> bool;

    /// Identity claims for the signed-in user, if any.
    fn identity(&self) -> Option<UserIdentity>;

    /// Obtain a bearer credential for backend calls.
    async fn get_token(&self) -> Result<String, SourceError>;

    /// Kick off any background initialization. Default is a no-op for
    /// sources that are ready from construction.
    async fn initialize(&self) -> Result<(), SourceError> {
        Ok(())
    }
}

/// Create an auth readiness source from a given config.
pub fn create_auth_source(config: &SourceConfig) -> Arc<dyn AuthSource> {
    match config {
        SourceConfig::Plain(cfg) => Arc::new(PlainSource::new(cfg)),
        SourceConfig::SessionEndpoint(cfg) => Arc::new(SessionEndpointSource::new(cfg)),
    }
}
