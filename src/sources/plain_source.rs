use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SourceError;
use crate::models::UserIdentity;
use crate::sources::base::AuthSource;

fn default_signed_in() -> bool {
    true
}

/// Config for the plain source: identity and token straight from the file.
/// Meant for development and tests, where no real identity provider runs.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct PlainSourceConfig {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Bearer token handed out verbatim. Absent means "signed in but no
    /// usable credential", which exercises the NoCredential paths.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_signed_in")]
    pub signed_in: bool,
}

/// A source that is loaded from construction and serves static claims.
pub struct PlainSource {
    config: PlainSourceConfig,
}

impl PlainSource {
    pub fn new(config: &PlainSourceConfig) -> Self {
        info!("Creating plain auth source '{}'", config.name);
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait::async_trait]
impl AuthSource for PlainSource {
    fn get_name(&self) -> &str {
        &self.config.name
    }

    fn is_loaded(&self) -> bool {
        true
    }

    fn is_signed_in(&self) -> bool {
        self.config.signed_in
    }

    fn identity(&self) -> Option<UserIdentity> {
        if !self.config.signed_in {
            return None;
        }
        Some(UserIdentity::new(
            self.config.email.clone(),
            self.config.first_name.clone(),
            self.config.last_name.clone(),
        ))
    }

    async fn get_token(&self) -> Result<String, SourceError> {
        match &self.config.token {
            Some(token) if self.config.signed_in => Ok(token.clone()),
            _ => Err(SourceError::NoCredential),
        }
    }
}
