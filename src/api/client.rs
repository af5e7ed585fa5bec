//! Thin client for the record-management backend.
//!
//! JSON over HTTPS with a bearer credential per request. Non-2xx responses
//! carry a `{"detail": "..."}` body; when that body isn't JSON we fall back
//! to a per-endpoint message, so callers always get something readable.

use reqwest::{Client, Response};
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;
use crate::models::{ProfileEnvelope, ProfileUpdate, SyncResponse, UserIdentity};

pub struct ApiClient {
    base_uri: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_uri: impl Into<String>) -> Self {
        ApiClient {
            base_uri: base_uri.into(),
            client: Client::new(),
        }
    }

    /// POST /users/sync: mirror the authenticated identity to the backend.
    /// The backend creates the user on first sight and reports
    /// "already_exists" afterwards.
    pub async fn sync_user(
        &self,
        token: &str,
        identity: &UserIdentity,
    ) -> Result<SyncResponse, ApiError> {
        let url = format!("{}/users/sync", self.base_uri);
        debug!("Sending user sync request to: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(identity)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(read_error(response, "Failed to sync user").await);
        }

        response
            .json::<SyncResponse>()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))
    }

    /// GET /profiles/me: fetch the caller's profile record. The backend
    /// creates a default profile when none exists, so a 2xx always carries
    /// a profile.
    pub async fn get_profile(&self, token: &str) -> Result<ProfileEnvelope, ApiError> {
        let url = format!("{}/profiles/me", self.base_uri);
        debug!("Sending profile fetch request to: {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(read_error(response, "Failed to fetch master profile").await);
        }

        response
            .json::<ProfileEnvelope>()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))
    }

    /// PUT /profiles/me: partial update used by the profile-edit views.
    pub async fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> Result<ProfileEnvelope, ApiError> {
        let url = format!("{}/profiles/me", self.base_uri);
        debug!("Sending profile update request to: {}", url);

        let response = self
            .client
            .put(&url)
            .bearer_auth(token)
            .json(update)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(read_error(response, "Failed to update master profile").await);
        }

        response
            .json::<ProfileEnvelope>()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))
    }
}

/// Turns a non-2xx response into an ApiError, preferring the backend's
/// `detail` field over the fallback message.
async fn read_error(response: Response, fallback: &str) -> ApiError {
    let status = response.status().as_u16();
    let detail = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body["detail"].as_str().map(str::to_string))
        .unwrap_or_else(|| fallback.to_string());
    ApiError::Backend { status, detail }
}
