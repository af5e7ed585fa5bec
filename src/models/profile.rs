use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's profile record as the backend returns it.
///
/// The backend owns this record and its timestamps; the client only holds a
/// cached copy in session state.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial profile for PUT /profiles/me. Absent fields are left untouched
/// by the backend.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Response body of POST /users/sync.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SyncResponse {
    /// "created" or "already_exists".
    pub status: String,
    pub user_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response envelope of GET/PUT /profiles/me.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProfileEnvelope {
    /// "loaded" or "created"; logged but otherwise not distinguished.
    pub status: String,
    pub profile: Profile,
}
