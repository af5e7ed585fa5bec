//! Shared application state.
//!
//! Contains the pieces that every component composes over: configuration,
//! the auth readiness source, the backend client, and the session layer.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::ConfigV1;
use crate::gate::RouteGate;
use crate::session::{SessionCoordinator, SessionState};
use crate::sources::AuthSource;

/// Application state constructed once at startup.
///
/// Cloning is cheap; everything inside is shared. `SessionState` is the only
/// shared mutable resource and only the coordinator writes to it.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Auth readiness source backing both the gate and the coordinator.
    pub source: Arc<dyn AuthSource>,
    /// REST client for the record-management backend.
    pub api: Arc<ApiClient>,
    /// Session sync/profile status shared by all views.
    pub session: Arc<SessionState>,
    /// Dedup-safe identity sync and profile load operations.
    pub coordinator: SessionCoordinator,
    /// Per-navigation authorization gate.
    pub gate: Arc<RouteGate>,
}
