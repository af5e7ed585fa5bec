//! Application startup and the initial page-load flow.
//!
//! Builds the auth source, backend client, session layer, and route gate
//! from configuration, then drives the same control flow a page load runs:
//! gate the initial navigation, and on an allowed protected view kick off
//! identity sync and await its profile continuation.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::config::ConfigV1;
use crate::gate::{GateDecision, RouteGate, RouteTable};
use crate::session::{SessionCoordinator, SessionState};
use crate::sources::create_auth_source;
use crate::state::AppState;

/// Build the shared application state from configuration.
pub fn build_state(config: Arc<ConfigV1>) -> AppState {
    let source = create_auth_source(&config.source);
    let api = Arc::new(ApiClient::new(config.backend_uri.clone()));
    let session = Arc::new(SessionState::new());
    let coordinator = SessionCoordinator::new(source.clone(), api.clone(), session.clone());
    let gate = Arc::new(RouteGate::new(
        source.clone(),
        RouteTable::new(config.routes.clone()),
        config.gate.clone(),
        config.sign_in_route.clone(),
    ));

    AppState {
        config,
        source,
        api,
        session,
        coordinator,
        gate,
    }
}

/// Initializes the client and runs the initial navigation.
///
/// The auth source initializes in the background while the gate's bounded
/// poll waits readiness out, matching a cold page load where the identity
/// provider has not settled before the first navigation event fires.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(config.clone());

    let source = state.source.clone();
    tokio::spawn(async move {
        if let Err(e) = source.initialize().await {
            warn!("Auth source initialization failed: {}", e);
        }
    });

    info!("Navigating to initial route '{}'", config.initial_route);
    match state.gate.authorize(&config.initial_route).await {
        GateDecision::Redirect(route) => {
            info!("Navigation redirected to '{}'", route);
            return Ok(());
        }
        GateDecision::Allow => {
            info!("Navigation to '{}' allowed", config.initial_route);
        }
    }

    // The allowed view mounts and invokes the coordinator; the profile load
    // is chained by the coordinator, so await the published session state
    // rather than the continuation itself.
    let mut session_rx = state.session.subscribe();
    state.coordinator.sync_user().await;

    let settled = timeout(
        Duration::from_secs(30),
        session_rx.wait_for(|s| {
            s.profile_loaded || s.last_sync_error.is_some() || s.last_profile_error.is_some()
        }),
    )
    .await;

    match settled {
        Ok(Ok(snapshot)) => {
            if let Some(profile) = &snapshot.cached_profile {
                info!("Session ready, profile loaded for '{}'", profile.user_id);
            } else if let Some(e) = &snapshot.last_sync_error {
                warn!("Session degraded, identity sync failed: {}", e);
            } else if let Some(e) = &snapshot.last_profile_error {
                warn!("Session degraded, profile load failed: {}", e);
            }
        }
        Ok(Err(_)) => warn!("Session state channel closed before settling"),
        Err(_) => warn!("Session did not settle within 30s"),
    }

    Ok(())
}
