//! Session synchronization coordinator.
//!
//! Two idempotent, dedup-safe operations: mirror the authenticated identity
//! to the backend, then fetch-or-create the user's profile. Failures are
//! absorbed into session state rather than thrown, so the rest of the
//! application keeps working without a synced identity and simply retries
//! the next time a view invokes the operation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::models::Profile;
use crate::session::state::{BeginLoad, BeginSync, SessionState};
use crate::sources::AuthSource;

/// What a call to `sync_user` observed. Failure is reported here and in
/// `last_sync_error`, never as an `Err`.
#[derive(Debug, PartialEq)]
pub enum SyncOutcome {
    /// A previous call already succeeded this session; no network call.
    AlreadySynced,
    /// Another call is outstanding; this one did not start a duplicate.
    AlreadyInFlight,
    Completed,
    Failed,
}

/// What a call to `load_profile` observed.
#[derive(Debug, PartialEq)]
pub enum LoadOutcome {
    /// Served from the session cache; no network call.
    Cached(Profile),
    AlreadyInFlight,
    /// Identity has never been synced this session, so the load did not
    /// start. The sync continuation will load the profile.
    NotSynced,
    Loaded(Profile),
    Failed,
}

#[derive(Clone)]
pub struct SessionCoordinator {
    source: Arc<dyn AuthSource>,
    api: Arc<ApiClient>,
    state: Arc<SessionState>,
}

impl SessionCoordinator {
    pub fn new(source: Arc<dyn AuthSource>, api: Arc<ApiClient>, state: Arc<SessionState>) -> Self {
        SessionCoordinator { source, api, state }
    }

    pub fn state(&self) -> &Arc<SessionState> {
        &self.state
    }

    /// Push the authenticated identity to the backend, once per session.
    ///
    /// On success this chains into `load_profile` as a spawned task; callers
    /// that care about the chain await it through `SessionState::subscribe`.
    pub async fn sync_user(&self) -> SyncOutcome {
        let generation = match self.state.begin_sync() {
            BeginSync::AlreadySynced => {
                debug!("User already synced in this session");
                return SyncOutcome::AlreadySynced;
            }
            BeginSync::InFlight => {
                debug!("User sync already in progress");
                return SyncOutcome::AlreadyInFlight;
            }
            BeginSync::Started(generation) => generation,
        };

        let token = match self.source.get_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!("User sync failed: {}", e);
                self.state.finish_sync(generation, Err(e.to_string()));
                return SyncOutcome::Failed;
            }
        };

        // A token without identity claims would sync an all-null user;
        // treat it like a missing credential instead.
        let identity = match self.source.identity() {
            Some(identity) => identity,
            None => {
                warn!("User sync failed: no authenticated identity available");
                self.state.finish_sync(
                    generation,
                    Err("no authenticated identity available".to_string()),
                );
                return SyncOutcome::Failed;
            }
        };

        match self.api.sync_user(&token, &identity).await {
            Ok(response) => {
                info!("User sync successful: {}", response.status);
                if self.state.finish_sync(generation, Ok(())) {
                    // Fire-and-forget continuation into the profile load.
                    let coordinator = self.clone();
                    tokio::spawn(async move {
                        coordinator.load_profile().await;
                    });
                } else {
                    debug!("Discarding sync result from before sign-out");
                }

                SyncOutcome::Completed
            }
            Err(e) => {
                warn!("User sync failed: {}", e);
                self.state.finish_sync(generation, Err(e.to_string()));
                SyncOutcome::Failed
            }
        }
    }

    /// Fetch-or-create the user's profile, once per session.
    pub async fn load_profile(&self) -> LoadOutcome {
        let generation = match self.state.begin_profile_load() {
            BeginLoad::AlreadyLoaded(profile) => {
                debug!("Profile already loaded in this session");
                return LoadOutcome::Cached(profile);
            }
            BeginLoad::InFlight => {
                debug!("Profile load already in progress");
                return LoadOutcome::AlreadyInFlight;
            }
            BeginLoad::NotSynced => {
                debug!("Profile load skipped, identity not yet synced");
                return LoadOutcome::NotSynced;
            }
            BeginLoad::Started(generation) => generation,
        };

        let token = match self.source.get_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!("Profile load failed: {}", e);
                self.state.finish_profile_load(generation, Err(e.to_string()));
                return LoadOutcome::Failed;
            }
        };

        match self.api.get_profile(&token).await {
            Ok(envelope) => {
                info!("Profile {}: {}", envelope.status, envelope.profile.user_id);
                let profile = envelope.profile.clone();
                self.state
                    .finish_profile_load(generation, Ok(envelope.profile));
                LoadOutcome::Loaded(profile)
            }
            Err(e) => {
                warn!("Profile load failed: {}", e);
                self.state.finish_profile_load(generation, Err(e.to_string()));
                LoadOutcome::Failed
            }
        }
    }
}
