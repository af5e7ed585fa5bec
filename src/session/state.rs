//! Shared session state.
//!
//! One `SessionState` lives for the whole process, held in `AppState` and
//! handed to every component that needs the sync status or the cached
//! profile. Only the coordinator mutates it; everyone else reads snapshots
//! or subscribes to the watch channel.
//!
//! The in-flight bookkeeping is a real atomic guard: each begin_* call
//! checks and sets its flag under one mutex acquisition, so duplicate
//! backend calls are impossible even with callers on different threads.
//!
//! A generation counter guards against sign-out racing an outstanding
//! call: `reset()` bumps the generation while leaving the in-flight flags
//! alone, and a finish_* carrying a stale generation releases its flag
//! without applying its result to the fresh session.

use std::sync::Mutex;

use tokio::sync::watch;

use crate::models::Profile;

/// Immutable view of the session state at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    /// True once backend sync has succeeded at least once this session.
    pub identity_synced: bool,
    pub sync_in_flight: bool,
    /// True once a profile has been fetched-or-created successfully.
    pub profile_loaded: bool,
    pub profile_load_in_flight: bool,
    /// Last successfully loaded profile. Never cleared on a failed load.
    pub cached_profile: Option<Profile>,
    pub last_sync_error: Option<String>,
    pub last_profile_error: Option<String>,
}

/// Outcome of an atomic attempt to start the sync operation. `Started`
/// carries the generation the finish call must present.
#[derive(Debug, PartialEq)]
pub(crate) enum BeginSync {
    AlreadySynced,
    InFlight,
    Started(u64),
}

/// Outcome of an atomic attempt to start the profile load.
#[derive(Debug, PartialEq)]
pub(crate) enum BeginLoad {
    AlreadyLoaded(Profile),
    InFlight,
    NotSynced,
    Started(u64),
}

struct Inner {
    snap: SessionSnapshot,
    /// Bumped by `reset()`; results from an earlier generation are dropped.
    generation: u64,
}

pub struct SessionState {
    inner: Mutex<Inner>,
    tx: watch::Sender<SessionSnapshot>,
}

impl SessionState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot::default());
        SessionState {
            inner: Mutex::new(Inner {
                snap: SessionSnapshot::default(),
                generation: 0,
            }),
            tx,
        }
    }

    /// Current state, for views that read rather than await.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snap.clone()
    }

    /// Subscribe to state transitions. Every begin/finish publishes, so a
    /// caller can await the sync -> profile chain explicitly instead of
    /// relying on the fire-and-forget continuation being invisible.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// Sign-out support: clears flags, errors, and the cached profile.
    ///
    /// In-flight markers stay set while their network call is outstanding,
    /// so a post-reset caller cannot start a duplicate; the stale call's
    /// finish releases the marker and its result is dropped.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.snap = SessionSnapshot {
            sync_in_flight: inner.snap.sync_in_flight,
            profile_load_in_flight: inner.snap.profile_load_in_flight,
            ..SessionSnapshot::default()
        };
        self.tx.send_replace(inner.snap.clone());
    }

    pub(crate) fn begin_sync(&self) -> BeginSync {
        let mut inner = self.lock();
        if inner.snap.identity_synced {
            return BeginSync::AlreadySynced;
        }
        if inner.snap.sync_in_flight {
            return BeginSync::InFlight;
        }
        inner.snap.sync_in_flight = true;
        inner.snap.last_sync_error = None;
        let generation = inner.generation;
        self.tx.send_replace(inner.snap.clone());
        BeginSync::Started(generation)
    }

    /// Returns whether the result was applied; a stale generation only
    /// releases the in-flight marker.
    pub(crate) fn finish_sync(&self, generation: u64, result: Result<(), String>) -> bool {
        let mut inner = self.lock();
        inner.snap.sync_in_flight = false;
        let applied = generation == inner.generation;
        if applied {
            match result {
                Ok(()) => {
                    inner.snap.identity_synced = true;
                    inner.snap.last_sync_error = None;
                }
                Err(message) => {
                    inner.snap.last_sync_error = Some(message);
                }
            }
        }
        self.tx.send_replace(inner.snap.clone());
        applied
    }

    pub(crate) fn begin_profile_load(&self) -> BeginLoad {
        let mut inner = self.lock();
        if inner.snap.profile_loaded {
            if let Some(profile) = inner.snap.cached_profile.clone() {
                return BeginLoad::AlreadyLoaded(profile);
            }
        }
        if inner.snap.profile_load_in_flight {
            return BeginLoad::InFlight;
        }
        // Profile load is causally downstream of sync: refusing to start
        // before the first successful sync keeps that ordering observable.
        if !inner.snap.identity_synced {
            return BeginLoad::NotSynced;
        }
        inner.snap.profile_load_in_flight = true;
        inner.snap.last_profile_error = None;
        let generation = inner.generation;
        self.tx.send_replace(inner.snap.clone());
        BeginLoad::Started(generation)
    }

    /// Returns whether the result was applied; a stale generation only
    /// releases the in-flight marker.
    pub(crate) fn finish_profile_load(
        &self,
        generation: u64,
        result: Result<Profile, String>,
    ) -> bool {
        let mut inner = self.lock();
        inner.snap.profile_load_in_flight = false;
        let applied = generation == inner.generation;
        if applied {
            match result {
                Ok(profile) => {
                    inner.snap.cached_profile = Some(profile);
                    inner.snap.profile_loaded = true;
                    inner.snap.last_profile_error = None;
                }
                Err(message) => {
                    // Stale-but-valid: a failed load never clears the cache.
                    inner.snap.last_profile_error = Some(message);
                }
            }
        }
        self.tx.send_replace(inner.snap.clone());
        applied
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("session state mutex poisoned")
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
