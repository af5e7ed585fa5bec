//! Route authorization gate.
//!
//! Intercepts every navigation. Public routes pass straight through.
//! Protected routes wait out the identity provider's startup with a bounded
//! poll: without it, a cold page load would redirect every authenticated
//! user whose provider had not yet finished initializing. If readiness
//! never arrives within the timeout the gate fails closed and evaluates the
//! route as unauthenticated.

use std::sync::Arc;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::gate::routes::{RouteClass, RouteTable};
use crate::sources::AuthSource;

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_timeout_ms() -> u64 {
    5000
}

/// Bounds for the readiness poll.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct GateConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        GateConfig {
            poll_interval_ms: default_poll_interval_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// The gate's verdict for one navigation.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Allow,
    /// Redirect to the sign-in route, discarding the original navigation.
    Redirect(String),
}

pub struct RouteGate {
    source: Arc<dyn AuthSource>,
    routes: RouteTable,
    config: GateConfig,
    sign_in_route: String,
}

impl RouteGate {
    pub fn new(
        source: Arc<dyn AuthSource>,
        routes: RouteTable,
        config: GateConfig,
        sign_in_route: impl Into<String>,
    ) -> Self {
        RouteGate {
            source,
            routes,
            config,
            sign_in_route: sign_in_route.into(),
        }
    }

    /// Decide one navigation. Each call re-evaluates classification and
    /// readiness independently; nothing is cached across navigations.
    pub async fn authorize(&self, path: &str) -> GateDecision {
        if self.routes.classify(path) == RouteClass::Public {
            debug!("Navigation to public route '{}' allowed", path);
            return GateDecision::Allow;
        }

        if !self.source.is_loaded() && !self.wait_for_readiness(path).await {
            // Readiness never arrived: unknown counts as unauthenticated.
            debug!(
                "Navigation to protected route '{}' redirected to '{}'",
                path, self.sign_in_route
            );
            return GateDecision::Redirect(self.sign_in_route.clone());
        }

        if self.source.is_signed_in() {
            debug!("Navigation to protected route '{}' allowed", path);
            GateDecision::Allow
        } else {
            debug!(
                "Navigation to protected route '{}' redirected to '{}'",
                path, self.sign_in_route
            );
            GateDecision::Redirect(self.sign_in_route.clone())
        }
    }

    /// Cooperative bounded poll: re-check readiness every poll interval
    /// until the source loads or the timeout elapses. Returns whether
    /// readiness arrived in time.
    async fn wait_for_readiness(&self, path: &str) -> bool {
        let interval = Duration::from_millis(self.config.poll_interval_ms);
        let deadline = Instant::now() + Duration::from_millis(self.config.timeout_ms);

        loop {
            sleep(interval).await;
            if self.source.is_loaded() {
                return true;
            }
            if Instant::now() >= deadline {
                warn!(
                    "Auth readiness timed out after {}ms for '{}', failing closed",
                    self.config.timeout_ms, path
                );
                return false;
            }
        }
    }
}
