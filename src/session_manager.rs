use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::HarnessError;
use crate::session::Session;

/// Provides exactly one live session per execution unit, created on demand
/// and torn down on request.
///
/// Units are identified by an explicit key minted by the runner and passed
/// through to every call; nothing here consults thread or task identity. The
/// registry is partitioned strictly by that key, so units never observe each
/// other's entries.
pub struct SessionManager {
    config: Config,
    sessions: DashMap<String, Arc<Session>>,
}

impl SessionManager {
    pub fn new(config: Config) -> Self {
        SessionManager {
            config,
            sessions: DashMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Session for the given execution unit, launching one from configuration
    /// on first demand. Launch failures are fatal and leave no entry behind.
    pub async fn session(&self, unit: &str) -> Result<Arc<Session>, HarnessError> {
        if let Some(existing) = self.sessions.get(unit) {
            debug!(
                "Reusing session {} for unit {}",
                existing.value().id(),
                unit
            );
            return Ok(Arc::clone(existing.value()));
        }

        let session = Arc::new(Session::launch(&self.config).await?);
        info!("New session {} for unit {}", session.id(), unit);
        self.sessions.insert(unit.to_string(), Arc::clone(&session));
        Ok(session)
    }

    /// Non-creating lookup, used by the lifecycle hooks for failure capture.
    pub fn active(&self, unit: &str) -> Option<Arc<Session>> {
        self.sessions.get(unit).map(|entry| Arc::clone(entry.value()))
    }

    /// Release the unit's session if one exists. Quit errors are logged and
    /// swallowed so teardown never fails a scenario on top of its actual
    /// outcome; the entry is removed unconditionally. Calling this with no
    /// active session is a no-op.
    pub async fn release(&self, unit: &str) {
        match self.sessions.remove(unit) {
            Some((_, session)) => {
                debug!("Releasing session {} for unit {}", session.id(), unit);
                if let Err(e) = session.quit().await {
                    warn!("Failed to quit session for unit {}: {}", unit, e);
                }
            }
            None => debug!("No session to release for unit {}", unit),
        }
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
#[path = "session_manager_test.rs"]
mod session_manager_test;
