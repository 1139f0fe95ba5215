use tracing::{error, info, warn};

use crate::errors::HarnessError;
use crate::screenshot;
use crate::session_manager::SessionManager;

/// Runner-facing view of a scenario: display name, pass/fail outcome, and a
/// reporting attachment sink.
pub trait Scenario: Send {
    fn name(&self) -> &str;
    fn is_failed(&self) -> bool;
    fn attach(&mut self, bytes: Vec<u8>, mime: &str, label: &str);
}

/// Brackets every scenario execution with session setup and teardown.
/// Registered explicitly with the runner rather than discovered through
/// annotations.
pub struct ScenarioHooks<'a> {
    manager: &'a SessionManager,
}

impl<'a> ScenarioHooks<'a> {
    pub fn new(manager: &'a SessionManager) -> Self {
        ScenarioHooks { manager }
    }

    /// Forces the unit's session into existence before the first step runs.
    pub async fn before_scenario(&self, unit: &str) -> Result<(), HarnessError> {
        let session = self.manager.session(unit).await?;
        info!("Scenario setup complete, session {} ready", session.id());
        Ok(())
    }

    /// Failure capture, then unconditional release. The screenshot must be
    /// taken against the still-live session, so capture strictly precedes
    /// release; a capture failure is logged and swallowed.
    pub async fn after_scenario(&self, unit: &str, scenario: &mut dyn Scenario) {
        if scenario.is_failed() {
            warn!("Scenario '{}' failed, capturing screenshot", scenario.name());
            match self.manager.active(unit) {
                Some(session) => match screenshot::capture(&session, scenario.name()).await {
                    Some(path) => match std::fs::read(&path) {
                        Ok(bytes) => scenario.attach(bytes, "image/png", "Failure screenshot"),
                        Err(e) => {
                            error!("Could not attach screenshot {}: {}", path.display(), e)
                        }
                    },
                    None => error!("No screenshot available for '{}'", scenario.name()),
                },
                None => error!("No live session for unit {}, skipping screenshot", unit),
            }
        }
        self.manager.release(unit).await;
    }
}

#[cfg(test)]
#[path = "hooks_test.rs"]
mod hooks_test;
