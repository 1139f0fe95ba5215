use std::sync::Arc;

use crate::config::Config;
use crate::interact::Interactor;
use crate::pages::LoginPage;
use crate::session::Session;
use crate::wait::Wait;

/// Everything a step definition needs for one scenario, wired once per run
/// from the unit's session.
pub struct ScenarioContext {
    pub config: Config,
    pub session: Arc<Session>,
    pub wait: Wait,
    pub interact: Interactor,
    pub login_page: LoginPage,
}

impl ScenarioContext {
    pub fn new(config: Config, session: Arc<Session>) -> Self {
        let client = session.client().clone();
        let wait = Wait::new(client.clone());
        let interact = Interactor::new(client);
        let login_page = LoginPage::new(wait.clone(), interact.clone());
        ScenarioContext {
            config,
            session,
            wait,
            interact,
            login_page,
        }
    }
}
