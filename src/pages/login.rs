use crate::errors::HarnessError;
use crate::interact::Interactor;
use crate::wait::{Target, Wait};

fn username_field() -> Target {
    Target::id("user-name")
}

fn password_field() -> Target {
    Target::id("password")
}

fn login_button() -> Target {
    Target::id("login-button")
}

fn error_region() -> Target {
    Target::css("[data-test='error']")
}

/// Login page of the demo storefront.
pub struct LoginPage {
    wait: Wait,
    interact: Interactor,
}

impl LoginPage {
    pub fn new(wait: Wait, interact: Interactor) -> Self {
        LoginPage { wait, interact }
    }

    pub async fn enter_username(&self, username: &str) -> Result<(), HarnessError> {
        let field = self.wait.visible(&username_field()).await?;
        self.interact.clear_and_type(&field, username).await
    }

    pub async fn enter_password(&self, password: &str) -> Result<(), HarnessError> {
        let field = self.wait.visible(&password_field()).await?;
        self.interact.clear_and_type(&field, password).await
    }

    pub async fn submit(&self) -> Result<(), HarnessError> {
        let button = self.wait.clickable(&login_button()).await?;
        self.interact.click(&button).await
    }

    /// Full login in one step.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), HarnessError> {
        self.enter_username(username).await?;
        self.enter_password(password).await?;
        self.submit().await
    }

    /// Probe, not a precondition: an absent error region is a normal outcome,
    /// so this uses the safe wait and never raises on timeout.
    pub async fn error_displayed(&self) -> Result<bool, HarnessError> {
        Ok(self.wait.visible_safe(&error_region()).await?.is_some())
    }

    pub async fn error_message(&self) -> Result<Option<String>, HarnessError> {
        match self.wait.visible_safe(&error_region()).await? {
            Some(element) => {
                let text = element.text().await.map_err(HarnessError::from)?;
                Ok(Some(text.trim().to_string()))
            }
            None => Ok(None),
        }
    }
}
