//! Step definitions for the login feature, operating purely on the scenario
//! context.

use anyhow::anyhow;
use tracing::info;

use crate::context::ScenarioContext;
use crate::errors::HarnessError;

/// Expected end state of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    Failure { message: String },
}

pub async fn visit_home(ctx: &ScenarioContext) -> Result<(), HarnessError> {
    let url = ctx.config.home_url()?;
    ctx.interact.navigate(&url).await?;
    ctx.wait.app_settled().await
}

pub async fn enter_username(ctx: &ScenarioContext, username: &str) -> Result<(), HarnessError> {
    ctx.login_page.enter_username(username).await
}

pub async fn enter_password(ctx: &ScenarioContext, password: &str) -> Result<(), HarnessError> {
    ctx.login_page.enter_password(password).await
}

pub async fn submit_login(ctx: &ScenarioContext) -> Result<(), HarnessError> {
    ctx.login_page.submit().await
}

pub async fn assert_outcome(
    ctx: &ScenarioContext,
    expected: &LoginOutcome,
) -> Result<(), HarnessError> {
    match expected {
        LoginOutcome::Success => {
            let url = ctx.wait.url_contains("/inventory").await?;
            info!("Login succeeded, landed on {}", url);
            Ok(())
        }
        LoginOutcome::Failure { message } => {
            let actual = ctx.login_page.error_message().await?.ok_or_else(|| {
                HarnessError::Other(anyhow!("No error message displayed after failed login"))
            })?;
            if actual == *message {
                info!("Login rejected with the expected message");
                Ok(())
            } else {
                Err(HarnessError::Other(anyhow!(
                    "Unexpected error message: expected '{}', got '{}'",
                    message,
                    actual
                )))
            }
        }
    }
}

/// The whole feature as one sequence: visit, fill credentials, submit,
/// verify.
pub async fn login_scenario(
    ctx: &ScenarioContext,
    username: &str,
    password: &str,
    expected: &LoginOutcome,
) -> Result<(), HarnessError> {
    visit_home(ctx).await?;
    enter_username(ctx, username).await?;
    enter_password(ctx, password).await?;
    submit_login(ctx).await?;
    assert_outcome(ctx, expected).await
}
