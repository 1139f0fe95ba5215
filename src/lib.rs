//! # webharness
#![allow(clippy::uninlined_format_args)]
//!
//! WebDriver end-to-end test harness for the demo storefront login flow:
//! explicit waits, one browser session per scenario, and failure screenshots.
//!
//! The two load-bearing pieces are the [`wait::Wait`] engine, which turns
//! declarative synchronization requirements into bounded retry loops that
//! tolerate the flakiness of a remote UI, and the
//! [`session_manager::SessionManager`], which owns exactly one browser
//! session per execution unit and guarantees teardown on both success and
//! failure paths. Everything else is glue: page objects and step definitions
//! drive the browser exclusively through the wait engine and the
//! [`interact::Interactor`], and the [`hooks::ScenarioHooks`] bracket every
//! scenario with capture-then-release teardown.
//!
//! ## Library Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use webharness::{Config, SessionManager};
//! use webharness::runner;
//!
//! # async fn example() -> Result<(), webharness::HarnessError> {
//! let config = Config::parse(r#"
//! browser = "chrome"
//! headless = true
//!
//! [home]
//! url = "https://www.saucedemo.com"
//! "#)?;
//!
//! let manager = Arc::new(SessionManager::new(config));
//! let reports = runner::run_all(manager, runner::login_feature()).await;
//! assert!(reports.iter().all(|r| !r.failed));
//! # Ok(())
//! # }
//! ```

/// Key-value configuration loading
pub mod config;

/// Per-scenario wiring of waits, interactions, and page objects
pub mod context;

/// Error taxonomy and exit codes
pub mod errors;

/// Scenario lifecycle hooks (setup, failure capture, teardown)
pub mod hooks;

/// Element interaction helper
pub mod interact;

/// Page objects
pub mod pages;

/// Scenario registration and execution
pub mod runner;

/// Failure screenshot capture and annotation
pub mod screenshot;

/// Browser session launch and termination
pub mod session;

/// One-session-per-unit registry
pub mod session_manager;

/// Login feature step definitions
pub mod steps;

/// Explicit-wait and synchronization engine
pub mod wait;

pub use config::Config;
pub use errors::HarnessError;
pub use hooks::{Scenario, ScenarioHooks};
pub use session::{BrowserType, Session};
pub use session_manager::SessionManager;
pub use wait::{Condition, ConditionOutcome, Target, Wait, WaitSpec};
