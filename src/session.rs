use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::HarnessError;

/// Supported browser engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BrowserType {
    /// Google Chrome/Chromium
    Chrome,
    /// Microsoft Edge
    Edge,
}

impl std::str::FromStr for BrowserType {
    type Err = HarnessError;

    /// Parse browser type from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self, HarnessError> {
        match s.to_lowercase().as_str() {
            "chrome" | "chromium" => Ok(BrowserType::Chrome),
            "edge" => Ok(BrowserType::Edge),
            _ => Err(HarnessError::Config(format!("Unsupported browser: {}", s))),
        }
    }
}

impl BrowserType {
    /// Default WebDriver endpoint for this engine. Edge sits on a different
    /// port so chromedriver and msedgedriver can run side by side.
    pub fn default_webdriver_url(&self) -> &'static str {
        match self {
            BrowserType::Chrome => "http://localhost:9515",
            BrowserType::Edge => "http://localhost:17556",
        }
    }

    fn driver_name(&self) -> &'static str {
        match self {
            BrowserType::Chrome => "chromedriver",
            BrowserType::Edge => "msedgedriver",
        }
    }

    fn options_key(&self) -> &'static str {
        match self {
            BrowserType::Chrome => "goog:chromeOptions",
            BrowserType::Edge => "ms:edgeOptions",
        }
    }
}

/// One live browser-automation connection, owned exclusively by the execution
/// unit that created it.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    browser: BrowserType,
    client: Client,
    alive: AtomicBool,
}

impl Session {
    /// Create a new session from configuration.
    ///
    /// Construction failures (unsupported engine, dead WebDriver endpoint,
    /// session negotiation failure) are fatal and never retried.
    pub async fn launch(config: &Config) -> Result<Self, HarnessError> {
        let browser = config.browser()?;
        let headless = config.headless()?;
        let webdriver_url = config
            .webdriver_url()
            .unwrap_or_else(|| browser.default_webdriver_url().to_string());

        info!("Launching {:?} session (headless={})", browser, headless);

        if !Self::is_webdriver_running(&webdriver_url).await {
            return Err(HarnessError::Driver(format!(
                "Cannot connect to {} WebDriver at {}.\n\
                Please ensure {} is running:\n\
                  For Chrome: chromedriver --port=9515\n\
                  For Edge: msedgedriver --port=17556",
                browser.driver_name(),
                webdriver_url,
                browser.driver_name()
            )));
        }

        // Chromium engines are strict about profile directory reuse; give
        // every session its own user-data directory.
        let profile_dir = tempfile::Builder::new()
            .prefix("webharness-")
            .tempdir()
            .map_err(|e| {
                HarnessError::Driver(format!("Could not create profile directory: {}", e))
            })?;
        #[allow(deprecated)]
        let profile_path = profile_dir.into_path();

        let mut args = vec!["--no-sandbox".to_string()];
        if headless {
            args.push("--headless=new".to_string());
            args.push("--disable-gpu".to_string());
            args.push("--disable-dev-shm-usage".to_string());
        }
        args.push(format!("--user-data-dir={}", profile_path.display()));

        let mut engine_opts = serde_json::Map::new();
        engine_opts.insert("args".to_string(), json!(args));
        let mut caps = serde_json::Map::new();
        caps.insert(browser.options_key().to_string(), json!(engine_opts));

        debug!("Connecting to WebDriver at {}", webdriver_url);

        let client = ClientBuilder::rustls()
            .capabilities(caps)
            .connect(&webdriver_url)
            .await
            .map_err(|e| {
                HarnessError::Driver(format!("Failed to create WebDriver session: {}", e))
            })?;

        if let Some((width, height)) = config.viewport()? {
            debug!("Setting window size to {}x{}", width, height);
            if let Err(e) = client.set_window_size(width, height).await {
                // Window sizing is best-effort
                debug!("Could not set window size: {}", e);
            }
        }

        let session = Session {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            browser,
            client,
            alive: AtomicBool::new(true),
        };
        info!("Session {} ready", session.id);
        Ok(session)
    }

    async fn is_webdriver_running(url: &str) -> bool {
        let status_url = format!("{}/status", url);

        match reqwest::get(&status_url).await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn browser(&self) -> BrowserType {
        self.browser
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Handle to the underlying WebDriver client. The `Wait` engine and
    /// `Interactor` are the intended consumers; page objects and steps never
    /// touch this directly.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Terminate the browser session. Runs at most once; repeat calls are
    /// no-ops.
    pub async fn quit(&self) -> Result<(), HarnessError> {
        if !self.alive.swap(false, Ordering::SeqCst) {
            debug!("Session {} already terminated", self.id);
            return Ok(());
        }
        info!("Quitting session {}", self.id);
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| HarnessError::Driver(format!("Failed to quit session {}: {}", self.id, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_type_parses_case_insensitively() {
        assert_eq!("chrome".parse::<BrowserType>().unwrap(), BrowserType::Chrome);
        assert_eq!("Chrome".parse::<BrowserType>().unwrap(), BrowserType::Chrome);
        assert_eq!("chromium".parse::<BrowserType>().unwrap(), BrowserType::Chrome);
        assert_eq!("EDGE".parse::<BrowserType>().unwrap(), BrowserType::Edge);
    }

    #[test]
    fn unsupported_browser_is_a_config_error() {
        let err = "netscape".parse::<BrowserType>().unwrap_err();
        assert!(matches!(err, HarnessError::Config(_)));
        assert!(err.to_string().contains("netscape"));
    }

    #[test]
    fn engines_have_distinct_default_endpoints() {
        assert_ne!(
            BrowserType::Chrome.default_webdriver_url(),
            BrowserType::Edge.default_webdriver_url()
        );
    }

    #[tokio::test]
    async fn dead_endpoint_is_not_running() {
        assert!(!Session::is_webdriver_running("http://127.0.0.1:1").await);
    }
}
