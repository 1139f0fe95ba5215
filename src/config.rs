use std::path::Path;

use toml::Value;

use crate::errors::HarnessError;
use crate::session::BrowserType;

/// Key-value configuration backed by a TOML file. Nested tables are addressed
/// with dotted keys (`home.url`). A missing key is a fatal configuration
/// error, surfaced before any session work starts.
#[derive(Debug, Clone)]
pub struct Config {
    values: Value,
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self, HarnessError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::Config(format!("cannot read config file {}: {}", path.display(), e))
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, HarnessError> {
        let values = raw
            .parse::<Value>()
            .map_err(|e| HarnessError::Config(format!("invalid config file: {}", e)))?;
        Ok(Config { values })
    }

    /// Look up a key, rendering scalar values as strings.
    pub fn get(&self, key: &str) -> Result<String, HarnessError> {
        let mut current = &self.values;
        for part in key.split('.') {
            current = current
                .get(part)
                .ok_or_else(|| HarnessError::Config(format!("config key '{}' not found", key)))?;
        }
        match current {
            Value::String(s) => Ok(s.clone()),
            Value::Boolean(b) => Ok(b.to_string()),
            Value::Integer(i) => Ok(i.to_string()),
            Value::Float(f) => Ok(f.to_string()),
            _ => Err(HarnessError::Config(format!(
                "config key '{}' is not a scalar value",
                key
            ))),
        }
    }

    pub fn get_opt(&self, key: &str) -> Option<String> {
        self.get(key).ok()
    }

    /// Browser engine to drive. Unsupported names are fatal.
    pub fn browser(&self) -> Result<BrowserType, HarnessError> {
        self.get("browser")?.parse()
    }

    pub fn headless(&self) -> Result<bool, HarnessError> {
        let raw = self.get("headless")?;
        match raw.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(HarnessError::Config(format!(
                "config key 'headless' must be true or false, got '{}'",
                other
            ))),
        }
    }

    /// Override the headless setting, used by the CLI's `--headed` flag.
    pub fn set_headless(&mut self, headless: bool) {
        if let Some(table) = self.values.as_table_mut() {
            table.insert("headless".to_string(), Value::Boolean(headless));
        }
    }

    pub fn home_url(&self) -> Result<String, HarnessError> {
        self.get("home.url")
    }

    /// Explicit WebDriver endpoint, overriding the engine default.
    pub fn webdriver_url(&self) -> Option<String> {
        self.get_opt("webdriver.url")
    }

    /// Optional window size as WIDTHxHEIGHT, e.g. 1920x1080.
    pub fn viewport(&self) -> Result<Option<(u32, u32)>, HarnessError> {
        let raw = match self.get_opt("viewport") {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let mut parts = raw.split('x');
        let parsed = match (parts.next(), parts.next(), parts.next()) {
            (Some(w), Some(h), None) => w.parse::<u32>().ok().zip(h.parse::<u32>().ok()),
            _ => None,
        };
        match parsed {
            Some(size) => Ok(Some(size)),
            None => Err(HarnessError::Config(format!(
                "config key 'viewport' must be WIDTHxHEIGHT, got '{}'",
                raw
            ))),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
