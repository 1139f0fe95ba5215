use std::fmt;
use std::time::Duration;

use fantoccini::error::CmdError;

/// Custom error type that includes exit codes
#[derive(Debug)]
pub enum HarnessError {
    /// Missing or unsupported configuration (exit code 2)
    Config(String),
    /// WebDriver endpoint unreachable or session launch failed (exit code 4)
    Driver(String),
    /// An explicit wait expired before its condition held (exit code 5)
    Timeout {
        condition: String,
        waited: Duration,
    },
    /// Generic error (exit code 1)
    Other(anyhow::Error),
}

impl HarnessError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            HarnessError::Config(_) => 2,
            HarnessError::Driver(_) => 4,
            HarnessError::Timeout { .. } => 5,
            HarnessError::Other(_) => 1,
        }
    }
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarnessError::Config(msg) => write!(f, "Configuration error: {}", msg),
            HarnessError::Driver(msg) => write!(f, "WebDriver error: {}", msg),
            HarnessError::Timeout { condition, waited } => {
                write!(f, "Timed out after {:?} waiting for {}", waited, condition)
            }
            HarnessError::Other(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HarnessError::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for HarnessError {
    fn from(err: anyhow::Error) -> Self {
        // Detect the error class from the message; timeouts and transient
        // errors are constructed directly and never travel this path.
        let msg = err.to_string();

        if msg.contains("config") || msg.contains("Configuration") {
            HarnessError::Config(msg)
        } else if msg.contains("WebDriver")
            || msg.contains("chromedriver")
            || msg.contains("msedgedriver")
        {
            HarnessError::Driver(msg)
        } else {
            HarnessError::Other(err)
        }
    }
}

impl From<CmdError> for HarnessError {
    fn from(err: CmdError) -> Self {
        HarnessError::Driver(err.to_string())
    }
}

/// Whether a driver error is a transient interaction hiccup the poller should
/// swallow and retry: stale references, elements not yet attached, and script
/// evaluation errors. Everything else is fatal.
pub fn is_transient(err: &CmdError) -> bool {
    err.is_miss() || is_transient_message(&err.to_string())
}

pub(crate) fn is_transient_message(msg: &str) -> bool {
    let msg = msg.to_ascii_lowercase();
    msg.contains("stale element")
        || msg.contains("no such element")
        || msg.contains("javascript error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_the_error_class() {
        assert_eq!(HarnessError::Config("x".to_string()).exit_code(), 2);
        assert_eq!(HarnessError::Driver("x".to_string()).exit_code(), 4);
        let timeout = HarnessError::Timeout {
            condition: "x".to_string(),
            waited: Duration::from_secs(15),
        };
        assert_eq!(timeout.exit_code(), 5);
        assert_eq!(
            HarnessError::Other(anyhow::anyhow!("boom")).exit_code(),
            1
        );
    }

    #[test]
    fn transient_messages_are_recognized() {
        assert!(is_transient_message(
            "stale element reference: element is not attached to the page document"
        ));
        assert!(is_transient_message("no such element: #user-name"));
        assert!(is_transient_message("javascript error: foo is not defined"));
        assert!(!is_transient_message("invalid session id"));
        assert!(!is_transient_message("element click intercepted"));
    }

    #[test]
    fn anyhow_conversion_classifies_by_message() {
        let err = HarnessError::from(anyhow::anyhow!("config key 'browser' not found"));
        assert!(matches!(err, HarnessError::Config(_)));

        let err = HarnessError::from(anyhow::anyhow!("chromedriver is not running"));
        assert!(matches!(err, HarnessError::Driver(_)));

        let err = HarnessError::from(anyhow::anyhow!("something else"));
        assert!(matches!(err, HarnessError::Other(_)));
    }
}
