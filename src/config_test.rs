#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::errors::HarnessError;
    use crate::session::BrowserType;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
browser = "chrome"
headless = true
viewport = "1920x1080"

[home]
url = "https://www.saucedemo.com"

[webdriver]
url = "http://localhost:9515"
"#;

    #[test]
    fn dotted_keys_traverse_tables() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.get("browser").unwrap(), "chrome");
        assert_eq!(config.get("home.url").unwrap(), "https://www.saucedemo.com");
        assert_eq!(config.get("webdriver.url").unwrap(), "http://localhost:9515");
    }

    #[test]
    fn missing_keys_are_fatal_and_name_the_key() {
        let config = Config::parse(SAMPLE).unwrap();
        let err = config.get("home.missing").unwrap_err();
        assert!(matches!(err, HarnessError::Config(_)));
        assert!(err.to_string().contains("home.missing"));
    }

    #[test]
    fn typed_accessors() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.browser().unwrap(), BrowserType::Chrome);
        assert!(config.headless().unwrap());
        assert_eq!(config.home_url().unwrap(), "https://www.saucedemo.com");
        assert_eq!(
            config.webdriver_url(),
            Some("http://localhost:9515".to_string())
        );
        assert_eq!(config.viewport().unwrap(), Some((1920, 1080)));
    }

    #[test]
    fn headless_accepts_boolean_and_string_forms() {
        let config = Config::parse("headless = true").unwrap();
        assert!(config.headless().unwrap());

        let config = Config::parse(r#"headless = "false""#).unwrap();
        assert!(!config.headless().unwrap());

        let config = Config::parse(r#"headless = "maybe""#).unwrap();
        assert!(matches!(
            config.headless().unwrap_err(),
            HarnessError::Config(_)
        ));
    }

    #[test]
    fn headless_override_wins_over_the_file_value() {
        let mut config = Config::parse("headless = true").unwrap();
        config.set_headless(false);
        assert!(!config.headless().unwrap());
    }

    #[test]
    fn unsupported_browser_is_a_config_error() {
        let config = Config::parse(r#"browser = "safari""#).unwrap();
        let err = config.browser().unwrap_err();
        assert!(matches!(err, HarnessError::Config(_)));
    }

    #[test]
    fn optional_keys_default_to_absent() {
        let config = Config::parse(r#"browser = "edge""#).unwrap();
        assert_eq!(config.webdriver_url(), None);
        assert_eq!(config.viewport().unwrap(), None);
    }

    #[test]
    fn malformed_viewport_is_rejected() {
        for raw in ["1920", "1920x", "x1080", "axb", "1920X1080"] {
            let config = Config::parse(&format!(r#"viewport = "{}""#, raw)).unwrap();
            assert!(
                config.viewport().is_err(),
                "viewport '{}' should be rejected",
                raw
            );
        }
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        assert!(matches!(
            Config::parse("browser = ").unwrap_err(),
            HarnessError::Config(_)
        ));
    }
}
