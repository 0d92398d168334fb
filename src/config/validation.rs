use crate::config::types::{
    BrowserConfig, CaptureConfig, Config, ConsentConfig, OutputConfig, TargetConfig,
};
use crate::ConfigError;
use url::Url;

/// Largest number of listing pages a run will walk
const MAX_LISTING_PAGES: u32 = 500;

/// Largest scroll-round cap accepted
const MAX_SCROLL_ITERATIONS: u32 = 1_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_target_config(&config.target)?;
    validate_browser_config(&config.browser)?;
    validate_capture_config(&config.capture)?;
    validate_consent_config(&config.consent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_target_config(config: &TargetConfig) -> Result<(), ConfigError> {
    validate_account(&config.account)?;

    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use HTTP or HTTPS",
            config.base_url
        )));
    }

    if config.pages < 1 || config.pages > MAX_LISTING_PAGES {
        return Err(ConfigError::Validation(format!(
            "pages must be between 1 and {}, got {}",
            MAX_LISTING_PAGES, config.pages
        )));
    }

    if config.detail_pattern().trim().is_empty() {
        return Err(ConfigError::Validation(
            "detail-pattern cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Account names end up in URL paths: non-empty, alphanumeric, `_` and `-`
fn validate_account(account: &str) -> Result<(), ConfigError> {
    if account.is_empty() {
        return Err(ConfigError::Validation(
            "account cannot be empty".to_string(),
        ));
    }

    if !account
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "account must contain only letters, digits, '_' and '-', got '{}'",
            account
        )));
    }

    Ok(())
}

fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.navigation_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "navigation-timeout-ms must be > 0".to_string(),
        ));
    }

    if config.idle_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "idle-timeout-ms must be > 0".to_string(),
        ));
    }

    if config.window_width == 0 || config.window_height == 0 {
        return Err(ConfigError::Validation(format!(
            "window size must be non-zero, got {}x{}",
            config.window_width, config.window_height
        )));
    }

    Ok(())
}

fn validate_capture_config(config: &CaptureConfig) -> Result<(), ConfigError> {
    if config.max_scroll_iterations < 1 || config.max_scroll_iterations > MAX_SCROLL_ITERATIONS {
        return Err(ConfigError::Validation(format!(
            "max-scroll-iterations must be between 1 and {}, got {}",
            MAX_SCROLL_ITERATIONS, config.max_scroll_iterations
        )));
    }

    Ok(())
}

fn validate_consent_config(config: &ConsentConfig) -> Result<(), ConfigError> {
    validate_selector("overlay-selector", &config.overlay_selector)?;
    validate_selector("decline-selector", &config.decline_selector)?;
    validate_selector("decline-selector", &config.decline_control_selector())?;

    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "consent timeout-ms must be > 0".to_string(),
        ));
    }

    if config.poll_ms == 0 {
        return Err(ConfigError::Validation(
            "consent poll-ms must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Checks a CSS selector is non-empty and parses as a selector list
fn validate_selector(name: &str, selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector(format!(
            "{} cannot be empty",
            name
        )));
    }

    scraper::Selector::parse(selector).map_err(|e| {
        ConfigError::InvalidSelector(format!("{} '{}': {:?}", name, selector, e))
    })?;

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output root cannot be empty".to_string(),
        ));
    }

    if config.extension.is_empty() || config.extension.contains(&['/', '\\', '.'][..]) {
        return Err(ConfigError::Validation(format!(
            "output extension must be a bare extension like 'html', got '{}'",
            config.extension
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_account() {
        assert!(validate_account("alice").is_ok());
        assert!(validate_account("film_buff-99").is_ok());

        assert!(validate_account("").is_err());
        assert!(validate_account("al ice").is_err());
        assert!(validate_account("alice/../bob").is_err());
    }

    #[test]
    fn test_pages_bounds() {
        let mut config = Config::default();
        config.target.pages = 0;
        assert!(validate(&config).is_err());

        config.target.pages = MAX_LISTING_PAGES + 1;
        assert!(validate(&config).is_err());

        config.target.pages = 1;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_base_url_must_be_http() {
        let mut config = Config::default();
        config.target.base_url = "ftp://example.test".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));

        config.target.base_url = "not a url".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_scroll_iterations_bounds() {
        let mut config = Config::default();
        config.capture.max_scroll_iterations = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_selector() {
        assert!(validate_selector("overlay", ".fc-consent-root").is_ok());
        assert!(validate_selector("overlay", "#cmp button.reject").is_ok());

        assert!(validate_selector("overlay", "").is_err());
        assert!(validate_selector("overlay", "   ").is_err());
        assert!(validate_selector("overlay", "div[").is_err());
    }

    #[test]
    fn test_decline_control_selector_is_scoped() {
        let config = ConsentConfig::default();
        assert_eq!(
            config.decline_control_selector(),
            ".fc-consent-root .fc-cta-do-not-consent"
        );
    }

    #[test]
    fn test_output_extension() {
        let mut config = Config::default();
        config.output.extension = ".html".to_string();
        assert!(validate(&config).is_err());

        config.output.extension = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_detail_pattern_rejected() {
        let mut config = Config::default();
        config.target.detail_pattern = Some(" ".to_string());
        assert!(validate(&config).is_err());
    }
}
