//! Widget configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `APP_URL` - Base URL of the cart store service
//!
//! ## Optional
//! - `SAVED_CART_RESET_DELAY_MS` - How long the saved/failed banner stays up (default: 4000)

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// How long the result banner is shown before the form comes back.
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(4);

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Checkout widget configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Base URL of the cart store service, always ending in `/`
    pub app_url: Url,
    /// Delay before a saved/failed banner resets
    pub reset_delay: Duration,
}

impl WidgetConfig {
    /// Configuration for the service at `app_url` with the default delay.
    #[must_use]
    pub fn new(mut app_url: Url) -> Self {
        // `Url::join` replaces the last segment unless the path ends in `/`.
        if !app_url.path().ends_with('/') {
            let path = format!("{}/", app_url.path());
            app_url.set_path(&path);
        }
        Self {
            app_url,
            reset_delay: DEFAULT_RESET_DELAY,
        }
    }

    #[must_use]
    pub const fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `APP_URL` is missing or either variable is
    /// malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let raw = std::env::var("APP_URL")
            .map_err(|_| ConfigError::MissingEnvVar("APP_URL".to_string()))?;
        let app_url = Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar("APP_URL".to_string(), e.to_string()))?;

        let config = Self::new(app_url);
        match std::env::var("SAVED_CART_RESET_DELAY_MS") {
            Ok(ms) => {
                let ms = ms.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar("SAVED_CART_RESET_DELAY_MS".to_string(), e.to_string())
                })?;
                Ok(config.with_reset_delay(Duration::from_millis(ms)))
            }
            Err(_) => Ok(config),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delay_is_four_seconds() {
        let config = WidgetConfig::new(Url::parse("https://app.example.com").unwrap());
        assert_eq!(config.reset_delay, Duration::from_millis(4000));
    }

    #[test]
    fn test_app_url_gets_trailing_slash() {
        let config = WidgetConfig::new(Url::parse("https://app.example.com/proxy").unwrap());
        assert_eq!(config.app_url.as_str(), "https://app.example.com/proxy/");
        assert_eq!(
            config.app_url.join("api/getCart").unwrap().as_str(),
            "https://app.example.com/proxy/api/getCart"
        );
    }

    #[test]
    fn test_with_reset_delay() {
        let config = WidgetConfig::new(Url::parse("https://app.example.com/").unwrap())
            .with_reset_delay(Duration::from_millis(10));
        assert_eq!(config.reset_delay, Duration::from_millis(10));
        assert_eq!(config.app_url.as_str(), "https://app.example.com/");
    }
}
