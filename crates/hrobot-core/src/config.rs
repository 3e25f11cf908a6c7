//! Connection settings for the Robot web service.
//!
//! The three provider-level settings (username, password, base URL) each fall
//! back to an environment variable when not configured explicitly.

use crate::Error;
use secrecy::{ExposeSecret, SecretString};
use url::Url;
use validator::Validate;

/// Environment variable supplying the default web service username.
pub const USERNAME_ENV: &str = "HETZNERROBOT_USERNAME";

/// Environment variable supplying the default web service password.
pub const PASSWORD_ENV: &str = "HETZNERROBOT_PASSWORD";

/// Environment variable supplying the default base URL.
pub const URL_ENV: &str = "HETZNERROBOT_URL";

/// Base URL used when neither configuration nor environment provide one.
pub const DEFAULT_URL: &str = "https://robot-ws.your-server.de";

/// Credentials and endpoint for a Robot client instance.
#[derive(Debug, Validate)]
pub struct RobotConfig {
    /// Web service username
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,

    /// Web service password
    pub password: SecretString,

    /// Base URL of the web service
    #[validate(url(message = "url must be an absolute URL"))]
    pub url: String,
}

impl RobotConfig {
    /// Create a configuration from explicit values.
    ///
    /// # Errors
    ///
    /// Returns an error if the username or password is empty or the URL is invalid.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<Self, Error> {
        let password: String = password.into();
        if password.is_empty() {
            return Err(Error::ConfigError("password must not be empty".to_string()));
        }

        let config = Self {
            username: username.into(),
            password: SecretString::from(password),
            url: url.into(),
        };

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Resolve every setting from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a credential is missing or the URL is invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve every setting through `lookup`, falling back to [`DEFAULT_URL`].
    ///
    /// # Errors
    ///
    /// Returns an error if a credential is missing or the URL is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = lookup(USERNAME_ENV)
            .ok_or_else(|| Error::ConfigError(format!("{USERNAME_ENV} is not set")))?;
        let password = lookup(PASSWORD_ENV)
            .ok_or_else(|| Error::ConfigError(format!("{PASSWORD_ENV} is not set")))?;
        let url = lookup(URL_ENV).unwrap_or_else(|| DEFAULT_URL.to_string());

        Self::new(username, password, url)
    }

    /// Expose the password for building the Authorization header.
    #[must_use]
    pub fn expose_password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Parse and validate the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_url(&self) -> Result<Url, Error> {
        Url::parse(&self.url).map_err(|e| Error::ConfigError(format!("Invalid Robot URL: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_robot_config_new() {
        let config = RobotConfig::new("robot-user", "secret", "https://robot.example.com").unwrap();
        assert_eq!(config.username, "robot-user");
        assert_eq!(config.expose_password(), "secret");
        assert_eq!(config.url, "https://robot.example.com");
    }

    #[test]
    fn test_robot_config_invalid_url() {
        let err = RobotConfig::new("robot-user", "secret", "not-a-url").unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_robot_config_empty_credentials() {
        assert!(RobotConfig::new("", "secret", DEFAULT_URL).is_err());
        assert!(RobotConfig::new("robot-user", "", DEFAULT_URL).is_err());
    }

    #[test]
    fn test_password_is_redacted_in_debug() {
        let config = RobotConfig::new("robot-user", "hunter2", DEFAULT_URL).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("robot-user"));
    }

    #[test]
    fn test_from_lookup_uses_default_url() {
        let config = RobotConfig::from_lookup(lookup_from(&[
            (USERNAME_ENV, "robot-user"),
            (PASSWORD_ENV, "secret"),
        ]))
        .unwrap();
        assert_eq!(config.url, DEFAULT_URL);
    }

    #[test]
    fn test_from_lookup_overrides_url() {
        let config = RobotConfig::from_lookup(lookup_from(&[
            (USERNAME_ENV, "robot-user"),
            (PASSWORD_ENV, "secret"),
            (URL_ENV, "http://localhost:8080"),
        ]))
        .unwrap();
        let url = config.parse_url().unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.port(), Some(8080));
    }

    #[test]
    fn test_from_lookup_missing_password() {
        let err =
            RobotConfig::from_lookup(lookup_from(&[(USERNAME_ENV, "robot-user")])).unwrap_err();
        assert_eq!(
            err,
            Error::ConfigError(format!("{PASSWORD_ENV} is not set"))
        );
    }
}
