//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `opsflow.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::str::FromStr;

use chrono::FixedOffset;
use serde::Deserialize;

use opsflow_domain::id::UserId;
use opsflow_domain::record::InactivityConfig;

/// Largest display offset accepted, in minutes (UTC+14).
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Trigger resolution tuning.
    pub automation: AutomationConfig,
    /// The user every request runs as.
    pub identity: IdentityConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Trigger resolution settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    /// Days without activity before a client counts as inactive.
    pub inactivity_days_threshold: u32,
    /// Raise the "no recent communication" signal.
    pub check_communications: bool,
    /// Raise the "no recent project work" signal.
    pub check_project_work: bool,
    /// How far ahead meeting reminders look, in days.
    pub meeting_window_days: u32,
    /// Offset applied to dates and times shown in candidate labels.
    pub display_utc_offset_minutes: i32,
}

/// Single-user identity.
///
/// Without a `user_id` every request is unauthenticated.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub user_id: Option<String>,
    pub email: Option<String>,
}

impl Config {
    /// Load configuration from `opsflow.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("opsflow.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("OPSFLOW_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("OPSFLOW_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("OPSFLOW_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("OPSFLOW_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("OPSFLOW_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("OPSFLOW_USER_ID") {
            self.identity.user_id = Some(val);
        }
        if let Ok(val) = std::env::var("OPSFLOW_USER_EMAIL") {
            self.identity.email = Some(val);
        }
        if let Ok(val) = std::env::var("OPSFLOW_INACTIVITY_DAYS")
            && let Ok(days) = val.parse()
        {
            self.automation.inactivity_days_threshold = days;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.automation.inactivity_days_threshold == 0 {
            return Err(ConfigError::Validation(
                "inactivity_days_threshold must be positive".to_string(),
            ));
        }
        if self.automation.meeting_window_days == 0 {
            return Err(ConfigError::Validation(
                "meeting_window_days must be positive".to_string(),
            ));
        }
        self.automation.display_offset()?;
        self.identity.user_id()?;
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl AutomationConfig {
    /// Inactivity thresholds handed to the detector.
    #[must_use]
    pub fn inactivity(&self) -> InactivityConfig {
        InactivityConfig {
            days_threshold: self.inactivity_days_threshold,
            check_communications: self.check_communications,
            check_project_work: self.check_project_work,
        }
    }

    /// The display offset as a [`FixedOffset`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when the offset is beyond ±14h.
    pub fn display_offset(&self) -> Result<FixedOffset, ConfigError> {
        let minutes = self.display_utc_offset_minutes;
        if minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ConfigError::Validation(format!(
                "display_utc_offset_minutes must be within ±{MAX_OFFSET_MINUTES}, got {minutes}"
            )));
        }
        FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            ConfigError::Validation(format!("invalid display offset: {minutes} minutes"))
        })
    }
}

impl IdentityConfig {
    /// The configured user id, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when `user_id` is not a UUID.
    pub fn user_id(&self) -> Result<Option<UserId>, ConfigError> {
        self.user_id
            .as_deref()
            .map(|raw| {
                UserId::from_str(raw).map_err(|err| {
                    ConfigError::Validation(format!("user_id {raw:?} is not a UUID: {err}"))
                })
            })
            .transpose()
    }

    /// The configured email, or a local placeholder.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or("owner@localhost")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:opsflow.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "opsflowd=info,opsflow=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for AutomationConfig {
    fn default() -> Self {
        let inactivity = InactivityConfig::default();
        Self {
            inactivity_days_threshold: inactivity.days_threshold,
            check_communications: inactivity.check_communications,
            check_project_work: inactivity.check_project_work,
            meeting_window_days: opsflow_app::trigger_resolver::DEFAULT_MEETING_WINDOW_DAYS,
            display_utc_offset_minutes: 0,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.url, "sqlite:opsflow.db?mode=rwc");
        assert_eq!(config.automation.inactivity_days_threshold, 30);
        assert_eq!(config.automation.meeting_window_days, 30);
        assert!(config.identity.user_id.is_none());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [database]
            url = 'sqlite:test.db'

            [logging]
            filter = 'debug'

            [automation]
            inactivity_days_threshold = 45
            check_communications = false
            check_project_work = true
            meeting_window_days = 7
            display_utc_offset_minutes = 120

            [identity]
            user_id = '6f1c1d2e-8a4b-4c1e-9f7a-2b3c4d5e6f70'
            email = 'me@example.com'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.url, "sqlite:test.db");
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(
            config.automation.inactivity(),
            InactivityConfig {
                days_threshold: 45,
                check_communications: false,
                check_project_work: true,
            }
        );
        assert_eq!(config.automation.meeting_window_days, 7);
        assert_eq!(
            config.automation.display_offset().unwrap(),
            FixedOffset::east_opt(7200).unwrap()
        );
        assert!(config.identity.user_id().unwrap().is_some());
        assert_eq!(config.identity.email(), "me@example.com");
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_thresholds() {
        let mut config = Config::default();
        config.automation.inactivity_days_threshold = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.automation.meeting_window_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_offset_beyond_fourteen_hours() {
        let mut config = Config::default();
        config.automation.display_utc_offset_minutes = -14 * 60;
        assert!(config.validate().is_ok());
        config.automation.display_utc_offset_minutes = 15 * 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_user_id_that_is_not_a_uuid() {
        let mut config = Config::default();
        config.identity.user_id = Some("alice".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_fall_back_to_placeholder_email() {
        assert_eq!(IdentityConfig::default().email(), "owner@localhost");
    }

    #[test]
    fn should_format_custom_bind_addr() {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 9090;
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [automation]
            meeting_window_days = 14
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.automation.meeting_window_days, 14);
        assert_eq!(config.automation.inactivity_days_threshold, 30);
        assert!(config.automation.check_communications);
        assert_eq!(config.database_url(), "sqlite:opsflow.db?mode=rwc");
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
