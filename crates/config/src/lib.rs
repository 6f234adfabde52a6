//! `opsguard-config` — layered configuration loading.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML file,
//! then `OPSGUARD_`-prefixed environment variables (`__` separates nesting,
//! e.g. `OPSGUARD_TELEMETRY__LOG_LEVEL=debug`).

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use opsguard_core::OperationsSecurityPolicy;
use opsguard_observability::LogFormat;

const ENV_PREFIX: &str = "OPSGUARD_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    Missing(PathBuf),

    #[error("failed to load config: {0}")]
    Load(#[source] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
        }
    }
}

/// Permission backend wiring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizationConfig {
    /// When `false`, no permission backend is wired and every operation is
    /// implicitly authorized.
    pub enabled: bool,

    /// JSON grant table for the static permission backend.
    pub grants_file: Option<PathBuf>,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            grants_file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub telemetry: TelemetryConfig,
    pub authorization: AuthorizationConfig,
    pub security: OperationsSecurityPolicy,
}

impl AppConfig {
    /// Load configuration from defaults, `file` (if given) and the environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        if let Some(file) = file {
            if !file.is_file() {
                return Err(ConfigError::Missing(file.to_path_buf()));
            }
            figment = figment.merge(Toml::file(file));
        }

        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_apply_without_sources() {
        Jail::expect_with(|_| {
            let config = AppConfig::load(None).map_err(|e| e.to_string())?;

            assert_eq!(config, AppConfig::default());
            assert!(config.authorization.enabled);
            assert_eq!(config.telemetry.log_format, LogFormat::Json);
            Ok(())
        });
    }

    #[test]
    fn file_then_environment_take_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "opsguard.toml",
                r#"
                    [telemetry]
                    log_level = "warn"

                    [authorization]
                    grants_file = "grants.json"

                    [security]
                    allow_unauthenticated_image_tagging_in_accounts = ["build"]
                "#,
            )?;
            jail.set_env("OPSGUARD_TELEMETRY__LOG_LEVEL", "debug");
            jail.set_env("OPSGUARD_AUTHORIZATION__ENABLED", "false");

            let config = AppConfig::load(Some(Path::new("opsguard.toml"))).map_err(|e| e.to_string())?;

            assert_eq!(config.telemetry.log_level, "debug");
            assert!(!config.authorization.enabled);
            assert_eq!(config.authorization.grants_file, Some(PathBuf::from("grants.json")));
            assert_eq!(
                config.security.allow_unauthenticated_image_tagging_in_accounts,
                vec!["build".to_string()]
            );
            Ok(())
        });
    }

    #[test]
    fn log_format_is_validated_at_load_time() {
        Jail::expect_with(|jail| {
            jail.set_env("OPSGUARD_TELEMETRY__LOG_FORMAT", "text");
            let config = AppConfig::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.telemetry.log_format, LogFormat::Pretty);

            jail.set_env("OPSGUARD_TELEMETRY__LOG_FORMAT", "xml");
            let err = AppConfig::load(None).unwrap_err();
            assert!(matches!(err, ConfigError::Load(_)));
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_an_error() {
        Jail::expect_with(|_| {
            let err = AppConfig::load(Some(Path::new("absent.toml"))).unwrap_err();
            assert!(matches!(err, ConfigError::Missing(_)));
            Ok(())
        });
    }
}
