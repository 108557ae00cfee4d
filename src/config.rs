//! Marshaller configuration.
//!
//! [`MarshallerConfig`] only controls what the marshaller writes to logs; it
//! never changes what crosses the boundary. Applications can load it from
//! `config/pgquery.toml` or environment variables using
//! `MarshallerConfig::load()`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const CONFIG_FILE: &str = "config/pgquery.toml";
const ENV_PREFIX: &str = "PGQUERY";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarshallerConfig {
    /// Include statement text in logs and spans.
    #[serde(default = "default_log_statements")]
    pub log_statements: bool,
    /// Maximum number of statement bytes to log.
    #[serde(default = "default_statement_log_limit")]
    pub statement_log_limit: usize,
    /// Include parameter values in logs. Off by default: parameters routinely carry
    /// credentials and personal data.
    #[serde(default)]
    pub log_params: bool,
}

fn default_log_statements() -> bool {
    true
}

fn default_statement_log_limit() -> usize {
    256
}

impl Default for MarshallerConfig {
    fn default() -> Self {
        Self {
            log_statements: default_log_statements(),
            statement_log_limit: default_statement_log_limit(),
            log_params: false,
        }
    }
}

impl MarshallerConfig {
    /// Load the `[marshaller]` section from `config/pgquery.toml`, overlaid by
    /// `PGQUERY__MARSHALLER__*` environment variables.
    ///
    /// A missing section yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if neither the file nor the environment can be read,
    /// or the section holds values of the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                // The file exists but is unreadable or malformed: fall back to env only.
                if std::path::Path::new(CONFIG_FILE).exists() {
                    log::warn!("failed to load {CONFIG_FILE}, falling back to env: {err}");
                }
                Config::builder()
                    .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {err}, then env-only error: {env_err}"
                        ))
                    })?
            }
        };

        Self::from_config(&settings)
    }

    /// Extract the `[marshaller]` section from an already built [`Config`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the section holds values of the wrong type.
    pub fn from_config(settings: &Config) -> Result<Self, ConfigError> {
        match settings.get::<MarshallerConfig>("marshaller") {
            Ok(cfg) => Ok(cfg),
            Err(ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(ConfigError::Message(format!(
                "Marshaller configuration could not be loaded from file or environment: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<MarshallerConfig, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        MarshallerConfig::from_config(&settings)
    }

    #[test]
    fn test_defaults() {
        let cfg = MarshallerConfig::default();
        assert!(cfg.log_statements);
        assert_eq!(cfg.statement_log_limit, 256);
        assert!(!cfg.log_params);
    }

    #[test]
    fn test_missing_section_gives_defaults() {
        let cfg = from_toml("[other]\nkey = 1\n").unwrap();
        assert_eq!(cfg, MarshallerConfig::default());
    }

    #[test]
    fn test_partial_section_fills_defaults() {
        let cfg = from_toml("[marshaller]\nlog_params = true\n").unwrap();
        assert!(cfg.log_params);
        assert!(cfg.log_statements);
        assert_eq!(cfg.statement_log_limit, 256);
    }

    #[test]
    fn test_wrong_type_is_an_error() {
        let err = from_toml("[marshaller]\nstatement_log_limit = \"lots\"\n").unwrap_err();
        assert!(err.to_string().contains("Marshaller configuration"));
    }
}
