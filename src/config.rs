use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants;
use crate::error::{PulseError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub snapshot: SnapshotConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub limit: u32,
    pub timeout_seconds: u64,
    pub demographic_resource: String,
    pub enrolment_resource: String,
    pub biometric_resource: String,
    pub api_key: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            limit: constants::DEFAULT_FETCH_LIMIT,
            timeout_seconds: constants::DEFAULT_TIMEOUT_SECONDS,
            demographic_resource: constants::DEMOGRAPHIC_RESOURCE.to_string(),
            enrolment_resource: constants::ENROLMENT_RESOURCE.to_string(),
            biometric_resource: constants::BIOMETRIC_RESOURCE.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub path: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(constants::DEFAULT_SNAPSHOT_PATH),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(constants::DEFAULT_LOG_DIR),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or from `pulse.toml` when no path is given.
    ///
    /// A missing default file falls back to built-in defaults; a missing file that
    /// was asked for explicitly is an error. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(constants::DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    debug!("No {} found, using default configuration", constants::DEFAULT_CONFIG_PATH);
                    Self::default()
                }
            }
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            PulseError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        Self::from_toml_str(&config_content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(key) = env_override("DATA_GOV_API_KEY")? {
            self.source.api_key = Some(key);
        }
        if let Some(path) = env_override("PULSE_SNAPSHOT_PATH")? {
            self.snapshot.path = PathBuf::from(path);
        }
        Ok(())
    }

    /// The API key is required only by the fetch collaborator.
    pub fn require_api_key(&self) -> Result<&str> {
        self.source
            .api_key
            .as_deref()
            .ok_or_else(|| PulseError::Config("DATA_GOV_API_KEY is not set".to_string()))
    }
}

/// Reads a trimmed, non-blank environment value; unset is `None`, non-UTF-8 is an error
fn env_override(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(value) => {
            let value = value.trim();
            Ok((!value.is_empty()).then(|| value.to_string()))
        }
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(PulseError::Env(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.source.limit, 2000);
        assert_eq!(config.source.base_url, "https://api.data.gov.in/resource");
        assert_eq!(config.snapshot.path, PathBuf::from("public/data.json"));
        assert!(config.source.api_key.is_none());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [source]
            limit = 500

            [snapshot]
            path = "data/snapshot.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.source.limit, 500);
        assert_eq!(config.source.timeout_seconds, 30);
        assert_eq!(config.source.enrolment_resource, constants::ENROLMENT_RESOURCE);
        assert_eq!(config.snapshot.path, PathBuf::from("data/snapshot.json"));
        assert_eq!(config.logging.dir, PathBuf::from("logs"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let result = Config::from_toml_str("[source]\nlimit = \"many\"");
        assert!(matches!(result, Err(PulseError::Toml(_))));
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let result = Config::from_file(Path::new("/definitely/not/here/pulse.toml"));
        assert!(matches!(result, Err(PulseError::Config(_))));
    }

    #[test]
    fn test_env_override_values() {
        std::env::set_var("PULSE_TEST_OVERRIDE_SET", "  key-123 ");
        std::env::set_var("PULSE_TEST_OVERRIDE_BLANK", "   ");

        assert_eq!(env_override("PULSE_TEST_OVERRIDE_SET").unwrap().as_deref(), Some("key-123"));
        assert_eq!(env_override("PULSE_TEST_OVERRIDE_BLANK").unwrap(), None);
        assert_eq!(env_override("PULSE_TEST_OVERRIDE_UNSET").unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_env_value_is_env_error() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        std::env::set_var("PULSE_TEST_OVERRIDE_BYTES", OsStr::from_bytes(&[0x66, 0xff, 0x6f]));
        assert!(matches!(
            env_override("PULSE_TEST_OVERRIDE_BYTES"),
            Err(PulseError::Env(std::env::VarError::NotUnicode(_)))
        ));
    }

    #[test]
    fn test_require_api_key() {
        let mut config = Config::default();
        assert!(config.require_api_key().is_err());

        config.source.api_key = Some("abc".to_string());
        assert_eq!(config.require_api_key().unwrap(), "abc");
    }
}
