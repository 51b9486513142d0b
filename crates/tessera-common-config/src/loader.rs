//! Configuration file loading and parsing.

use crate::env::{vars, Environment};
use crate::types::TesseraConfig;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "warning", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "compact", "json"];

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file does not exist.
    #[error("config file not found: {path}")]
    NotFound {
        /// Path that was tried.
        path: PathBuf,
    },

    /// The config file could not be read.
    #[error("failed to read config: {source}")]
    ReadError {
        /// Underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The config file is not valid YAML.
    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError {
        /// Line of the error, when known.
        line: Option<usize>,
        /// Parser message.
        message: String,
    },

    /// A loaded value is out of range.
    #[error("validation error: {message}")]
    ValidationError {
        /// What failed validation.
        message: String,
    },

    /// A `${VAR}` reference has no value and no default.
    #[error("environment variable not found: {var}")]
    EnvVarNotFound {
        /// Variable name.
        var: String,
    },
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("static pattern is valid")
    })
}

/// Configuration loader.
pub struct ConfigLoader {
    config_path: PathBuf,
    required: bool,
}

impl ConfigLoader {
    /// Create a loader for `.tessera/config.yaml` under the given directory.
    /// A missing file yields the defaults.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            config_path: project_dir.as_ref().join(".tessera/config.yaml"),
            required: false,
        }
    }

    /// Create a loader for an explicit file. The file must exist.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            required: true,
        }
    }

    /// Honour `TESSERA_CONFIG_PATH`, falling back to the working directory.
    pub fn from_env() -> Self {
        match Environment::get(vars::TESSERA_CONFIG_PATH) {
            Some(path) => Self::with_file(path),
            None => Self::default(),
        }
    }

    /// Path this loader reads from.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load and validate the configuration.
    pub fn load(&self) -> Result<TesseraConfig, ConfigError> {
        if !self.config_path.exists() {
            if self.required {
                return Err(ConfigError::NotFound {
                    path: self.config_path.clone(),
                });
            }
            return Ok(TesseraConfig::default());
        }

        let contents = std::fs::read_to_string(&self.config_path)?;
        let expanded = expand_env_vars(&contents)?;

        let config: TesseraConfig =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        validate(&config)?;
        Ok(config)
    }

    /// Save configuration to the loader's path.
    pub fn save(&self, config: &TesseraConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        std::fs::write(&self.config_path, yaml)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}

/// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
pub fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = content.to_string();

    for cap in env_var_pattern().captures_iter(content) {
        let full_match = &cap[0];
        let var_name = &cap[1];
        let default = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) => v,
            Err(_) => match default {
                Some(d) => d.to_string(),
                None => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            },
        };

        result = result.replace(full_match, &value);
    }

    Ok(result)
}

/// Validate configuration values.
pub fn validate(config: &TesseraConfig) -> Result<(), ConfigError> {
    if config.cache.max_age_secs == Some(0) {
        return Err(ConfigError::ValidationError {
            message: "cache.max_age_secs must be greater than 0".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.log.level.to_lowercase().as_str()) {
        return Err(ConfigError::ValidationError {
            message: format!("log.level {:?} is not a known level", config.log.level),
        });
    }

    if !LOG_FORMATS.contains(&config.log.format.to_lowercase().as_str()) {
        return Err(ConfigError::ValidationError {
            message: format!("log.format {:?} is not a known format", config.log.format),
        });
    }

    Ok(())
}
