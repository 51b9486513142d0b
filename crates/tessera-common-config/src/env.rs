//! Environment variable handling.

use std::env;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The variable is not set.
    #[error("required environment variable not set: {var}")]
    NotSet {
        /// Variable name.
        var: String,
    },

    /// The variable has an unparsable value.
    #[error("invalid value for {var}: {message}")]
    InvalidValue {
        /// Variable name.
        var: String,
        /// Why the value was rejected.
        message: String,
    },
}

/// Environment variable names.
pub mod vars {
    /// Path of the YAML config file.
    pub const TESSERA_CONFIG_PATH: &str = "TESSERA_CONFIG_PATH";
    /// Log level override.
    pub const TESSERA_LOG_LEVEL: &str = "TESSERA_LOG_LEVEL";
    /// Log format override (`pretty`, `compact` or `json`).
    pub const TESSERA_LOG_FORMAT: &str = "TESSERA_LOG_FORMAT";
    /// Optional log file path.
    pub const TESSERA_LOG_FILE: &str = "TESSERA_LOG_FILE";
    /// Include source locations in log lines.
    pub const TESSERA_LOG_SOURCE: &str = "TESSERA_LOG_SOURCE";
    /// Log span open and close events.
    pub const TESSERA_LOG_SPANS: &str = "TESSERA_LOG_SPANS";
    /// Deployment environment name.
    pub const TESSERA_ENV: &str = "TESSERA_ENV";

    /// Standard tracing filter directive.
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Environment configuration.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Initialize environment from .env files.
    ///
    /// Missing files are ignored; later files override earlier ones.
    pub fn init() -> Self {
        let _ = dotenvy::from_filename(".env");
        let _ = dotenvy::from_filename(".env.local");

        if let Ok(env) = env::var(vars::TESSERA_ENV) {
            let _ = dotenvy::from_filename(format!(".env.{}", env));
        }

        Self { _guard: () }
    }

    /// Get a required string variable.
    pub fn require(var: &str) -> Result<String, EnvError> {
        env::var(var).map_err(|_| EnvError::NotSet { var: var.to_string() })
    }

    /// Get an optional string variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok()
    }

    /// Get a boolean variable.
    pub fn get_bool(var: &str) -> Option<bool> {
        env::var(var)
            .ok()
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
    }

    /// Get an integer variable.
    pub fn get_int<T: std::str::FromStr>(var: &str) -> Result<Option<T>, EnvError> {
        match env::var(var) {
            Ok(v) => v.parse().map(Some).map_err(|_| EnvError::InvalidValue {
                var: var.to_string(),
                message: "expected integer".to_string(),
            }),
            Err(_) => Ok(None),
        }
    }
}
