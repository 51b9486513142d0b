//! Configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TesseraConfig {
    /// Authorization policy switches.
    pub policy: PolicyConfig,
    /// Preference cache configuration.
    pub cache: CacheConfig,
    /// Logging configuration.
    pub log: LogSettings,
}

/// Policy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Hide invisible resources only from users whose sole campaign role is
    /// Participant. When false, every Participant holder is excluded.
    pub sole_participant_restriction: bool,
    /// Emit granted decisions at info level instead of debug.
    pub log_granted_decisions: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            sole_participant_restriction: true,
            log_granted_decisions: false,
        }
    }
}

/// Preference cache configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Reload the snapshot once it is older than this. `None` means only
    /// explicit invalidation triggers a reload.
    pub max_age_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_secs: Some(300),
        }
    }
}

/// Logging configuration as written in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Minimum level: trace, debug, info, warn or error.
    pub level: String,
    /// Output format: pretty, compact or json.
    pub format: String,
    /// Optional log file, written in addition to stderr.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}
