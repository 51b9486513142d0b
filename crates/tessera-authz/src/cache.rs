//! Process-wide cache of server preferences.
//!
//! Preferences change rarely, so they are read once and shared as an
//! immutable snapshot. Invalidation marks the snapshot stale; the next
//! reader reloads and swaps in a new one. Withdrawn values are never served.

use crate::repository::RepositoryError;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tessera_common_config::CacheConfig;
use tessera_common_core::ErrorCode;
use thiserror::Error;
use tracing::{debug, warn};

/// Well-known preference keys.
pub mod keys {
    /// Lets privileged class members read mobility data of every member.
    pub const PRIVILEGED_CAN_VIEW_CLASS_MOBILITY: &str =
        "privileged_user_in_class_can_view_mobility_for_everyone_in_class";
}

/// Where preference values come from.
pub trait PreferenceSource: Send + Sync {
    /// Every preference key and its raw value.
    fn load(&self) -> Result<HashMap<String, String>, RepositoryError>;
}

/// Preference lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The preference source could not be read.
    #[error("failed to load preferences: {0}")]
    Load(#[from] RepositoryError),

    /// No preference with this key.
    #[error("unknown preference: {0}")]
    UnknownKey(String),

    /// The value is not a boolean.
    #[error("preference {key} is not a boolean: {value:?}")]
    NotBoolean {
        /// Preference key.
        key: String,
        /// The stored value.
        value: String,
    },
}

impl CacheError {
    /// Stable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Load(e) => e.code(),
            Self::UnknownKey(_) | Self::NotBoolean { .. } => ErrorCode::INVALID_VALUE,
        }
    }
}

/// An immutable view of every preference at one point in time.
#[derive(Debug)]
pub struct PreferenceSnapshot {
    values: HashMap<String, String>,
    loaded_at: Instant,
    generation: u64,
}

impl PreferenceSnapshot {
    /// Raw value of a preference.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Preference parsed as `true` or `false`.
    pub fn get_bool(&self, key: &str) -> Result<bool, CacheError> {
        let value = self
            .get(key)
            .ok_or_else(|| CacheError::UnknownKey(key.to_string()))?;
        match value.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(CacheError::NotBoolean {
                key: key.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Number of preferences.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no preferences were loaded.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// When this snapshot was read from the source.
    pub fn loaded_at(&self) -> Instant {
        self.loaded_at
    }

    /// Increments on every successful load, starting at 1.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Default)]
struct CacheState {
    snapshot: Option<Arc<PreferenceSnapshot>>,
    stale: bool,
}

/// Read-mostly preference cache.
pub struct PreferenceCache {
    source: Arc<dyn PreferenceSource>,
    max_age: Option<Duration>,
    state: RwLock<CacheState>,
    reload: Mutex<()>,
}

impl PreferenceCache {
    /// A cache that loads lazily and never expires on its own.
    pub fn new(source: Arc<dyn PreferenceSource>) -> Self {
        Self {
            source,
            max_age: None,
            state: RwLock::new(CacheState::default()),
            reload: Mutex::new(()),
        }
    }

    /// Cache with the max age from the `cache` config section.
    pub fn from_config(source: Arc<dyn PreferenceSource>, config: &CacheConfig) -> Self {
        let cache = Self::new(source);
        match config.max_age_secs {
            Some(secs) => cache.with_max_age(Duration::from_secs(secs)),
            None => cache,
        }
    }

    /// Reload snapshots older than `max_age` on the next read.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Current snapshot, loading it if absent, stale or expired.
    ///
    /// A failed reload after [`invalidate`](Self::invalidate) is an error
    /// until a reload succeeds. A failed reload of a merely expired snapshot
    /// serves the expired one and logs the failure.
    pub fn snapshot(&self) -> Result<Arc<PreferenceSnapshot>, CacheError> {
        if let Some(snapshot) = self.fresh() {
            return Ok(snapshot);
        }

        let _reload = self.reload.lock();
        if let Some(snapshot) = self.fresh() {
            return Ok(snapshot);
        }

        let invalidated = self.state.read().stale;
        match self.load_and_swap() {
            Ok(snapshot) => Ok(snapshot),
            Err(err) if invalidated => {
                warn!(error = %err, "Preference reload after invalidation failed");
                Err(err)
            }
            Err(err) => match self.state.read().snapshot.clone() {
                Some(previous) => {
                    warn!(
                        error = %err,
                        generation = previous.generation(),
                        "Preference reload failed, serving previous snapshot"
                    );
                    Ok(previous)
                }
                None => Err(err),
            },
        }
    }

    /// Boolean preference from the current snapshot.
    pub fn get_bool(&self, key: &str) -> Result<bool, CacheError> {
        self.snapshot()?.get_bool(key)
    }

    /// Mark the snapshot stale. The next read reloads.
    pub fn invalidate(&self) {
        self.state.write().stale = true;
        debug!("Preference cache invalidated");
    }

    /// Reload now, reporting any failure. The previous snapshot is kept on
    /// error.
    pub fn refresh(&self) -> Result<(), CacheError> {
        let _reload = self.reload.lock();
        self.load_and_swap().map(|_| ())
    }

    fn fresh(&self) -> Option<Arc<PreferenceSnapshot>> {
        let state = self.state.read();
        if state.stale {
            return None;
        }
        let snapshot = state.snapshot.as_ref()?;
        match self.max_age {
            Some(max_age) if snapshot.loaded_at.elapsed() >= max_age => None,
            _ => Some(Arc::clone(snapshot)),
        }
    }

    fn load_and_swap(&self) -> Result<Arc<PreferenceSnapshot>, CacheError> {
        let values = tessera_common_log::timed!("preference_load", self.source.load())?;
        let mut state = self.state.write();
        let generation = state.snapshot.as_ref().map_or(0, |s| s.generation) + 1;
        let snapshot = Arc::new(PreferenceSnapshot {
            values,
            loaded_at: Instant::now(),
            generation,
        });
        state.snapshot = Some(Arc::clone(&snapshot));
        state.stale = false;
        debug!(generation, entries = snapshot.len(), "Preferences loaded");
        Ok(snapshot)
    }
}

impl fmt::Debug for PreferenceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("PreferenceCache")
            .field("max_age", &self.max_age)
            .field("generation", &state.snapshot.as_ref().map(|s| s.generation))
            .field("stale", &state.stale)
            .finish()
    }
}
