//! Process-wide configuration lifecycle.
//!
//! A [`ConfigRegistry`] moves from `Uninitialized` to `Initialized` on the
//! first successful [`ConfigRegistry::get_current`] and stays there; only
//! [`ConfigRegistry::reset`] goes back. Construction runs under a mutex so
//! concurrent first callers share a single instance. After that the instance
//! is handed out as an `Arc` and mutated without any further locking.
//!
//! The process registry reads `CGRAPH_*` environment variables once, when the
//! instance is built. Later environment changes are not observed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::context::RuntimeConfig;
use crate::error::ConfigResult;
use crate::source::{ConfigSource, EnvSource};

static PROCESS_REGISTRY: Lazy<ConfigRegistry> = Lazy::new(ConfigRegistry::from_env);

/// Registry lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigState {
    /// No instance built yet
    Uninitialized,
    /// Instance exists and is shared
    Initialized,
}

/// Owner of one lazily built [`RuntimeConfig`]
pub struct ConfigRegistry {
    /// Where overrides come from
    source: Box<dyn ConfigSource>,
    /// The live instance, if built
    current: Mutex<Option<Arc<RuntimeConfig>>>,
    /// Successful constructions since creation
    constructions: AtomicU64,
}

impl ConfigRegistry {
    /// Create an uninitialized registry reading overrides from `source`
    #[must_use]
    pub fn new(source: impl ConfigSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            current: Mutex::new(None),
            constructions: AtomicU64::new(0),
        }
    }

    /// Create a registry reading the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(EnvSource::default())
    }

    /// Get the live instance, building it on first call
    ///
    /// # Errors
    ///
    /// Returns error if an override cannot be parsed. Nothing is stored in
    /// that case, so a later call retries the construction.
    pub fn get_current(&self) -> ConfigResult<Arc<RuntimeConfig>> {
        let mut current = self.current.lock();
        if let Some(config) = current.as_ref() {
            return Ok(Arc::clone(config));
        }

        let config = match RuntimeConfig::from_source(self.source.as_ref()) {
            Ok(config) => Arc::new(config),
            Err(err) => {
                tracing::warn!(error = %err, "rejecting runtime configuration");
                return Err(err);
            }
        };
        self.constructions.fetch_add(1, Ordering::Relaxed);
        tracing::info!(config = ?config.snapshot(), "runtime configuration initialized");

        *current = Some(Arc::clone(&config));
        Ok(config)
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> ConfigState {
        if self.current.lock().is_some() {
            ConfigState::Initialized
        } else {
            ConfigState::Uninitialized
        }
    }

    /// Drop the live instance, returning to `Uninitialized`
    ///
    /// Holders of the previous instance keep it; the next `get_current`
    /// builds a fresh one.
    pub fn reset(&self) -> Option<Arc<RuntimeConfig>> {
        let previous = self.current.lock().take();
        if previous.is_some() {
            tracing::warn!("runtime configuration reset");
        }
        previous
    }

    /// Number of successful constructions
    #[must_use]
    pub fn constructions(&self) -> u64 {
        self.constructions.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for ConfigRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigRegistry")
            .field("state", &self.state())
            .field("constructions", &self.constructions())
            .finish_non_exhaustive()
    }
}

/// Get the process-wide configuration, building it on first call
///
/// # Errors
///
/// Returns error if a `CGRAPH_*` variable is malformed
pub fn get_current() -> ConfigResult<Arc<RuntimeConfig>> {
    PROCESS_REGISTRY.get_current()
}

/// Lifecycle state of the process-wide configuration
#[must_use]
pub fn current_state() -> ConfigState {
    PROCESS_REGISTRY.state()
}

/// Drop the process-wide configuration so the next access rebuilds it
#[cfg(any(test, feature = "test-util"))]
pub fn reset_for_tests() {
    PROCESS_REGISTRY.reset();
}
