//! The runtime configuration record.
//!
//! `RuntimeConfig` is shared behind an `Arc` and mutated in place. Each field
//! is an independent relaxed atomic: writes are never torn, but there is no
//! cross-field consistency and no ordering between threads beyond what
//! callers impose themselves. Setters do not validate; a zero timeout set here
//! is stored as-is.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigResult, ConfigurationError};
use crate::field::{
    ConfigField, FieldValue, DEFAULT_ASYNCIO_MAX_QUEUE_SIZE, DEFAULT_BUFFER_SIZE_BYTES,
    DEFAULT_GET_TIMEOUT_SECS, DEFAULT_MAX_BUFFERED_RESULTS, DEFAULT_MAX_INFLIGHT_EXECUTIONS,
    DEFAULT_OVERLAP_GPU_COMMUNICATION, DEFAULT_SUBMIT_TIMEOUT_SECS, DEFAULT_TEARDOWN_TIMEOUT_SECS,
};
use crate::parse::parse_value;
use crate::source::{ConfigSource, EnvSource};

/// Process-wide tunables for compiled graph execution
///
/// Obtain the shared instance with [`crate::get_current`]. Standalone
/// instances built with [`RuntimeConfig::defaults`] or
/// [`RuntimeConfig::from_source`] are useful for tests and embedding.
#[derive(Debug)]
pub struct RuntimeConfig {
    submit_timeout_secs: AtomicU64,
    get_timeout_secs: AtomicU64,
    teardown_timeout_secs: AtomicU64,
    buffer_size_bytes: AtomicU64,
    asyncio_max_queue_size: AtomicU64,
    max_buffered_results: AtomicU64,
    max_inflight_executions: AtomicU64,
    overlap_gpu_communication: AtomicBool,
}

impl RuntimeConfig {
    /// Create a configuration holding the compiled-in defaults
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            submit_timeout_secs: AtomicU64::new(DEFAULT_SUBMIT_TIMEOUT_SECS),
            get_timeout_secs: AtomicU64::new(DEFAULT_GET_TIMEOUT_SECS),
            teardown_timeout_secs: AtomicU64::new(DEFAULT_TEARDOWN_TIMEOUT_SECS),
            buffer_size_bytes: AtomicU64::new(DEFAULT_BUFFER_SIZE_BYTES),
            asyncio_max_queue_size: AtomicU64::new(DEFAULT_ASYNCIO_MAX_QUEUE_SIZE),
            max_buffered_results: AtomicU64::new(DEFAULT_MAX_BUFFERED_RESULTS),
            max_inflight_executions: AtomicU64::new(DEFAULT_MAX_INFLIGHT_EXECUTIONS),
            overlap_gpu_communication: AtomicBool::new(DEFAULT_OVERLAP_GPU_COMMUNICATION),
        }
    }

    /// Resolve every field from `source`, falling back to defaults
    ///
    /// # Errors
    ///
    /// Returns the first override that cannot be read or parsed. Overrides
    /// are never silently replaced by defaults.
    pub fn from_source(source: &dyn ConfigSource) -> ConfigResult<Self> {
        let config = Self::defaults();
        for field in ConfigField::ALL {
            let Some(raw) = source.lookup(field.name())? else {
                continue;
            };
            let key = source.qualified_key(field.name());
            let value = parse_value(field, &key, &raw)?;
            tracing::debug!(field = field.name(), key = %key, value = %value, "applying override");
            config.set(field, value)?;
        }
        Ok(config)
    }

    /// Resolve every field from `CGRAPH_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns error if any set variable is malformed
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_source(&EnvSource::default())
    }

    /// Build an instance holding a snapshot's values
    #[must_use]
    pub fn from_snapshot(snapshot: &RuntimeConfigSnapshot) -> Self {
        let config = Self::defaults();
        config.apply(snapshot);
        config
    }

    fn int_slot(&self, field: ConfigField) -> Option<&AtomicU64> {
        match field {
            ConfigField::SubmitTimeout => Some(&self.submit_timeout_secs),
            ConfigField::GetTimeout => Some(&self.get_timeout_secs),
            ConfigField::TeardownTimeout => Some(&self.teardown_timeout_secs),
            ConfigField::BufferSizeBytes => Some(&self.buffer_size_bytes),
            ConfigField::AsyncioMaxQueueSize => Some(&self.asyncio_max_queue_size),
            ConfigField::MaxBufferedResults => Some(&self.max_buffered_results),
            ConfigField::MaxInflightExecutions => Some(&self.max_inflight_executions),
            ConfigField::OverlapGpuCommunication => None,
        }
    }

    /// Read a field by catalogue entry
    #[must_use]
    pub fn get(&self, field: ConfigField) -> FieldValue {
        match self.int_slot(field) {
            Some(slot) => FieldValue::Int(slot.load(Ordering::Relaxed)),
            None => FieldValue::Flag(self.overlap_gpu_communication()),
        }
    }

    /// Write a field by catalogue entry
    ///
    /// # Errors
    ///
    /// Returns `KindMismatch` when the value's kind does not match the field
    pub fn set(&self, field: ConfigField, value: FieldValue) -> ConfigResult<()> {
        match (self.int_slot(field), value) {
            (Some(slot), FieldValue::Int(v)) => slot.store(v, Ordering::Relaxed),
            (None, FieldValue::Flag(v)) => self.set_overlap_gpu_communication(v),
            _ => {
                return Err(ConfigurationError::KindMismatch {
                    field: field.name().to_string(),
                    expected: field.kind().as_str().to_string(),
                })
            }
        }
        Ok(())
    }

    /// Max seconds to wait for a submission call
    #[must_use]
    pub fn submit_timeout_secs(&self) -> u64 {
        self.submit_timeout_secs.load(Ordering::Relaxed)
    }

    /// Set the submission timeout
    pub fn set_submit_timeout_secs(&self, secs: u64) {
        self.submit_timeout_secs.store(secs, Ordering::Relaxed);
    }

    /// Max seconds to wait when retrieving a completed result
    #[must_use]
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_timeout_secs.load(Ordering::Relaxed)
    }

    /// Set the result retrieval timeout
    pub fn set_get_timeout_secs(&self, secs: u64) {
        self.get_timeout_secs.store(secs, Ordering::Relaxed);
    }

    /// Max seconds to wait for the graph to shut down cleanly
    #[must_use]
    pub fn teardown_timeout_secs(&self) -> u64 {
        self.teardown_timeout_secs.load(Ordering::Relaxed)
    }

    /// Set the teardown timeout
    pub fn set_teardown_timeout_secs(&self, secs: u64) {
        self.teardown_timeout_secs.store(secs, Ordering::Relaxed);
    }

    /// Initial size of inter-task message buffers
    ///
    /// Channels start at this size and grow when a larger message is written.
    #[must_use]
    pub fn buffer_size_bytes(&self) -> u64 {
        self.buffer_size_bytes.load(Ordering::Relaxed)
    }

    /// Set the initial buffer size
    pub fn set_buffer_size_bytes(&self, bytes: u64) {
        self.buffer_size_bytes.store(bytes, Ordering::Relaxed);
    }

    /// Async submission queue cap; 0 means unbounded
    ///
    /// Use [`RuntimeConfig::asyncio_queue_bound`] to get the interpreted
    /// bound.
    #[must_use]
    pub fn asyncio_max_queue_size(&self) -> u64 {
        self.asyncio_max_queue_size.load(Ordering::Relaxed)
    }

    /// Set the async queue cap (0 = unbounded)
    pub fn set_asyncio_max_queue_size(&self, size: u64) {
        self.asyncio_max_queue_size.store(size, Ordering::Relaxed);
    }

    /// Max unread results retained in memory
    ///
    /// Only binds when smaller than the graph's in-flight capacity; beyond
    /// that, new submissions are refused before results pile up.
    #[must_use]
    pub fn max_buffered_results(&self) -> u64 {
        self.max_buffered_results.load(Ordering::Relaxed)
    }

    /// Set the buffered result cap
    pub fn set_max_buffered_results(&self, count: u64) {
        self.max_buffered_results.store(count, Ordering::Relaxed);
    }

    /// Max submitted but unconsumed executions
    ///
    /// Schedulers reject further submissions with a capacity-exceeded error.
    #[must_use]
    pub fn max_inflight_executions(&self) -> u64 {
        self.max_inflight_executions.load(Ordering::Relaxed)
    }

    /// Set the in-flight execution cap
    pub fn set_max_inflight_executions(&self, count: u64) {
        self.max_inflight_executions.store(count, Ordering::Relaxed);
    }

    /// (Experimental) overlap GPU communication with computation
    #[must_use]
    pub fn overlap_gpu_communication(&self) -> bool {
        self.overlap_gpu_communication.load(Ordering::Relaxed)
    }

    /// Enable or disable communication/compute overlap
    pub fn set_overlap_gpu_communication(&self, enabled: bool) {
        self.overlap_gpu_communication.store(enabled, Ordering::Relaxed);
    }

    /// Submission timeout as a `Duration`
    #[must_use]
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs())
    }

    /// Result retrieval timeout as a `Duration`
    #[must_use]
    pub fn get_timeout(&self) -> Duration {
        Duration::from_secs(self.get_timeout_secs())
    }

    /// Teardown timeout as a `Duration`
    #[must_use]
    pub fn teardown_timeout(&self) -> Duration {
        Duration::from_secs(self.teardown_timeout_secs())
    }

    /// Async queue bound, `None` when unbounded
    #[must_use]
    pub fn asyncio_queue_bound(&self) -> Option<NonZeroUsize> {
        let size = self.asyncio_max_queue_size();
        NonZeroUsize::new(usize::try_from(size).unwrap_or(usize::MAX))
    }

    /// Upper bound on memory held by buffered results, in bytes
    ///
    /// Assumes every buffered result fits the initial buffer size.
    #[must_use]
    pub fn buffered_results_memory_bound(&self) -> u64 {
        self.max_buffered_results().saturating_mul(self.buffer_size_bytes())
    }

    /// Copy out the current values
    #[must_use]
    pub fn snapshot(&self) -> RuntimeConfigSnapshot {
        RuntimeConfigSnapshot {
            submit_timeout_secs: self.submit_timeout_secs(),
            get_timeout_secs: self.get_timeout_secs(),
            teardown_timeout_secs: self.teardown_timeout_secs(),
            buffer_size_bytes: self.buffer_size_bytes(),
            asyncio_max_queue_size: self.asyncio_max_queue_size(),
            max_buffered_results: self.max_buffered_results(),
            max_inflight_executions: self.max_inflight_executions(),
            overlap_gpu_communication: self.overlap_gpu_communication(),
        }
    }

    /// Overwrite every field with a snapshot's values
    pub fn apply(&self, snapshot: &RuntimeConfigSnapshot) {
        self.set_submit_timeout_secs(snapshot.submit_timeout_secs);
        self.set_get_timeout_secs(snapshot.get_timeout_secs);
        self.set_teardown_timeout_secs(snapshot.teardown_timeout_secs);
        self.set_buffer_size_bytes(snapshot.buffer_size_bytes);
        self.set_asyncio_max_queue_size(snapshot.asyncio_max_queue_size);
        self.set_max_buffered_results(snapshot.max_buffered_results);
        self.set_max_inflight_executions(snapshot.max_inflight_executions);
        self.set_overlap_gpu_communication(snapshot.overlap_gpu_communication);
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Plain copy of a [`RuntimeConfig`]'s values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuntimeConfigSnapshot {
    /// Submission timeout in seconds
    pub submit_timeout_secs: u64,
    /// Result retrieval timeout in seconds
    pub get_timeout_secs: u64,
    /// Teardown timeout in seconds
    pub teardown_timeout_secs: u64,
    /// Initial buffer size in bytes
    pub buffer_size_bytes: u64,
    /// Async queue cap, 0 = unbounded
    pub asyncio_max_queue_size: u64,
    /// Buffered result cap
    pub max_buffered_results: u64,
    /// In-flight execution cap
    pub max_inflight_executions: u64,
    /// Communication/compute overlap
    pub overlap_gpu_communication: bool,
}

impl Default for RuntimeConfigSnapshot {
    fn default() -> Self {
        RuntimeConfig::defaults().snapshot()
    }
}
