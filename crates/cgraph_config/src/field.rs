//! Catalogue of configuration fields.
//!
//! Each field has a logical name (the env-var suffix), a kind that decides how
//! overrides are parsed, and a compiled-in default.

use serde::{Deserialize, Serialize};

/// Default submission timeout in seconds
pub const DEFAULT_SUBMIT_TIMEOUT_SECS: u64 = 10;
/// Default result retrieval timeout in seconds
pub const DEFAULT_GET_TIMEOUT_SECS: u64 = 10;
/// Default teardown timeout in seconds
pub const DEFAULT_TEARDOWN_TIMEOUT_SECS: u64 = 30;
/// Default initial channel buffer size (1 MB)
pub const DEFAULT_BUFFER_SIZE_BYTES: u64 = 1_000_000;
/// Default async submission queue size; 0 means unbounded
pub const DEFAULT_ASYNCIO_MAX_QUEUE_SIZE: u64 = 0;
/// Default cap on unread results. With the default buffer size this bounds
/// buffered result memory at 1 GB.
pub const DEFAULT_MAX_BUFFERED_RESULTS: u64 = 1000;
/// Default cap on submitted but unconsumed executions
pub const DEFAULT_MAX_INFLIGHT_EXECUTIONS: u64 = 10;
/// Default for the experimental communication/compute overlap
pub const DEFAULT_OVERLAP_GPU_COMMUNICATION: bool = false;

/// How a field's override is parsed and bounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Integer >= 1
    Positive,
    /// Integer >= 0
    NonNegative,
    /// Boolean
    Flag,
}

impl FieldKind {
    /// Smallest accepted override for integer kinds
    #[must_use]
    pub const fn min(&self) -> Option<u64> {
        match self {
            Self::Positive => Some(1),
            Self::NonNegative => Some(0),
            Self::Flag => None,
        }
    }

    /// Whether the kind holds an integer
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        !matches!(self, Self::Flag)
    }

    /// Human-readable kind name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive integer",
            Self::NonNegative => "non-negative integer",
            Self::Flag => "flag",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A field value, typed by kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Integer value
    Int(u64),
    /// Boolean value
    Flag(bool),
}

impl FieldValue {
    /// Integer payload, if any
    #[must_use]
    pub const fn as_int(&self) -> Option<u64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Flag(_) => None,
        }
    }

    /// Boolean payload, if any
    #[must_use]
    pub const fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(v) => Some(*v),
            Self::Int(_) => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => std::fmt::Display::fmt(v, f),
            Self::Flag(v) => std::fmt::Display::fmt(v, f),
        }
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Configuration fields, in resolution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigField {
    /// Max wait for a submission call
    SubmitTimeout,
    /// Max wait when retrieving a result
    GetTimeout,
    /// Max wait for graph teardown
    TeardownTimeout,
    /// Initial inter-task buffer size
    BufferSizeBytes,
    /// Async submission queue cap
    AsyncioMaxQueueSize,
    /// Unread result cap
    MaxBufferedResults,
    /// In-flight execution cap
    MaxInflightExecutions,
    /// Experimental communication/compute overlap
    OverlapGpuCommunication,
}

impl ConfigField {
    /// Every field, in resolution order
    pub const ALL: [ConfigField; 8] = [
        Self::SubmitTimeout,
        Self::GetTimeout,
        Self::TeardownTimeout,
        Self::BufferSizeBytes,
        Self::AsyncioMaxQueueSize,
        Self::MaxBufferedResults,
        Self::MaxInflightExecutions,
        Self::OverlapGpuCommunication,
    ];

    /// Logical name, used as the override key
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SubmitTimeout => "submit_timeout",
            Self::GetTimeout => "get_timeout",
            Self::TeardownTimeout => "teardown_timeout",
            Self::BufferSizeBytes => "buffer_size_bytes",
            Self::AsyncioMaxQueueSize => "asyncio_max_queue_size",
            Self::MaxBufferedResults => "max_buffered_results",
            Self::MaxInflightExecutions => "max_inflight_executions",
            Self::OverlapGpuCommunication => "overlap_gpu_communication",
        }
    }

    /// Look a field up by logical name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    /// Parse kind
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::AsyncioMaxQueueSize => FieldKind::NonNegative,
            Self::OverlapGpuCommunication => FieldKind::Flag,
            _ => FieldKind::Positive,
        }
    }

    /// Compiled-in default
    #[must_use]
    pub const fn default_value(&self) -> FieldValue {
        match self {
            Self::SubmitTimeout => FieldValue::Int(DEFAULT_SUBMIT_TIMEOUT_SECS),
            Self::GetTimeout => FieldValue::Int(DEFAULT_GET_TIMEOUT_SECS),
            Self::TeardownTimeout => FieldValue::Int(DEFAULT_TEARDOWN_TIMEOUT_SECS),
            Self::BufferSizeBytes => FieldValue::Int(DEFAULT_BUFFER_SIZE_BYTES),
            Self::AsyncioMaxQueueSize => FieldValue::Int(DEFAULT_ASYNCIO_MAX_QUEUE_SIZE),
            Self::MaxBufferedResults => FieldValue::Int(DEFAULT_MAX_BUFFERED_RESULTS),
            Self::MaxInflightExecutions => FieldValue::Int(DEFAULT_MAX_INFLIGHT_EXECUTIONS),
            Self::OverlapGpuCommunication => FieldValue::Flag(DEFAULT_OVERLAP_GPU_COMMUNICATION),
        }
    }

    /// One-line description for operator output
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::SubmitTimeout => "max seconds to wait for a submission call",
            Self::GetTimeout => "max seconds to wait when retrieving a result",
            Self::TeardownTimeout => "max seconds to wait for graph teardown",
            Self::BufferSizeBytes => "initial inter-task buffer size, grown on demand",
            Self::AsyncioMaxQueueSize => "async submission queue cap, 0 = unbounded",
            Self::MaxBufferedResults => "max unread results kept in memory",
            Self::MaxInflightExecutions => "max submitted but unconsumed executions",
            Self::OverlapGpuCommunication => "(experimental) overlap communication with compute",
        }
    }
}

impl std::fmt::Display for ConfigField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}
