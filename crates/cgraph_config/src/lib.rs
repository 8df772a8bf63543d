//! cgraph runtime configuration
//!
//! Process-wide tunables read by the compiled-graph scheduler, channel
//! transport and result buffer. One instance lives per process; it is built
//! lazily from `CGRAPH_*` environment overrides and may be mutated in place
//! by anyone holding it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod error;
pub mod field;
pub mod global;
pub mod parse;
pub mod source;

pub use context::{RuntimeConfig, RuntimeConfigSnapshot};
pub use error::{ConfigResult, ConfigurationError};
pub use field::{ConfigField, FieldKind, FieldValue};
pub use global::{current_state, get_current, ConfigRegistry, ConfigState};
pub use source::{ConfigSource, EnvSource, MapSource, ENV_PREFIX};

#[cfg(any(test, feature = "test-util"))]
pub use global::reset_for_tests;
