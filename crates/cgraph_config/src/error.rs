//! Configuration error types.

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Raised when an override cannot be turned into its field's declared type.
///
/// `key` is the name the operator actually set (for the process environment,
/// the full variable name such as `CGRAPH_SUBMIT_TIMEOUT`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// Override is not a non-negative integer
    #[error("Invalid integer for {key}: {value:?} ({reason})")]
    InvalidInteger {
        /// Override key
        key: String,
        /// Raw override value
        value: String,
        /// Why parsing failed
        reason: String,
    },

    /// Override is not a recognised boolean spelling
    #[error("Invalid flag for {key}: {value:?} (expected one of 1, 0, true, false, yes, no, on, off)")]
    InvalidFlag {
        /// Override key
        key: String,
        /// Raw override value
        value: String,
    },

    /// Override parsed but is below the field's minimum
    #[error("Value {value} for {key} is below the minimum of {min}")]
    OutOfRange {
        /// Override key
        key: String,
        /// Parsed value
        value: u64,
        /// Smallest accepted value
        min: u64,
    },

    /// Override is present but not valid UTF-8
    #[error("Override {key} is not valid unicode")]
    NotUnicode {
        /// Override key
        key: String,
    },

    /// Dynamic write with a value of the wrong kind
    #[error("Field {field} expects {expected} value")]
    KindMismatch {
        /// Logical field name
        field: String,
        /// Kind the field accepts
        expected: String,
    },
}

impl ConfigurationError {
    /// Key or field the error refers to
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::InvalidInteger { key, .. }
            | Self::InvalidFlag { key, .. }
            | Self::OutOfRange { key, .. }
            | Self::NotUnicode { key } => key,
            Self::KindMismatch { field, .. } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_integer_display() {
        let err = ConfigurationError::InvalidInteger {
            key: "CGRAPH_SUBMIT_TIMEOUT".to_string(),
            value: "not_a_number".to_string(),
            reason: "invalid digit found in string".to_string(),
        };
        let s = err.to_string();
        assert!(s.contains("CGRAPH_SUBMIT_TIMEOUT"));
        assert!(s.contains("\"not_a_number\""));
        assert!(s.contains("invalid digit"));
    }

    #[test]
    fn test_out_of_range_display() {
        let err = ConfigurationError::OutOfRange {
            key: "CGRAPH_GET_TIMEOUT".to_string(),
            value: 0,
            min: 1,
        };
        assert_eq!(
            err.to_string(),
            "Value 0 for CGRAPH_GET_TIMEOUT is below the minimum of 1"
        );
    }

    #[test]
    fn test_error_key() {
        let err = ConfigurationError::NotUnicode {
            key: "CGRAPH_BUFFER_SIZE_BYTES".to_string(),
        };
        assert_eq!(err.key(), "CGRAPH_BUFFER_SIZE_BYTES");

        let err = ConfigurationError::KindMismatch {
            field: "overlap_gpu_communication".to_string(),
            expected: "flag".to_string(),
        };
        assert_eq!(err.key(), "overlap_gpu_communication");
    }

    #[test]
    fn test_error_equality() {
        let a = ConfigurationError::InvalidFlag {
            key: "K".to_string(),
            value: "maybe".to_string(),
        };
        assert_eq!(a.clone(), a);
        assert_ne!(a, ConfigurationError::NotUnicode { key: "K".to_string() });
    }
}
