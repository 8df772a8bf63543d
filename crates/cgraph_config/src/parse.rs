//! Typed parsing of override strings.
//!
//! Integers accept surrounding whitespace, an optional leading `+` and single
//! `_` separators between digits. Flags accept `1/true/yes/on` and
//! `0/false/no/off` in any case; an empty flag is false.

use crate::error::{ConfigResult, ConfigurationError};
use crate::field::{ConfigField, FieldKind, FieldValue};

/// Parse a non-negative integer override
///
/// # Errors
///
/// Returns `InvalidInteger` if `raw` is empty, negative, fractional, has
/// misplaced separators or does not fit in a `u64`.
pub fn parse_int(key: &str, raw: &str) -> ConfigResult<u64> {
    let invalid = |reason: &str| ConfigurationError::InvalidInteger {
        key: key.to_string(),
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(invalid("empty value"));
    }
    if digits.starts_with('-') {
        return Err(invalid("negative values are not allowed"));
    }
    if !digits.chars().all(|c| c.is_ascii_digit() || c == '_') {
        return Err(invalid("invalid digit found in string"));
    }
    if digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return Err(invalid("misplaced digit separator"));
    }

    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    cleaned.parse::<u64>().map_err(|e| invalid(&e.to_string()))
}

/// Parse a boolean override
///
/// # Errors
///
/// Returns `InvalidFlag` for anything but the accepted spellings.
pub fn parse_flag(key: &str, raw: &str) -> ConfigResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigurationError::InvalidFlag {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Parse an override for `field`, enforcing its kind's minimum
///
/// # Errors
///
/// Returns the parse error for the field's kind, or `OutOfRange` when an
/// integer is below the kind's minimum.
pub fn parse_value(field: ConfigField, key: &str, raw: &str) -> ConfigResult<FieldValue> {
    let kind = field.kind();
    match kind {
        FieldKind::Flag => parse_flag(key, raw).map(FieldValue::Flag),
        FieldKind::Positive | FieldKind::NonNegative => {
            let value = parse_int(key, raw)?;
            let min = kind.min().unwrap_or(0);
            if value < min {
                return Err(ConfigurationError::OutOfRange {
                    key: key.to_string(),
                    value,
                    min,
                });
            }
            Ok(FieldValue::Int(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_int_plain() {
        assert_eq!(parse_int("K", "10"), Ok(10));
        assert_eq!(parse_int("K", "0"), Ok(0));
        assert_eq!(parse_int("K", " 42\n"), Ok(42));
        assert_eq!(parse_int("K", "+7"), Ok(7));
        assert_eq!(parse_int("K", "1_000_000"), Ok(1_000_000));
    }

    #[test]
    fn test_parse_int_rejects_garbage() {
        for raw in ["not_a_number", "", "   ", "+", "1e6", "1.5", "0x10", "++5", "10s"] {
            let err = parse_int("CGRAPH_GET_TIMEOUT", raw).unwrap_err();
            assert!(
                matches!(err, ConfigurationError::InvalidInteger { .. }),
                "{:?} -> {:?}",
                raw,
                err
            );
        }
    }

    #[test]
    fn test_parse_int_rejects_negative() {
        let err = parse_int("K", "-5").unwrap_err();
        match err {
            ConfigurationError::InvalidInteger { reason, value, .. } => {
                assert_eq!(value, "-5");
                assert!(reason.contains("negative"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_int_rejects_bad_separators() {
        for raw in ["_1", "1_", "1__0"] {
            assert!(parse_int("K", raw).is_err(), "{:?}", raw);
        }
    }

    #[test]
    fn test_parse_int_overflow() {
        let err = parse_int("K", "18446744073709551616").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidInteger { .. }));
        assert_eq!(parse_int("K", "18446744073709551615"), Ok(u64::MAX));
    }

    #[test]
    fn test_parse_flag() {
        for raw in ["1", "true", "TRUE", "Yes", "on", " true "] {
            assert_eq!(parse_flag("K", raw), Ok(true), "{:?}", raw);
        }
        for raw in ["0", "false", "False", "no", "OFF", ""] {
            assert_eq!(parse_flag("K", raw), Ok(false), "{:?}", raw);
        }
        let err = parse_flag("CGRAPH_OVERLAP_GPU_COMMUNICATION", "maybe").unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::InvalidFlag {
                key: "CGRAPH_OVERLAP_GPU_COMMUNICATION".to_string(),
                value: "maybe".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_value_positive_rejects_zero() {
        let err = parse_value(ConfigField::SubmitTimeout, "K", "0").unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::OutOfRange {
                key: "K".to_string(),
                value: 0,
                min: 1,
            }
        );
    }

    #[test]
    fn test_parse_value_non_negative_accepts_zero() {
        assert_eq!(
            parse_value(ConfigField::AsyncioMaxQueueSize, "K", "0"),
            Ok(FieldValue::Int(0))
        );
    }

    #[test]
    fn test_parse_value_flag() {
        assert_eq!(
            parse_value(ConfigField::OverlapGpuCommunication, "K", "1"),
            Ok(FieldValue::Flag(true))
        );
        assert!(parse_value(ConfigField::OverlapGpuCommunication, "K", "2").is_err());
    }

    proptest::proptest! {
        #[test]
        fn prop_parse_int_accepts_any_u64(value: u64) {
            prop_assert_eq!(parse_int("K", &value.to_string()), Ok(value));
        }

        #[test]
        fn prop_parse_int_ignores_padding(value in any::<u64>(), left in "[ \t]{0,3}", right in "[ \t\n]{0,3}") {
            let raw = format!("{}{}{}", left, value, right);
            prop_assert_eq!(parse_int("K", &raw), Ok(value));
        }

        #[test]
        fn prop_parse_int_rejects_letters(raw in "[0-9]{0,4}[a-zA-Z][0-9a-zA-Z]{0,4}") {
            prop_assert!(parse_int("K", &raw).is_err());
        }
    }
}
