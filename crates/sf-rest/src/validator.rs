//! Reusable field validators.
//!
//! Each function checks one value and returns the matching
//! [`ValidationError`] on failure. [`FieldRule`](crate::FieldRule)s are
//! thin wrappers around these; custom rules can call them directly.

use crate::error::ValidationError;

type Result = std::result::Result<(), ValidationError>;

/// Length in bytes must fall within the (inclusive, optional) bounds.
pub fn byte_length(value: &str, min: Option<usize>, max: Option<usize>) -> Result {
    let length = value.len();
    if within(length, min, max) {
        return Ok(());
    }
    Err(ValidationError::BadByteLength {
        value: value.to_string(),
        length,
        min,
        max,
    })
}

/// Length in characters must fall within the (inclusive, optional) bounds.
pub fn character_length(value: &str, min: Option<usize>, max: Option<usize>) -> Result {
    let length = value.chars().count();
    if within(length, min, max) {
        return Ok(());
    }
    Err(ValidationError::BadCharacterLength {
        value: value.to_string(),
        length,
        min,
        max,
    })
}

/// Value must be one of `allowed`.
pub fn enumeration<S: AsRef<str>>(value: &str, allowed: &[S]) -> Result {
    if allowed.iter().any(|candidate| candidate.as_ref() == value) {
        return Ok(());
    }
    Err(ValidationError::BadEnumValue {
        value: value.to_string(),
        allowed: allowed.iter().map(|s| s.as_ref().to_string()).collect(),
    })
}

/// Value must be an 18-character alphanumeric Salesforce id.
///
/// 15-character (case-sensitive) ids are rejected.
pub fn salesforce_id(value: &str) -> Result {
    if value.len() == 18 && value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Ok(());
    }
    Err(ValidationError::BadId {
        value: value.to_string(),
    })
}

/// Value must be present.
pub fn not_null<T>(value: Option<T>) -> Result {
    match value {
        Some(_) => Ok(()),
        None => Err(ValidationError::ValueRequired),
    }
}

fn within(length: usize, min: Option<usize>, max: Option<usize>) -> bool {
    min.is_none_or(|min| length >= min) && max.is_none_or(|max| length <= max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_length() {
        assert!(byte_length("abc", Some(1), Some(3)).is_ok());
        assert!(byte_length("abc", None, None).is_ok());
        // "é" is two bytes
        let err = byte_length("é", None, Some(1)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::BadByteLength {
                value: "é".into(),
                length: 2,
                min: None,
                max: Some(1),
            }
        );
    }

    #[test]
    fn test_character_length() {
        assert!(character_length("é", None, Some(1)).is_ok());

        let cases = [
            ("B", Some(2), Some(100), false),
            ("Bo", Some(2), Some(100), true),
            ("", None, Some(0), true),
            ("Bob", Some(4), None, false),
        ];
        for (value, min, max, ok) in cases {
            assert_eq!(character_length(value, min, max).is_ok(), ok, "{value:?}");
        }
    }

    #[test]
    fn test_enumeration() {
        assert!(enumeration("Red", &["Red", "Blue"]).is_ok());
        assert!(matches!(
            enumeration("red", &["Red", "Blue"]),
            Err(ValidationError::BadEnumValue { .. })
        ));
    }

    #[test]
    fn test_salesforce_id() {
        assert!(salesforce_id("5003a00001IJpONAA1").is_ok());
        assert!(salesforce_id("5003A00001IJPONAA1").is_ok());
        assert!(salesforce_id("5003a00001IJpON").is_err());
        assert!(salesforce_id("5003a00001IJpONAA!").is_err());
        assert!(salesforce_id("5003a00001IJpONAA12").is_err());
    }

    #[test]
    fn test_not_null() {
        assert!(not_null(Some("x")).is_ok());
        assert_eq!(not_null::<&str>(None), Err(ValidationError::ValueRequired));
    }
}
