//! Validation helpers for DTOs.

use validator::ValidationError;

/// Rejects strings that are empty or contain only whitespace.
///
/// # Examples
///
/// ```ignore
/// validate_not_blank("Riverside Arena") // Ok
/// validate_not_blank("   ")             // Err
/// ```
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("value must not be blank".into());
        return Err(err);
    }

    Ok(())
}
