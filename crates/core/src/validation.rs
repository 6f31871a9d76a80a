//! Stateless input validation.
//!
//! Request types derive [`validator::Validate`]; [`validate`] runs the derived
//! rules and folds the failures into a single [`CoreError::Validation`] whose
//! message names each failing field and rule, e.g. `email: email; password: length`.

use validator::Validate;

use crate::error::CoreError;

/// Run the derived validation rules on `input`.
pub fn validate<T: Validate>(input: &T) -> Result<(), CoreError> {
    input.validate().map_err(|errors| {
        let mut failures: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter()
                    .map(move |e| format!("{field}: {}", e.code))
                    .collect::<Vec<_>>()
            })
            .collect();
        failures.sort();
        CoreError::Validation(failures.join("; "))
    })
}

/// `value` without surrounding whitespace. Run before [`validate`] so blank
/// strings fail `length(min = 1)`.
pub fn trimmed(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

/// Trim an optional field, dropping it when nothing is left.
pub fn trimmed_opt(value: Option<String>) -> Option<String> {
    value.map(trimmed).filter(|v| !v.is_empty())
}

/// Canonical form used for storing and looking up email addresses.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
