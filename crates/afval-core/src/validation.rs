//! Validation primitives shared across the procedure.

use validator::ValidateEmail;

/// Syntactic email validity predicate used by the contact step and the
/// final submission guard.
pub fn is_valid_email(email: &str) -> bool {
    !email.trim().is_empty() && email.validate_email()
}
