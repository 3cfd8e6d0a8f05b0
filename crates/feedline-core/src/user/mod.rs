//! User domain module.
//!
//! # Module Structure
//!
//! - `model`: User profile and registration payload
//! - `validation`: Client-side rules applied before login/registration

mod model;
mod validation;

// Re-export public API
pub use model::{ADMIN_ROLE, RegisterRequest, User};
pub use validation::{
    IssueKind, MAX_AGE, MIN_AGE, PasswordStrength, ValidationIssue, age_on, password_strength,
    validate_login, validate_registration,
};
