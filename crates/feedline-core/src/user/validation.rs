//! Client-side validation of login and registration input.
//!
//! These checks run before any request is sent; input that fails them never
//! reaches the network.

use super::model::RegisterRequest;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\s]+$").expect("name pattern is valid"));
static ALIAS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("alias pattern is valid"));
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

pub const MIN_AGE: i32 = 13;
pub const MAX_AGE: i32 = 120;

/// What is wrong with a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    Required,
    TooShort { min: usize },
    TooLong { max: usize },
    InvalidFormat,
    TooYoung { min_age: i32 },
    TooOld { max_age: i32 },
    WeakPassword,
}

/// A single failed rule on a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl ValidationIssue {
    fn new(field: &'static str, kind: IssueKind) -> Self {
        Self { field, kind }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::Required => write!(f, "{} is required", self.field),
            IssueKind::TooShort { min } => {
                write!(f, "{} must be at least {} characters", self.field, min)
            }
            IssueKind::TooLong { max } => {
                write!(f, "{} must be at most {} characters", self.field, max)
            }
            IssueKind::InvalidFormat => write!(f, "{} has an invalid format", self.field),
            IssueKind::TooYoung { min_age } => {
                write!(f, "you must be at least {} years old", min_age)
            }
            IssueKind::TooOld { max_age } => {
                write!(f, "age cannot exceed {} years", max_age)
            }
            IssueKind::WeakPassword => write!(
                f,
                "password must contain an upper-case letter, a lower-case letter and a digit"
            ),
        }
    }
}

/// Relative strength of a password, as shown next to the password field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

pub fn password_strength(password: &str) -> PasswordStrength {
    if password.chars().count() < 6 {
        return PasswordStrength::Weak;
    }

    let score = [
        password.chars().count() >= 8,
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| SPECIAL_CHARS.contains(c)),
    ]
    .into_iter()
    .filter(|passed| *passed)
    .count();

    match score {
        0..=2 => PasswordStrength::Weak,
        3 => PasswordStrength::Medium,
        _ => PasswordStrength::Strong,
    }
}

/// Whole years between `date_of_birth` and `today`.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

fn check_length(
    issues: &mut Vec<ValidationIssue>,
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> bool {
    let len = value.chars().count();
    if value.trim().is_empty() {
        issues.push(ValidationIssue::new(field, IssueKind::Required));
        false
    } else if len < min {
        issues.push(ValidationIssue::new(field, IssueKind::TooShort { min }));
        false
    } else if len > max {
        issues.push(ValidationIssue::new(field, IssueKind::TooLong { max }));
        false
    } else {
        true
    }
}

fn check_name(issues: &mut Vec<ValidationIssue>, field: &'static str, value: &str) {
    if check_length(issues, field, value, 2, 50) && !NAME_PATTERN.is_match(value) {
        issues.push(ValidationIssue::new(field, IssueKind::InvalidFormat));
    }
}

fn check_email(issues: &mut Vec<ValidationIssue>, email: &str) {
    if email.trim().is_empty() {
        issues.push(ValidationIssue::new("email", IssueKind::Required));
    } else if email.chars().count() > 100 {
        issues.push(ValidationIssue::new("email", IssueKind::TooLong { max: 100 }));
    } else if !EMAIL_PATTERN.is_match(email) {
        issues.push(ValidationIssue::new("email", IssueKind::InvalidFormat));
    }
}

fn check_password(issues: &mut Vec<ValidationIssue>, password: &str) {
    if password.is_empty() {
        issues.push(ValidationIssue::new("password", IssueKind::Required));
        return;
    }
    let len = password.chars().count();
    if len < 8 {
        issues.push(ValidationIssue::new("password", IssueKind::TooShort { min: 8 }));
    } else if len > 50 {
        issues.push(ValidationIssue::new("password", IssueKind::TooLong { max: 50 }));
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_upper && has_lower && has_digit) {
        issues.push(ValidationIssue::new("password", IssueKind::WeakPassword));
    }
}

fn check_date_of_birth(issues: &mut Vec<ValidationIssue>, value: &str, today: NaiveDate) {
    if value.trim().is_empty() {
        issues.push(ValidationIssue::new("dateOfBirth", IssueKind::Required));
        return;
    }
    let Ok(date_of_birth) = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") else {
        issues.push(ValidationIssue::new("dateOfBirth", IssueKind::InvalidFormat));
        return;
    };

    let age = age_on(date_of_birth, today);
    if age < MIN_AGE {
        issues.push(ValidationIssue::new(
            "dateOfBirth",
            IssueKind::TooYoung { min_age: MIN_AGE },
        ));
    } else if age > MAX_AGE {
        issues.push(ValidationIssue::new(
            "dateOfBirth",
            IssueKind::TooOld { max_age: MAX_AGE },
        ));
    }
}

/// Checks the login form: a well-formed email and a non-empty password.
pub fn validate_login(email: &str, password: &str) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    check_email(&mut issues, email);
    if password.is_empty() {
        issues.push(ValidationIssue::new("password", IssueKind::Required));
    }
    if issues.is_empty() { Ok(()) } else { Err(issues) }
}

/// Checks every registration field, collecting all failures.
pub fn validate_registration(
    request: &RegisterRequest,
    today: NaiveDate,
) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    check_name(&mut issues, "firstName", &request.first_name);
    check_name(&mut issues, "lastName", &request.last_name);
    if check_length(&mut issues, "alias", &request.alias, 3, 20)
        && !ALIAS_PATTERN.is_match(&request.alias)
    {
        issues.push(ValidationIssue::new("alias", IssueKind::InvalidFormat));
    }
    check_email(&mut issues, &request.email);
    check_date_of_birth(&mut issues, &request.date_of_birth, today);
    check_password(&mut issues, &request.password);

    if issues.is_empty() { Ok(()) } else { Err(issues) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn valid_request() -> RegisterRequest {
        RegisterRequest {
            email: "maria@example.com".into(),
            password: "Passw0rdX".into(),
            first_name: "María José".into(),
            last_name: "Núñez".into(),
            alias: "maria_j".into(),
            date_of_birth: "1995-03-20".into(),
        }
    }

    fn fields(issues: &[ValidationIssue]) -> Vec<&'static str> {
        issues.iter().map(|i| i.field).collect()
    }

    #[test]
    fn test_valid_registration_passes() {
        assert!(validate_registration(&valid_request(), today()).is_ok());
    }

    #[test]
    fn test_names_must_be_letters() {
        let mut request = valid_request();
        request.first_name = "R2D2".into();
        request.last_name = "".into();

        let issues = validate_registration(&request, today()).unwrap_err();
        assert!(issues.contains(&ValidationIssue::new("firstName", IssueKind::InvalidFormat)));
        assert!(issues.contains(&ValidationIssue::new("lastName", IssueKind::Required)));
    }

    #[test]
    fn test_alias_rules() {
        let mut request = valid_request();
        request.alias = "ab".into();
        let issues = validate_registration(&request, today()).unwrap_err();
        assert_eq!(issues, vec![ValidationIssue::new("alias", IssueKind::TooShort { min: 3 })]);

        request.alias = "has space".into();
        let issues = validate_registration(&request, today()).unwrap_err();
        assert_eq!(issues, vec![ValidationIssue::new("alias", IssueKind::InvalidFormat)]);

        request.alias = "a".repeat(21);
        let issues = validate_registration(&request, today()).unwrap_err();
        assert_eq!(issues, vec![ValidationIssue::new("alias", IssueKind::TooLong { max: 20 })]);
    }

    #[test]
    fn test_age_bounds() {
        let mut request = valid_request();

        // Turns 13 tomorrow.
        request.date_of_birth = "2012-06-16".into();
        let issues = validate_registration(&request, today()).unwrap_err();
        assert_eq!(fields(&issues), vec!["dateOfBirth"]);
        assert!(matches!(issues[0].kind, IssueKind::TooYoung { min_age: 13 }));

        // Turns 13 today.
        request.date_of_birth = "2012-06-15".into();
        assert!(validate_registration(&request, today()).is_ok());

        request.date_of_birth = "1900-01-01".into();
        let issues = validate_registration(&request, today()).unwrap_err();
        assert!(matches!(issues[0].kind, IssueKind::TooOld { max_age: 120 }));

        request.date_of_birth = "15/06/2000".into();
        let issues = validate_registration(&request, today()).unwrap_err();
        assert_eq!(issues[0].kind, IssueKind::InvalidFormat);
    }

    #[test]
    fn test_password_needs_mixed_classes() {
        let mut request = valid_request();
        request.password = "alllowercase1".into();
        let issues = validate_registration(&request, today()).unwrap_err();
        assert_eq!(issues, vec![ValidationIssue::new("password", IssueKind::WeakPassword)]);

        request.password = "Sh0rt".into();
        let issues = validate_registration(&request, today()).unwrap_err();
        assert_eq!(
            issues,
            vec![ValidationIssue::new("password", IssueKind::TooShort { min: 8 })]
        );
    }

    #[test]
    fn test_collects_every_failure() {
        let request = RegisterRequest {
            email: "not-an-email".into(),
            password: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            alias: String::new(),
            date_of_birth: String::new(),
        };
        let issues = validate_registration(&request, today()).unwrap_err();
        assert_eq!(
            fields(&issues),
            vec!["firstName", "lastName", "alias", "email", "dateOfBirth", "password"]
        );
    }

    #[test]
    fn test_login_validation() {
        assert!(validate_login("a@b.com", "secret1A").is_ok());
        let issues = validate_login("a@b", "").unwrap_err();
        assert_eq!(fields(&issues), vec!["email", "password"]);
    }

    #[test]
    fn test_password_strength_scoring() {
        assert_eq!(password_strength("abc"), PasswordStrength::Weak);
        assert_eq!(password_strength("abcdefgh"), PasswordStrength::Weak);
        assert_eq!(password_strength("abcdefgH"), PasswordStrength::Medium);
        assert_eq!(password_strength("abcdefH1"), PasswordStrength::Strong);
    }
}
