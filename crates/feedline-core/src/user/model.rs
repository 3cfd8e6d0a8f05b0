//! User domain model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role string the backend assigns to administrators.
pub const ADMIN_ROLE: &str = "ADMIN";

/// A user profile as returned by `GET /auth/users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub alias: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub created_at: String,
}

impl User {
    /// Client-side role check. The backend remains the authority on what an
    /// administrator may do.
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Payload of `POST /auth/register`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub alias: String,
    /// `YYYY-MM-DD`
    pub date_of_birth: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("alias", &self.alias)
            .field("date_of_birth", &self.date_of_birth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserializes_camel_case() {
        let json = r#"{
            "id": 7,
            "firstName": "Ana",
            "lastName": "Lopez",
            "alias": "ana_l",
            "email": "ana@example.com",
            "role": "ADMIN",
            "dateOfBirth": "1990-04-02",
            "createdAt": "2024-01-01T10:00:00"
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.alias, "ana_l");
        assert!(user.is_admin());
        assert_eq!(user.display_name(), "Ana Lopez");
    }

    #[test]
    fn test_missing_role_is_not_admin() {
        let json = r#"{"id":1,"firstName":"A","lastName":"B","alias":"ab1","email":"a@b.com"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(!user.is_admin());
    }

    #[test]
    fn test_register_request_debug_hides_password() {
        let request = RegisterRequest {
            email: "a@b.com".into(),
            password: "Secret123".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            alias: "ab1".into(),
            date_of_birth: "2000-01-01".into(),
        };
        let rendered = format!("{:?}", request);
        assert!(!rendered.contains("Secret123"));
    }
}
