//! Session domain model.
//!
//! A [`Session`] is the immutable snapshot the session manager publishes on
//! every transition. Nothing outside the manager mutates one.

use crate::user::User;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authentication state of the running client.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user_id: Option<i64>,
    /// Fetched after the tokens are established; may lag `authenticated`.
    pub current_user: Option<User>,
    pub authenticated: bool,
    /// Session generation. Changes on login, registration and logout so
    /// that late responses from a previous session can be told apart.
    pub epoch: u64,
    /// How the previous session ended; `None` while signed in or before
    /// the first sign-in.
    pub ended_by: Option<SignOutReason>,
}

/// Why a session was cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignOutReason {
    /// The user asked to sign out.
    Logout,
    /// The backend answered 401.
    Unauthorized,
    /// The stored tokens could not be refreshed.
    Expired,
}

impl SignOutReason {
    /// True when the user did not ask for the sign-out and should be told.
    pub fn is_involuntary(self) -> bool {
        !matches!(self, Self::Logout)
    }
}

impl Session {
    /// An empty, unauthenticated session of the given generation.
    pub fn signed_out(epoch: u64) -> Self {
        Self {
            epoch,
            ..Self::default()
        }
    }

    /// Like [`Session::signed_out`], remembering why the session ended.
    pub fn ended(epoch: u64, reason: SignOutReason) -> Self {
        Self {
            epoch,
            ended_by: Some(reason),
            ..Self::default()
        }
    }

    pub fn is_admin(&self) -> bool {
        self.current_user.as_ref().is_some_and(User::is_admin)
    }

    /// True when there is nothing left to clear.
    pub fn is_cleared(&self) -> bool {
        !self.authenticated
            && self.access_token.is_none()
            && self.refresh_token.is_none()
            && self.user_id.is_none()
            && self.current_user.is_none()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("user_id", &self.user_id)
            .field("current_user", &self.current_user)
            .field("authenticated", &self.authenticated)
            .field("epoch", &self.epoch)
            .field("ended_by", &self.ended_by)
            .finish()
    }
}

/// Token triple returned by login, registration and refresh.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: i64,
}

impl fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthTokens")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

/// Payload of `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Payload of `POST /auth/refresh`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// What the token store keeps between runs. All four values are written
/// together and cleared together.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: i64,
    /// Milliseconds since the epoch at which the tokens were stored.
    pub auth_timestamp: i64,
}

impl PersistedTokens {
    pub fn from_tokens(tokens: &AuthTokens, auth_timestamp: i64) -> Self {
        Self {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            user_id: tokens.user_id,
            auth_timestamp,
        }
    }
}

impl fmt::Debug for PersistedTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedTokens")
            .field("user_id", &self.user_id)
            .field("auth_timestamp", &self.auth_timestamp)
            .finish_non_exhaustive()
    }
}
