//! Session domain module.
//!
//! This module contains the authentication state machine: the published
//! [`Session`] snapshot, token expiry rules, the token store interface and
//! the [`SessionManager`] that ties them together.
//!
//! # Module Structure
//!
//! - `model`: Session snapshot and wire types (`AuthTokens`, `Credentials`)
//! - `token`: Expiry decoding for access and refresh tokens
//! - `repository`: Token store trait for persistence
//! - `manager`: Session lifecycle management (`SessionManager`)
//! - `error`: `AuthError`
//!
//! # Usage
//!
//! ```ignore
//! use feedline_core::session::{Session, SessionManager, TokenStore};
//! ```

mod error;
mod manager;
mod model;
mod repository;
pub mod token;

// Re-export public API
pub use error::AuthError;
pub use manager::{AuthResult, SessionManager};
pub use model::{AuthTokens, Credentials, PersistedTokens, RefreshRequest, Session, SignOutReason};
pub use repository::TokenStore;
