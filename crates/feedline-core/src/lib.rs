//! Client core of the Feedline social feed.
//!
//! Two stateful components live here:
//!
//! - [`session::SessionManager`] owns the token lifecycle and publishes
//!   [`session::Session`] snapshots.
//! - [`feed::FeedReconciler`] owns the post collection and applies
//!   optimistic like/unlike with rollback.
//!
//! Everything that talks to the outside world is a trait: [`api::AuthApi`],
//! [`api::FeedApi`], [`session::TokenStore`] and [`navigation::Navigator`].

pub mod api;
pub mod config;
pub mod error;
pub mod feed;
pub mod navigation;
pub mod notification;
pub mod post;
pub mod session;
pub mod user;

// Re-export common error type
pub use error::{FeedlineError, Result};
