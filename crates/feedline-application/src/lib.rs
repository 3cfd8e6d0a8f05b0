//! Application layer for Feedline.
//!
//! This crate provides the use cases a front end calls, coordinating the
//! session and feed components from `feedline-core` with the HTTP and
//! storage implementations.

pub mod client;
pub mod error;

pub use client::FeedlineClient;
pub use error::{ClientError, ClientResult};
