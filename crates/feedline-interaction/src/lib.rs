//! HTTP transport for the Feedline backend.

mod auth;
mod backend;
mod feed;

pub use backend::HttpBackend;
