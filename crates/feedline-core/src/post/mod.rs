//! Post domain module.

mod model;

pub use model::{CreateLikeRequest, CreatePostRequest, Like, Post};
