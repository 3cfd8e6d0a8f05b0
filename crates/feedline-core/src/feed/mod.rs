//! Feed domain module.
//!
//! # Module Structure
//!
//! - `model`: `FeedSnapshot`, `FeedSource`, `LikeOutcome`
//! - `reconciler`: `FeedReconciler`, optimistic like/unlike over the feed
//! - `error`: `FeedError`

mod error;
mod model;
mod reconciler;

// Re-export public API
pub use error::{FeedError, FeedResult};
pub use model::{FeedSnapshot, FeedSource, LikeOutcome};
pub use reconciler::{DEFAULT_LIKE_STATE_CONCURRENCY, FeedReconciler};
