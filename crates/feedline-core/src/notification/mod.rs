//! Toast notifications.
//!
//! - `model`: `Notification` and `Severity`
//! - `center`: `NotificationCenter`, the queue the UI renders from

mod center;
mod model;

pub use center::NotificationCenter;
pub use model::{Notification, Severity};
