//! Notification domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Visual severity of a toast notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    /// How long a toast of this severity stays visible unless told otherwise.
    pub fn default_duration(self) -> Duration {
        match self {
            Severity::Success => Duration::from_millis(3000),
            Severity::Error => Duration::from_millis(5000),
            Severity::Warning => Duration::from_millis(4000),
            Severity::Info => Duration::from_millis(3000),
        }
    }
}

/// A single toast shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub message: String,
    pub severity: Severity,
    /// Auto-dismiss delay in milliseconds. Zero keeps the toast until it is
    /// removed explicitly.
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity, duration: Duration) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            message: message.into(),
            severity,
            duration_ms: duration.as_millis() as u64,
            timestamp: Utc::now(),
        }
    }

    pub fn auto_dismiss_after(&self) -> Option<Duration> {
        (self.duration_ms > 0).then(|| Duration::from_millis(self.duration_ms))
    }
}
