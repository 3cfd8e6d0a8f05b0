use super::model::{Notification, Severity};
use crate::api::ErrorMessage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// In-memory toast queue.
///
/// Every change publishes the full list; subscribers re-render from it.
/// Toasts with a non-zero duration remove themselves once it elapses, which
/// requires a Tokio runtime. Outside one, they stay until removed.
#[derive(Clone)]
pub struct NotificationCenter {
    notifications: Arc<watch::Sender<Vec<Notification>>>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        let (notifications, _) = watch::channel(Vec::new());
        Self {
            notifications: Arc::new(notifications),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.notifications.subscribe()
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.notifications.borrow().clone()
    }

    /// Queues a toast and returns its id.
    pub fn show(&self, message: impl Into<String>, severity: Severity, duration: Duration) -> String {
        let notification = Notification::new(message, severity, duration);
        let id = notification.id.clone();
        let auto_dismiss = notification.auto_dismiss_after();

        tracing::debug!(id = %id, ?severity, "Showing notification");
        self.notifications
            .send_modify(|list| list.push(notification));

        if let Some(delay) = auto_dismiss {
            self.schedule_removal(id.clone(), delay);
        }
        id
    }

    pub fn show_success(&self, message: impl Into<String>) -> String {
        self.show(message, Severity::Success, Severity::Success.default_duration())
    }

    pub fn show_error(&self, message: impl Into<String>) -> String {
        self.show(message, Severity::Error, Severity::Error.default_duration())
    }

    pub fn show_warning(&self, message: impl Into<String>) -> String {
        self.show(message, Severity::Warning, Severity::Warning.default_duration())
    }

    pub fn show_info(&self, message: impl Into<String>) -> String {
        self.show(message, Severity::Info, Severity::Info.default_duration())
    }

    /// Shows a backend error with the severity it was classified under.
    pub fn report(&self, error: &ErrorMessage) -> String {
        self.show(error.summary(), error.severity, error.severity.default_duration())
    }

    /// Returns false if the toast was already gone.
    pub fn remove(&self, id: &str) -> bool {
        self.notifications.send_if_modified(|list| {
            let before = list.len();
            list.retain(|n| n.id != id);
            list.len() != before
        })
    }

    pub fn clear_all(&self) {
        self.notifications.send_if_modified(|list| {
            if list.is_empty() {
                return false;
            }
            list.clear();
            true
        });
    }

    fn schedule_removal(&self, id: String, delay: Duration) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(id = %id, "No runtime; notification will not auto-dismiss");
            return;
        };
        let center = self.clone();
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            center.remove(&id);
        });
    }
}
