//! Ephemeral user-facing notifications (toasts).
//!
//! Every notification gets a monotonic id and one removal timer, spawned on
//! the current tokio runtime when the notification is pushed. Dismissing a
//! notification removes it immediately and aborts its timer, so a
//! notification is removed exactly once.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::AbortHandle;

/// Default lifetime of a notification.
pub const DEFAULT_TTL: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
}

struct Entry {
    notification: Notification,
    timer: Option<AbortHandle>,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    entries: Vec<Entry>,
}

impl Inner {
    fn remove(&mut self, id: u64) -> Option<Entry> {
        let pos = self.entries.iter().position(|e| e.notification.id == id)?;
        Some(self.entries.remove(pos))
    }
}

/// Abort outstanding timers when the last queue handle goes away.
impl Drop for Inner {
    fn drop(&mut self) {
        for entry in &self.entries {
            if let Some(timer) = &entry.timer {
                timer.abort();
            }
        }
    }
}

/// Shared queue of active notifications, oldest first.
#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<Mutex<Inner>>,
    ttl: Duration,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl NotificationQueue {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            ttl,
        }
    }

    /// Add a notification and schedule its removal. Returns its id.
    ///
    /// Outside a tokio runtime no timer can be scheduled; the notification
    /// then stays until dismissed.
    pub fn push(&self, message: impl Into<String>, severity: Severity) -> u64 {
        let message = message.into();
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;

        let timer = match tokio::runtime::Handle::try_current() {
            Ok(handle) => Some(
                handle
                    .spawn(expire(Arc::downgrade(&self.inner), id, self.ttl))
                    .abort_handle(),
            ),
            Err(_) => {
                tracing::warn!(id, "No runtime available, notification will not expire");
                None
            }
        };

        tracing::debug!(id, ?severity, message = %message, "Notification pushed");
        inner.entries.push(Entry {
            notification: Notification {
                id,
                message,
                severity,
            },
            timer,
        });
        id
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.push(message, Severity::Info)
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(message, Severity::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(message, Severity::Error)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.push(message, Severity::Warning)
    }

    /// Remove a notification now and cancel its scheduled removal.
    ///
    /// Returns false if it was already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        let removed = self.inner.lock().remove(id);
        match removed {
            Some(entry) => {
                if let Some(timer) = &entry.timer {
                    timer.abort();
                }
                true
            }
            None => false,
        }
    }

    /// Dismiss the oldest notification, if any.
    pub fn dismiss_oldest(&self) -> bool {
        let oldest = self
            .inner
            .lock()
            .entries
            .first()
            .map(|e| e.notification.id);
        oldest.is_some_and(|id| self.dismiss(id))
    }

    /// Snapshot of active notifications, oldest first.
    pub fn active(&self) -> Vec<Notification> {
        self.inner
            .lock()
            .entries
            .iter()
            .map(|e| e.notification.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    #[cfg(test)]
    fn has_timer(&self, id: u64) -> bool {
        self.inner
            .lock()
            .entries
            .iter()
            .any(|e| e.notification.id == id && e.timer.is_some())
    }
}

async fn expire(inner: Weak<Mutex<Inner>>, id: u64, ttl: Duration) {
    tokio::time::sleep(ttl).await;
    if let Some(inner) = inner.upgrade() {
        if inner.lock().remove(id).is_some() {
            tracing::trace!(id, "Notification expired");
        }
    }
}
