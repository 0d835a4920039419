use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::{Notification, NotificationKind};

/// How long a notification stays visible without manual dismissal.
pub const AUTO_DISMISS_AFTER: Duration = Duration::from_secs(5);

/// Single-slot holder for the visible status message.
///
/// Showing a notification replaces the current one and restarts the dismiss
/// timer. Every change is published on a watch channel; `subscribe` is the
/// only way observers learn about state.
///
/// The dismiss timer runs on the ambient tokio runtime. Without one the
/// notification stays up until it is replaced or dismissed.
pub struct NotificationCenter {
    slot: Arc<watch::Sender<Option<Notification>>>,
    inner: Mutex<Inner>,
    dismiss_after: Duration,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    timer: Option<JoinHandle<()>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            slot: Arc::new(tx),
            inner: Mutex::new(Inner::default()),
            dismiss_after: AUTO_DISMISS_AFTER,
        }
    }

    pub fn show(&self, kind: NotificationKind, message: impl Into<String>) -> Notification {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }

        inner.next_id += 1;
        let notification = Notification {
            id: inner.next_id,
            kind,
            message: message.into(),
        };
        tracing::debug!(id = notification.id, %kind, "notification shown");
        self.slot.send_replace(Some(notification.clone()));

        let slot = Arc::clone(&self.slot);
        let id = notification.id;
        let after = self.dismiss_after;
        inner.timer = match Handle::try_current() {
            Ok(handle) => Some(handle.spawn(async move {
                tokio::time::sleep(after).await;
                clear_if_current(&slot, id);
            })),
            Err(_) => {
                tracing::warn!(id, "no tokio runtime, notification will not auto-dismiss");
                None
            }
        };

        notification
    }

    pub fn success(&self, message: impl Into<String>) -> Notification {
        self.show(NotificationKind::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Notification {
        self.show(NotificationKind::Error, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> Notification {
        self.show(NotificationKind::Warning, message)
    }

    pub fn dismiss(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
        self.slot.send_if_modified(|current| current.take().is_some());
    }

    pub fn current(&self) -> Option<Notification> {
        self.slot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.slot.subscribe()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NotificationCenter {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
    }
}

fn clear_if_current(slot: &watch::Sender<Option<Notification>>, id: u64) {
    slot.send_if_modified(|current| match current {
        Some(n) if n.id == id => {
            tracing::debug!(id, "notification expired");
            *current = None;
            true
        }
        _ => false,
    });
}
