use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::{Notification, NotificationKind};

/// Prints notification changes to stdout.
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, notification: &Notification) -> String {
        let mark = match notification.kind {
            NotificationKind::Success => "✓",
            NotificationKind::Error => "✗",
            NotificationKind::Warning => "!",
        };
        format!("[{}] {} {}", notification.kind, mark, notification.message)
    }

    pub fn print(&self, notification: &Notification) {
        println!("{}", self.render(notification));
    }

    /// Follows a notification slot until its sender goes away.
    pub fn spawn(self, mut rx: watch::Receiver<Option<Notification>>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let current = rx.borrow_and_update().clone();
                match current {
                    Some(n) => self.print(&n),
                    None => println!("(notification cleared)"),
                }
            }
        })
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}
