//! User-facing error notifications (toasts with a detail body).

/// A notification with a short title and a detail message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub detail: String,
}

/// Pending notifications, drained by whatever displays them.
#[derive(Debug, Default)]
pub struct Notifications {
    pending: Vec<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an error notification and logs it.
    pub fn error(&mut self, title: impl Into<String>, detail: impl Into<String>) {
        let notification = Notification {
            title: title.into(),
            detail: detail.into(),
        };
        log::error!("{}: {}", notification.title, notification.detail);
        self.pending.push(notification);
    }

    pub fn pending(&self) -> &[Notification] {
        &self.pending
    }

    /// Removes and returns every pending notification.
    pub fn take(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }
}
