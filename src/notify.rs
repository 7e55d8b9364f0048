use std::time::Duration;

use chrono::Utc;

use crate::page::{Page, Toast};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
    Warning,
}

impl NoticeKind {
    pub fn title(self) -> &'static str {
        match self {
            NoticeKind::Info => "Evently",
            NoticeKind::Success => "Success",
            NoticeKind::Error => "Error",
            NoticeKind::Warning => "Warning",
        }
    }

    pub fn header_class(self) -> &'static str {
        match self {
            NoticeKind::Info => "toast-header",
            NoticeKind::Success => "toast-header bg-success text-white",
            NoticeKind::Error => "toast-header bg-danger text-white",
            NoticeKind::Warning => "toast-header bg-warning",
        }
    }
}

/// User-visible ephemeral feedback. Implementations must never fail.
pub trait NotificationChannel: Send + Sync {
    fn notify(&self, message: &str, kind: NoticeKind);

    fn success(&self, message: &str) {
        self.notify(message, NoticeKind::Success);
    }

    fn error(&self, message: &str) {
        self.notify(message, NoticeKind::Error);
    }

    fn warning(&self, message: &str) {
        self.notify(message, NoticeKind::Warning);
    }
}

/// Shows toasts on the page's `#toast` surface.
pub struct ToastChannel {
    page: Page,
    ttl: Duration,
}

impl ToastChannel {
    pub fn new(page: Page, ttl: Duration) -> Self {
        Self { page, ttl }
    }
}

impl NotificationChannel for ToastChannel {
    fn notify(&self, message: &str, kind: NoticeKind) {
        if !self.page.has_toast_surface() {
            tracing::error!("toast elements not found; dropping {:?}: {message}", kind);
            return;
        }
        let shown_at = Utc::now();
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::zero());
        self.page.push_toast(Toast {
            kind,
            message: message.to_string(),
            shown_at,
            expires_at: shown_at + ttl,
        });
    }
}
