use std::{fmt, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use tracker_core::Clock;
use uuid::Uuid;

pub const DEFAULT_DURATION_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastVariant {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            ToastVariant::Success => "success",
            ToastVariant::Error => "error",
            ToastVariant::Warning => "warning",
            ToastVariant::Info => "info",
        }
    }
}

impl fmt::Display for ToastVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NotificationPosition {
    #[default]
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
    TopCenter,
    BottomCenter,
}

impl NotificationPosition {
    pub const ALL: [NotificationPosition; 6] = [
        NotificationPosition::TopRight,
        NotificationPosition::TopLeft,
        NotificationPosition::BottomRight,
        NotificationPosition::BottomLeft,
        NotificationPosition::TopCenter,
        NotificationPosition::BottomCenter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NotificationPosition::TopRight => "top-right",
            NotificationPosition::TopLeft => "top-left",
            NotificationPosition::BottomRight => "bottom-right",
            NotificationPosition::BottomLeft => "bottom-left",
            NotificationPosition::TopCenter => "top-center",
            NotificationPosition::BottomCenter => "bottom-center",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub title: Option<String>,
    pub message: String,
    pub variant: ToastVariant,
    pub duration_ms: u64,
    pub position: NotificationPosition,
    pub auto_close: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// `None` when the duration runs past the representable date range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let millis = i64::try_from(self.duration_ms).ok()?;
        self.created_at
            .checked_add_signed(Duration::try_milliseconds(millis)?)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.auto_close && self.expires_at().is_some_and(|at| at <= now)
    }
}

/// Toast queue. Auto-closing toasts disappear once the clock passes their
/// duration; nothing runs in the background.
pub struct NotificationCenter {
    clock: Arc<dyn Clock>,
    default_duration_ms: u64,
    notifications: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_default_duration(clock, DEFAULT_DURATION_MS)
    }

    /// Zero falls back to the 5 second default.
    pub fn with_default_duration(clock: Arc<dyn Clock>, duration_ms: u64) -> Self {
        Self {
            clock,
            default_duration_ms: if duration_ms == 0 {
                DEFAULT_DURATION_MS
            } else {
                duration_ms
            },
            notifications: Vec::new(),
        }
    }

    /// Adds a toast. `duration_ms` of `None` or zero uses the default.
    pub fn add(
        &mut self,
        message: impl Into<String>,
        variant: ToastVariant,
        duration_ms: Option<u64>,
        position: Option<NotificationPosition>,
        auto_close: Option<bool>,
    ) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            title: None,
            message: message.into(),
            variant,
            duration_ms: duration_ms
                .filter(|ms| *ms > 0)
                .unwrap_or(self.default_duration_ms),
            position: position.unwrap_or_default(),
            auto_close: auto_close.unwrap_or(true),
            created_at: self.clock.now(),
        };
        let id = notification.id;
        debug!(%id, variant = %variant, "notification added");
        self.notifications.push(notification);
        id
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        before != self.notifications.len()
    }

    pub fn clear_all(&mut self) {
        self.notifications.clear();
    }

    pub fn show_toast(
        &mut self,
        message: impl Into<String>,
        variant: ToastVariant,
        duration_ms: Option<u64>,
    ) -> Uuid {
        self.add(message, variant, duration_ms, None, None)
    }

    pub fn show_success(&mut self, message: impl Into<String>) -> Uuid {
        self.show_toast(message, ToastVariant::Success, None)
    }

    pub fn show_error(&mut self, message: impl Into<String>) -> Uuid {
        self.show_toast(message, ToastVariant::Error, None)
    }

    pub fn show_warning(&mut self, message: impl Into<String>) -> Uuid {
        self.show_toast(message, ToastVariant::Warning, None)
    }

    pub fn show_info(&mut self, message: impl Into<String>) -> Uuid {
        self.show_toast(message, ToastVariant::Info, None)
    }

    /// Drops expired auto-closing toasts and returns how many went.
    pub fn prune_expired(&mut self) -> usize {
        let now = self.clock.now();
        let before = self.notifications.len();
        self.notifications.retain(|n| !n.is_expired(now));
        before - self.notifications.len()
    }

    pub fn active(&mut self) -> &[Notification] {
        self.prune_expired();
        &self.notifications
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}
