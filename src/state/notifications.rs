// Notification state.
// The CORS misconfiguration flag and transient messages shown in the status bar.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// How long a transient message stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Oldest messages are dropped beyond this many.
const MAX_NOTICES: usize = 20;

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

/// A transient message.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    expires_at: Instant,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
            expires_at: Instant::now() + ttl,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message, NOTICE_TTL)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warn, message, NOTICE_TTL)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message, NOTICE_TTL)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Default)]
struct NotificationState {
    cors_violation: bool,
    notices: VecDeque<Notice>,
}

/// Shared notification context, cloned into background tasks.
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    state: Arc<Mutex<NotificationState>>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, NotificationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_cors_violation(&self) {
        self.state().cors_violation = true;
    }

    pub fn clear_cors_violation(&self) {
        self.state().cors_violation = false;
    }

    pub fn cors_violation(&self) -> bool {
        self.state().cors_violation
    }

    pub fn push(&self, notice: Notice) {
        let mut state = self.state();
        state.notices.push_back(notice);
        while state.notices.len() > MAX_NOTICES {
            state.notices.pop_front();
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(Notice::info(message));
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.push(Notice::warn(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(Notice::error(message));
    }

    /// Drop expired messages and return the newest remaining one.
    pub fn current(&self) -> Option<Notice> {
        self.current_at(Instant::now())
    }

    fn current_at(&self, now: Instant) -> Option<Notice> {
        let mut state = self.state();
        state.notices.retain(|notice| !notice.is_expired(now));
        state.notices.back().cloned()
    }

    pub fn dismiss(&self) {
        self.state().notices.clear();
    }
}
