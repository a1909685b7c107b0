//! Push-channel reconnection policy
//!
//! Every close, whatever its cause, schedules exactly one new attempt after a
//! fixed delay. There is no backoff and no retry cap.

use std::fmt;
use std::time::{Duration, Instant};

use super::constants::RECONNECT_DELAY;

/// Why the channel went away
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseKind {
    /// Close handshake completed
    Clean { code: u16, reason: String },
    /// Connection dropped without a close handshake
    Lost(String),
    /// The connection could not be opened
    ConnectFailed(String),
}

impl CloseKind {
    pub fn is_clean(&self) -> bool {
        matches!(self, CloseKind::Clean { .. })
    }
}

impl fmt::Display for CloseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseKind::Clean { code, reason } if reason.is_empty() => {
                write!(f, "closed cleanly (code {})", code)
            }
            CloseKind::Clean { code, reason } => {
                write!(f, "closed cleanly (code {}, reason {})", code, reason)
            }
            CloseKind::Lost(e) => write!(f, "connection lost: {}", e),
            CloseKind::ConnectFailed(e) => write!(f, "connect failed: {}", e),
        }
    }
}

/// Fixed-delay reconnection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: RECONNECT_DELAY,
        }
    }
}

impl ReconnectPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule the single attempt that follows a close.
    ///
    /// The close reason is accepted for logging symmetry only; it never
    /// changes the delay.
    pub fn schedule(&self, closed_at: Instant, _kind: &CloseKind) -> ReconnectSchedule {
        ReconnectSchedule {
            due_at: closed_at + self.delay,
        }
    }
}

/// A pending reconnect attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectSchedule {
    due_at: Instant,
}

impl ReconnectSchedule {
    pub fn due_at(&self) -> Instant {
        self.due_at
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.due_at
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.due_at.saturating_duration_since(now)
    }
}
