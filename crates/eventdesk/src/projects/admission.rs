use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{PolicyConfig, ScheduleWindow};

/// Whether a project currently accepts registrations, and if not, why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionState {
    Open,
    Closed,
    NotStarted,
    Ended,
    Full,
}

impl AdmissionState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::NotStarted => "not_started",
            Self::Ended => "ended",
            Self::Full => "full",
        }
    }

    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// User-facing explanation shown on the call-to-action or the rejection page.
    pub const fn message(self) -> &'static str {
        match self {
            Self::Open => "Registration is open.",
            Self::Closed => "Registration is not available for this event.",
            Self::NotStarted => "The application period has not started yet.",
            Self::Ended => "The application period has ended.",
            Self::Full => "All places for this event have been filled.",
        }
    }
}

/// Classifies registration availability. First matching rule wins:
/// disabled form, before the window, after the window, capacity reached.
pub fn evaluate(
    now: DateTime<Utc>,
    schedule: &ScheduleWindow,
    policy: &PolicyConfig,
    registration_count: u64,
    enabled: bool,
) -> AdmissionState {
    if !enabled {
        return AdmissionState::Closed;
    }

    if let Some(start) = schedule.application_start {
        if now < start {
            return AdmissionState::NotStarted;
        }
    }

    if let Some(end) = schedule.application_end {
        if now > end {
            return AdmissionState::Ended;
        }
    }

    if let Some(capacity) = policy.capacity() {
        if registration_count >= capacity {
            return AdmissionState::Full;
        }
    }

    AdmissionState::Open
}
