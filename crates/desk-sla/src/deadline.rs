//! Deadline computation and time-remaining display.
//!
//! Both functions are pure: callers pass "now" explicitly so that display
//! code can re-evaluate on every clock tick without hidden state.

use serde::{Deserialize, Serialize};

use desk_types::Timestamp;

use crate::policy::SlaTarget;

/// Deadline for a target measured from `created_at`. No target, no deadline.
///
/// A deadline past the representable timestamp range is also treated as no
/// deadline.
pub fn compute_deadline<T: SlaTarget>(created_at: Timestamp, target: Option<&T>) -> Option<Timestamp> {
    let duration = target?.duration();
    let deadline = created_at.checked_add_signed(duration);
    if deadline.is_none() {
        tracing::warn!(%created_at, ?duration, "SLA deadline out of range");
    }
    deadline
}

/// Remaining time until a deadline, formatted for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRemaining {
    pub overdue: bool,
    pub human_text: String,
}

impl TimeRemaining {
    fn overdue() -> Self {
        Self {
            overdue: true,
            human_text: "Overdue".to_string(),
        }
    }
}

/// Format the time left until `deadline`.
///
/// A deadline strictly before `now` is `Overdue`. Otherwise the remaining
/// duration renders as `{days}d {hours}h` when at least 24 hours remain,
/// else `{hours}h {minutes}m`. Partial minutes are truncated.
pub fn format_time_remaining(deadline: Timestamp, now: Timestamp) -> TimeRemaining {
    if deadline < now {
        return TimeRemaining::overdue();
    }

    let remaining = deadline - now;
    let total_minutes = remaining.num_minutes();
    let total_hours = total_minutes / 60;

    let human_text = if total_hours >= 24 {
        format!("{}d {}h", total_hours / 24, total_hours % 24)
    } else {
        format!("{}h {}m", total_hours, total_minutes % 60)
    };

    TimeRemaining {
        overdue: false,
        human_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{FirstResponseTarget, ResolutionTarget};
    use chrono::Duration;
    use desk_types::{format_timestamp, parse_timestamp};

    fn ts(s: &str) -> Timestamp {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn first_response_deadline_adds_hours_and_minutes() {
        let created = ts("2024-01-15T10:00:00Z");
        let deadline = compute_deadline(created, Some(&FirstResponseTarget::new(1, 0))).unwrap();
        assert_eq!(format_timestamp(&deadline), "2024-01-15T11:00:00Z");

        let deadline = compute_deadline(created, Some(&FirstResponseTarget::new(0, 45))).unwrap();
        assert_eq!(format_timestamp(&deadline), "2024-01-15T10:45:00Z");
    }

    #[test]
    fn resolution_deadline_adds_days_and_hours() {
        let created = ts("2024-01-15T10:00:00Z");
        let deadline = compute_deadline(created, Some(&ResolutionTarget::new(2, 6))).unwrap();
        assert_eq!(format_timestamp(&deadline), "2024-01-17T16:00:00Z");
    }

    #[test]
    fn missing_target_has_no_deadline() {
        let created = ts("2024-01-15T10:00:00Z");
        assert!(compute_deadline::<ResolutionTarget>(created, None).is_none());
    }

    #[test]
    fn out_of_range_deadline_is_dropped() {
        let created = ts("2024-01-15T10:00:00Z");
        assert!(compute_deadline(created, Some(&ResolutionTarget::new(u32::MAX, 23))).is_none());
        assert!(compute_deadline(Timestamp::MAX_UTC, Some(&FirstResponseTarget::new(1, 0))).is_none());
    }

    #[test]
    fn past_deadline_is_overdue() {
        let now = ts("2024-01-15T12:00:00Z");
        let remaining = format_time_remaining(now - Duration::hours(2), now);
        assert_eq!(
            remaining,
            TimeRemaining {
                overdue: true,
                human_text: "Overdue".into()
            }
        );
    }

    #[test]
    fn under_a_day_shows_hours_and_minutes() {
        let now = ts("2024-01-15T12:00:00Z");
        let remaining = format_time_remaining(now + Duration::minutes(3 * 60 + 25), now);
        assert!(!remaining.overdue);
        assert_eq!(remaining.human_text, "3h 25m");
    }

    #[test]
    fn a_day_or_more_shows_days_and_hours() {
        let now = ts("2024-01-15T12:00:00Z");
        assert_eq!(format_time_remaining(now + Duration::hours(24), now).human_text, "1d 0h");
        assert_eq!(
            format_time_remaining(now + Duration::hours(53) + Duration::minutes(59), now).human_text,
            "2d 5h"
        );
    }

    #[test]
    fn deadline_equal_to_now_is_not_overdue() {
        let now = ts("2024-01-15T12:00:00Z");
        let remaining = format_time_remaining(now, now);
        assert!(!remaining.overdue);
        assert_eq!(remaining.human_text, "0h 0m");
    }

    #[test]
    fn partial_minutes_truncate() {
        let now = ts("2024-01-15T12:00:00Z");
        let remaining = format_time_remaining(now + Duration::seconds(59), now);
        assert_eq!(remaining.human_text, "0h 0m");
    }
}
