//! Memory decay and review interval math
//!
//! Strength is a 0-100 retention estimate. It decays linearly from the last
//! review at a rate that depends on how strong the memory was, and the next
//! review is due after an interval that grows with strength:
//!
//! | strength | decay (points/day) | interval |
//! |----------|--------------------|----------|
//! | < 20     | 5                  | 1h       |
//! | 20-39    | 2                  | 1d       |
//! | 40-59    | 1                  | 2d       |
//! | 60-74    | 0.5                | 4d       |
//! | 75-89    | 0.2                | 1w       |
//! | >= 90    | 0.1                | 2w       |

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::{clamp_strength, NodeProgress, NodeStatus};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Cap on the overdue contribution to priority
pub const MAX_OVERDUE_HOURS: f64 = 200.0;

/// Decay rate in strength points per day
pub fn decay_rate(strength: f64) -> f64 {
    match strength {
        s if s < 20.0 => 5.0,
        s if s < 40.0 => 2.0,
        s if s < 60.0 => 1.0,
        s if s < 75.0 => 0.5,
        s if s < 90.0 => 0.2,
        _ => 0.1,
    }
}

/// Hours until the next review for a given strength
pub fn review_interval_hours(strength: f64) -> i64 {
    match strength {
        s if s < 20.0 => 1,
        s if s < 40.0 => 24,
        s if s < 60.0 => 48,
        s if s < 75.0 => 96,
        s if s < 90.0 => 168,
        _ => 336,
    }
}

/// `base + delta`, pinned to the latest representable time on overflow
fn saturating_add(base: DateTime<Utc>, delta: Duration) -> DateTime<Utc> {
    base.checked_add_signed(delta)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Strength lost since the last review. A node that was never reviewed has
/// not decayed, and decay never exceeds the stored strength.
pub fn memory_decay(node: &NodeProgress, now: DateTime<Utc>) -> f64 {
    let Some(last_reviewed) = node.last_reviewed else {
        return 0.0;
    };

    let strength = node.strength();
    let hours_since = hours_between(last_reviewed, now).max(0.0);
    let decay = (decay_rate(strength) * hours_since / 24.0).min(strength);
    decay.max(0.0)
}

/// Stored strength minus decay, clamped to [0, 100]
pub fn effective_strength(node: &NodeProgress, now: DateTime<Utc>) -> f64 {
    clamp_strength(node.strength() - memory_decay(node, now))
}

/// When the node should next be reviewed.
///
/// Never-reviewed nodes use the Unix epoch as their base, which puts them
/// permanently in the past so they surface for a first review.
pub fn due_date(node: &NodeProgress) -> DateTime<Utc> {
    let base = node.last_reviewed.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    saturating_add(base, Duration::hours(review_interval_hours(node.strength())))
}

/// Hours past the due date, zero when not yet due
pub fn hours_overdue(due: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    hours_between(due, now).max(0.0)
}

/// Due-ness of a date relative to `now`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueFlags {
    pub is_due: bool,
    pub is_due_today: bool,
    pub is_due_this_week: bool,
}

/// Midnight (UTC) at the start of the day after `now`
pub fn start_of_tomorrow(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    saturating_add(today, Duration::days(1))
}

pub fn classify(due: DateTime<Utc>, now: DateTime<Utc>) -> DueFlags {
    DueFlags {
        is_due: due <= now,
        is_due_today: due <= start_of_tomorrow(now),
        is_due_this_week: due <= saturating_add(now, Duration::days(7)),
    }
}

/// Review priority, higher first: flagged nodes get a fixed boost, overdue
/// time adds up to a cap, and weaker memories rank higher.
pub fn priority_score(node: &NodeProgress, now: DateTime<Utc>) -> f64 {
    let flagged = if node.status == NodeStatus::NeedsReview {
        200.0
    } else {
        0.0
    };
    let overdue = hours_overdue(due_date(node), now).min(MAX_OVERDUE_HOURS);
    flagged + overdue + (100.0 - effective_strength(node, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, 15, 30, 0).unwrap()
    }

    fn reviewed(strength: f64, ago: Duration) -> NodeProgress {
        let mut node = NodeProgress::new("n");
        node.understood = true;
        node.status = NodeStatus::Understood;
        node.memory_strength = Some(strength);
        node.last_reviewed = Some(now() - ago);
        node
    }

    #[test]
    fn test_decay_rate_brackets() {
        assert_eq!(decay_rate(0.0), 5.0);
        assert_eq!(decay_rate(19.9), 5.0);
        assert_eq!(decay_rate(20.0), 2.0);
        assert_eq!(decay_rate(40.0), 1.0);
        assert_eq!(decay_rate(60.0), 0.5);
        assert_eq!(decay_rate(75.0), 0.2);
        assert_eq!(decay_rate(90.0), 0.1);
        assert_eq!(decay_rate(100.0), 0.1);
    }

    #[test]
    fn test_interval_brackets() {
        assert_eq!(review_interval_hours(0.0), 1);
        assert_eq!(review_interval_hours(39.0), 24);
        assert_eq!(review_interval_hours(59.0), 48);
        assert_eq!(review_interval_hours(74.0), 96);
        assert_eq!(review_interval_hours(89.0), 168);
        assert_eq!(review_interval_hours(95.0), 336);
    }

    #[test]
    fn test_never_reviewed_has_no_decay() {
        let mut node = NodeProgress::new("n");
        node.memory_strength = Some(80.0);
        for days in [0, 1, 365, 10_000] {
            assert_eq!(memory_decay(&node, now() + Duration::days(days)), 0.0);
        }
    }

    #[test]
    fn test_mid_strength_decays_one_point_per_day() {
        let node = reviewed(50.0, Duration::days(10));
        assert!((memory_decay(&node, now()) - 10.0).abs() < 1e-9);
        assert!((effective_strength(&node, now()) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_strong_memory_decays_slowly() {
        let node = reviewed(95.0, Duration::days(30));
        assert!((memory_decay(&node, now()) - 3.0).abs() < 1e-9);
        assert!((effective_strength(&node, now()) - 92.0).abs() < 1e-9);
    }

    #[test]
    fn test_decay_never_exceeds_strength() {
        let node = reviewed(10.0, Duration::days(400));
        assert_eq!(memory_decay(&node, now()), 10.0);
        assert_eq!(effective_strength(&node, now()), 0.0);
    }

    #[test]
    fn test_effective_strength_non_increasing_over_time() {
        for strength in [0.0, 15.0, 35.0, 55.0, 70.0, 85.0, 99.0, 100.0] {
            let node = reviewed(strength, Duration::zero());
            let mut previous = f64::MAX;
            for hours in (0..2000).step_by(7) {
                let s = effective_strength(&node, now() + Duration::hours(hours));
                assert!(s <= previous, "strength {} rose at {}h", strength, hours);
                assert!((0.0..=100.0).contains(&s));
                previous = s;
            }
        }
    }

    #[test]
    fn test_due_date_non_decreasing_in_strength() {
        let mut previous = DateTime::<Utc>::MIN_UTC;
        for strength in 0..=100 {
            let due = due_date(&reviewed(strength as f64, Duration::days(1)));
            assert!(due >= previous);
            previous = due;
        }
    }

    #[test]
    fn test_never_reviewed_is_due_immediately() {
        let node = NodeProgress::new("n");
        let due = due_date(&node);
        assert_eq!(due, DateTime::<Utc>::UNIX_EPOCH + Duration::hours(1));
        assert!(classify(due, now()).is_due);
    }

    #[test]
    fn test_classify_windows() {
        let n = now();
        let flags = classify(n + Duration::hours(3), n);
        assert!(!flags.is_due);
        assert!(flags.is_due_today);
        assert!(flags.is_due_this_week);

        let flags = classify(n + Duration::days(2), n);
        assert!(!flags.is_due_today);
        assert!(flags.is_due_this_week);

        let flags = classify(n + Duration::days(8), n);
        assert!(!flags.is_due_this_week);
    }

    #[test]
    fn test_far_future_review_saturates() {
        let mut node = reviewed(95.0, Duration::zero());
        node.last_reviewed = Some(DateTime::<Utc>::MAX_UTC - Duration::hours(1));

        let due = due_date(&node);
        assert_eq!(due, DateTime::<Utc>::MAX_UTC);

        let flags = classify(due, DateTime::<Utc>::MAX_UTC);
        assert!(flags.is_due && flags.is_due_today && flags.is_due_this_week);
        assert!(!classify(due, now()).is_due);
        assert!(priority_score(&node, now()).is_finite());
    }

    #[test]
    fn test_priority_components() {
        // due 2 days after review at strength 50; reviewed 10 days ago
        let node = reviewed(50.0, Duration::days(10));
        let expected = 192.0_f64.min(MAX_OVERDUE_HOURS) + (100.0 - 40.0);
        assert!((priority_score(&node, now()) - expected).abs() < 1e-9);

        let mut flagged = node.clone();
        flagged.status = NodeStatus::NeedsReview;
        assert!((priority_score(&flagged, now()) - expected - 200.0).abs() < 1e-9);
        assert_eq!(priority_score(&flagged, now()), priority_score(&flagged, now()));
    }
}
