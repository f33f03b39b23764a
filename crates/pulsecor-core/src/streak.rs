//! Consecutive-day check-in streak recurrence.
//!
//! The incremental path ([`compute_new_streak`] / [`StreakUpdate::apply`])
//! is authoritative and runs exactly once per completed check-in. The
//! retrospective scan ([`longest_streak_from_history`]) exists for
//! backfill/repair only; the two are reconciled explicitly, never assumed
//! consistent.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Streak fields to write back to the user row after a completed check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakUpdate {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_check_in: NaiveDate,
}

impl StreakUpdate {
    /// Compute the update for a check-in completed on `today`.
    pub fn apply(
        last_check_in: Option<NaiveDate>,
        current_streak: u32,
        longest_streak: u32,
        today: NaiveDate,
    ) -> Self {
        let current = compute_new_streak(last_check_in, current_streak, today);
        Self {
            current_streak: current,
            longest_streak: longest_streak.max(current),
            // Same-day re-check-in keeps the original date; a skewed clock
            // must not move last_check_in backwards.
            last_check_in: match last_check_in {
                Some(last) if last >= today => last,
                _ => today,
            },
        }
    }
}

/// The streak recurrence.
///
/// - no previous check-in: streak becomes 1
/// - exactly one day since the last: streak + 1
/// - more than one day: reset to 1
/// - zero or negative days (same-day re-check-in, clock skew): unchanged
///
/// The last rule makes the function idempotent for a given `today`, so
/// invoking it twice for the same day cannot inflate the streak.
pub fn compute_new_streak(
    last_check_in: Option<NaiveDate>,
    current_streak: u32,
    today: NaiveDate,
) -> u32 {
    let Some(last) = last_check_in else {
        return 1;
    };
    let days = (today - last).num_days();
    if days == 1 {
        current_streak + 1
    } else if days > 1 {
        1
    } else {
        current_streak
    }
}

/// Longest run of consecutive days in a check-in history.
///
/// `days` must be sorted ascending; duplicate days are tolerated and do not
/// break a run. Used to repair stored streak values, independent of the
/// incremental path.
pub fn longest_streak_from_history(days: &[NaiveDate]) -> u32 {
    let mut longest: u32 = 0;
    let mut run: u32 = 0;
    let mut prev: Option<NaiveDate> = None;

    for &day in days {
        run = match prev {
            None => 1,
            Some(p) if (day - p).num_days() == 1 => run + 1,
            Some(p) if day == p => run,
            Some(_) => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }
    longest
}

/// Current streak ending today (or yesterday, pending today's check-in),
/// recomputed from history. Repair companion to [`compute_new_streak`].
pub fn current_streak_from_history(days: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut expected = today;

    for &day in days.iter().rev() {
        if day == expected {
            streak += 1;
            expected = expected.pred_opt().unwrap_or(expected);
        } else if day < expected {
            // Allow the streak to start yesterday when today is unchecked.
            if streak == 0 && day == today.pred_opt().unwrap_or(today) {
                streak = 1;
                expected = day.pred_opt().unwrap_or(day);
            } else {
                break;
            }
        }
        // day > expected means a duplicate of an already-counted day; skip.
    }
    streak
}
