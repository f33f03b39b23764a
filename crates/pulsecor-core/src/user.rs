//! User profile and streak state.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::streak::StreakUpdate;

/// The single mutable per-user row: identity plus streak state.
///
/// Streak fields change exactly once per completed check-in, via a
/// [`StreakUpdate`] applied together with the check-in insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_check_in_date: Option<NaiveDate>,
    pub current_streak: u32,
    pub longest_streak: u32,
}

impl UserProfile {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            created_at: Utc::now(),
            last_check_in_date: None,
            current_streak: 0,
            longest_streak: 0,
        }
    }

    /// Compute this user's streak update for a check-in completed today.
    pub fn streak_update(&self, today: NaiveDate) -> StreakUpdate {
        StreakUpdate::apply(
            self.last_check_in_date,
            self.current_streak,
            self.longest_streak,
            today,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_user_first_check_in() {
        let user = UserProfile::new(1, "Maya");
        let today = NaiveDate::from_ymd_opt(2025, 11, 14).unwrap();
        let update = user.streak_update(today);
        assert_eq!(update.current_streak, 1);
        assert_eq!(update.longest_streak, 1);
        assert_eq!(update.last_check_in, today);
    }
}
