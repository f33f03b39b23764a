use chrono::Local;
use clap::Subcommand;
use pulsecor_core::storage::Database;
use pulsecor_core::streak::{current_streak_from_history, longest_streak_from_history};
use serde::Serialize;

#[derive(Subcommand)]
pub enum StreakAction {
    /// Current and longest streak
    Show,
    /// Recompute both streaks from check-in history and store the result
    Repair,
}

#[derive(Serialize)]
struct StreakView {
    current_streak: u32,
    longest_streak: u32,
    last_check_in_date: Option<chrono::NaiveDate>,
    checked_in_today: bool,
}

#[derive(Serialize)]
struct RepairReport {
    current_streak: u32,
    longest_streak: u32,
    check_in_days: usize,
    changed: bool,
}

pub fn run(action: StreakAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let user = db.get_or_seed_user()?;
    let today = Local::now().date_naive();

    match action {
        StreakAction::Show => {
            let view = StreakView {
                current_streak: user.current_streak,
                longest_streak: user.longest_streak,
                last_check_in_date: user.last_check_in_date,
                checked_in_today: db.has_checked_in(user.id, today)?,
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        StreakAction::Repair => {
            let days = db.check_in_days(user.id)?;
            let current = current_streak_from_history(&days, today);
            let longest = longest_streak_from_history(&days);
            let last = days.last().copied();
            let changed = current != user.current_streak
                || longest != user.longest_streak
                || last != user.last_check_in_date;

            // Always written: an empty history must also clear streaks
            // that drifted away from the check-in rows.
            db.set_user_streak(user.id, current, longest, last)?;

            let report = RepairReport {
                current_streak: current,
                longest_streak: longest,
                check_in_days: days.len(),
                changed,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
