//! Month/week calendar aggregation.
//!
//! [`build_calendar`] is a pure function over pre-grouped inputs: the caller
//! batch-fetches completed check-in days and medication logs once, groups
//! them by day, and every per-day lookup here is O(1). The aggregator never
//! queries storage, so it is safe to re-run on every render.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::medication::MedicationLogEntry;

/// Ephemeral per-day cell for calendar rendering. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayStatus {
    pub date: NaiveDate,
    pub has_check_in: bool,
    pub medication_logs: Vec<MedicationLogEntry>,
    pub is_future: bool,
    pub is_today: bool,
    /// Alignment cell inserted so week rows always run Monday to Sunday.
    pub is_placeholder: bool,
}

impl DayStatus {
    fn placeholder(date: NaiveDate) -> Self {
        Self {
            date,
            has_check_in: false,
            medication_logs: Vec::new(),
            is_future: false,
            is_today: false,
            is_placeholder: true,
        }
    }

    pub fn has_any_data(&self) -> bool {
        self.has_check_in || !self.medication_logs.is_empty()
    }
}

/// One month: a title plus Monday-first 7-day week rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthGroup {
    pub month_title: String,
    pub weeks: Vec<Vec<DayStatus>>,
}

/// The full calendar range, with the default scroll target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarView {
    pub months: Vec<MonthGroup>,
    /// Index of the month containing today, or the last month if today
    /// falls outside the generated range.
    pub current_month_index: usize,
}

/// Build the calendar spanning the month of `app_start` through two months
/// past `today`.
///
/// Future days always report no check-in and no medication logs, whatever
/// the input sets contain; not-yet-elapsed days must never reveal data,
/// even under a misconfigured clock.
pub fn build_calendar(
    app_start: NaiveDate,
    today: NaiveDate,
    checkin_days: &HashSet<NaiveDate>,
    med_logs_by_day: &HashMap<NaiveDate, Vec<MedicationLogEntry>>,
) -> CalendarView {
    let mut cursor = first_of_month(app_start);
    let end = (first_of_month(today) + Months::new(2)).max(cursor);

    let mut months = Vec::new();
    let mut current_index = None;

    while cursor <= end {
        if cursor.year() == today.year() && cursor.month() == today.month() {
            current_index = Some(months.len());
        }
        months.push(MonthGroup {
            month_title: cursor.format("%B %Y").to_string(),
            weeks: build_weeks(cursor, today, checkin_days, med_logs_by_day),
        });
        cursor = cursor + Months::new(1);
    }

    let current_month_index = current_index.unwrap_or(months.len().saturating_sub(1));
    CalendarView {
        months,
        current_month_index,
    }
}

fn build_weeks(
    first: NaiveDate,
    today: NaiveDate,
    checkin_days: &HashSet<NaiveDate>,
    med_logs_by_day: &HashMap<NaiveDate, Vec<MedicationLogEntry>>,
) -> Vec<Vec<DayStatus>> {
    // Monday-start offset: how many placeholder cells precede day 1.
    let offset = first.weekday().num_days_from_monday() as usize;

    let mut days: Vec<DayStatus> = Vec::with_capacity(offset + 31);
    for _ in 0..offset {
        days.push(DayStatus::placeholder(first));
    }

    let mut date = first;
    while date.month() == first.month() {
        let is_future = date > today;
        days.push(DayStatus {
            date,
            has_check_in: !is_future && checkin_days.contains(&date),
            medication_logs: if is_future {
                Vec::new()
            } else {
                med_logs_by_day.get(&date).cloned().unwrap_or_default()
            },
            is_future,
            is_today: date == today,
            is_placeholder: false,
        });
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    while days.len() % 7 != 0 {
        days.push(DayStatus::placeholder(first));
    }

    days.chunks(7).map(|week| week.to_vec()).collect()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    // Day 1 always exists for a valid date's month.
    date.with_day(1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medication::MedicationStatus;
    use chrono::{TimeZone, Utc, Weekday};
    use proptest::prelude::*;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn entry(day: NaiveDate) -> MedicationLogEntry {
        MedicationLogEntry {
            medication_id: 1,
            name: "Lisinopril".to_string(),
            dosage: "10mg".to_string(),
            status: MedicationStatus::Taken,
            timestamp: Utc.from_utc_datetime(&day.and_hms_opt(8, 0, 0).unwrap()),
        }
    }

    #[test]
    fn spans_app_start_through_two_months_past_today() {
        let view = build_calendar(
            d(2025, 11, 1),
            d(2026, 1, 15),
            &HashSet::new(),
            &HashMap::new(),
        );
        let titles: Vec<&str> = view.months.iter().map(|m| m.month_title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "November 2025",
                "December 2025",
                "January 2026",
                "February 2026",
                "March 2026"
            ]
        );
        assert_eq!(view.current_month_index, 2);
    }

    #[test]
    fn every_week_row_has_seven_cells() {
        let view = build_calendar(
            d(2025, 11, 1),
            d(2026, 1, 15),
            &HashSet::new(),
            &HashMap::new(),
        );
        for month in &view.months {
            for week in &month.weeks {
                assert_eq!(week.len(), 7);
            }
        }
    }

    #[test]
    fn leading_placeholders_align_first_day_to_monday() {
        // November 2025 starts on a Saturday: five placeholders, then day 1.
        let view = build_calendar(
            d(2025, 11, 1),
            d(2025, 11, 15),
            &HashSet::new(),
            &HashMap::new(),
        );
        let first_week = &view.months[0].weeks[0];
        let placeholders = first_week.iter().take_while(|c| c.is_placeholder).count();
        assert_eq!(placeholders, 5);
        assert_eq!(first_week[5].date, d(2025, 11, 1));
        assert_eq!(first_week[5].date.weekday(), Weekday::Sat);
    }

    #[test]
    fn marks_check_ins_and_groups_med_logs() {
        let today = d(2025, 11, 15);
        let checkins: HashSet<NaiveDate> = [d(2025, 11, 14)].into_iter().collect();
        let mut logs = HashMap::new();
        logs.insert(d(2025, 11, 14), vec![entry(d(2025, 11, 14))]);

        let view = build_calendar(d(2025, 11, 1), today, &checkins, &logs);
        let day = view.months[0]
            .weeks
            .iter()
            .flatten()
            .find(|c| !c.is_placeholder && c.date == d(2025, 11, 14))
            .unwrap();
        assert!(day.has_check_in);
        assert_eq!(day.medication_logs.len(), 1);
        assert!(day.has_any_data());
    }

    #[test]
    fn future_days_are_masked_even_if_inputs_claim_data() {
        let today = d(2025, 11, 15);
        // Poisoned inputs: data recorded for a future day.
        let checkins: HashSet<NaiveDate> = [d(2025, 11, 20)].into_iter().collect();
        let mut logs = HashMap::new();
        logs.insert(d(2025, 11, 20), vec![entry(d(2025, 11, 20))]);

        let view = build_calendar(d(2025, 11, 1), today, &checkins, &logs);
        let day = view.months[0]
            .weeks
            .iter()
            .flatten()
            .find(|c| !c.is_placeholder && c.date == d(2025, 11, 20))
            .unwrap();
        assert!(day.is_future);
        assert!(!day.has_check_in);
        assert!(day.medication_logs.is_empty());
    }

    #[test]
    fn today_is_flagged_and_not_future() {
        let today = d(2025, 11, 15);
        let view = build_calendar(d(2025, 11, 1), today, &HashSet::new(), &HashMap::new());
        let day = view.months[0]
            .weeks
            .iter()
            .flatten()
            .find(|c| c.is_today)
            .unwrap();
        assert_eq!(day.date, today);
        assert!(!day.is_future);
    }

    #[test]
    fn app_start_after_range_end_still_yields_one_month() {
        // Misconfigured start date: degrade to a single month, index 0.
        let view = build_calendar(
            d(2026, 6, 10),
            d(2025, 11, 15),
            &HashSet::new(),
            &HashMap::new(),
        );
        assert_eq!(view.months.len(), 1);
        assert_eq!(view.current_month_index, 0);
    }

    proptest! {
        #[test]
        fn grid_invariant_holds_for_any_month(
            year in 2020i32..2035,
            month in 1u32..=12,
            today_offset in 0i64..120,
        ) {
            let start = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
            let today = start + chrono::Duration::days(today_offset);
            let view = build_calendar(start, today, &HashSet::new(), &HashMap::new());

            for month_group in &view.months {
                for week in &month_group.weeks {
                    prop_assert_eq!(week.len(), 7);
                }
                // Leading placeholder count equals the first real day's
                // Monday-based weekday index.
                let first_week = &month_group.weeks[0];
                let leading = first_week.iter().take_while(|c| c.is_placeholder).count();
                let first_real = first_week.iter().find(|c| !c.is_placeholder).unwrap();
                prop_assert_eq!(
                    leading,
                    first_real.date.weekday().num_days_from_monday() as usize
                );
            }
        }
    }
}
