//! Medication schedules, action logs, and the reminder data surface.
//!
//! Scheduling mechanics (notification delivery) live outside the core; this
//! module only defines the records and the payload a scheduler needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The schedule/settings for one medication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: Option<i64>,
    pub user_id: i64,
    pub name: String,
    /// Denormalized for display, e.g. "50mg".
    pub dosage: String,
    pub frequency: String,
    /// Reminder times as "HH:MM" strings, e.g. "08:00", "20:00".
    pub reminder_times: Vec<String>,
    /// Soft-delete flag; deactivated medications keep their log history.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Medication {
    pub fn new(
        user_id: i64,
        name: &str,
        dosage: &str,
        frequency: &str,
        reminder_times: Vec<String>,
    ) -> Self {
        Self {
            id: None,
            user_id,
            name: name.to_string(),
            dosage: dosage.to_string(),
            frequency: frequency.to_string(),
            reminder_times,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// How the user actioned a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedicationStatus {
    Taken,
    Skipped,
    Snoozed,
}

impl MedicationStatus {
    /// The display label, also used as the persisted value.
    pub fn label(&self) -> &'static str {
        match self {
            MedicationStatus::Taken => "Taken",
            MedicationStatus::Skipped => "Skipped",
            MedicationStatus::Snoozed => "Remind me later",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "Taken" => Some(MedicationStatus::Taken),
            "Skipped" => Some(MedicationStatus::Skipped),
            "Remind me later" => Some(MedicationStatus::Snoozed),
            _ => None,
        }
    }
}

/// One actioned reminder, append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationLog {
    pub id: Option<i64>,
    pub medication_id: i64,
    pub status: MedicationStatus,
    pub timestamp: DateTime<Utc>,
    /// Which reminder time this was for ("HH:MM").
    pub scheduled_time: String,
}

/// A log row joined with its medication's display fields, as the calendar
/// consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationLogEntry {
    pub medication_id: i64,
    pub name: String,
    pub dosage: String,
    pub status: MedicationStatus,
    pub timestamp: DateTime<Utc>,
}

/// Everything a notification scheduler needs to set up reminders for one
/// medication. Built only for active medications with at least one valid
/// "HH:MM" time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRequest {
    pub medication_id: i64,
    pub name: String,
    pub dosage: String,
    pub times: Vec<String>,
}

impl ReminderRequest {
    pub fn for_medication(medication: &Medication) -> Option<Self> {
        let id = medication.id?;
        if !medication.is_active {
            return None;
        }
        let times: Vec<String> = medication
            .reminder_times
            .iter()
            .filter(|t| parse_reminder_time(t).is_some())
            .cloned()
            .collect();
        if times.is_empty() {
            return None;
        }
        Some(Self {
            medication_id: id,
            name: medication.name.clone(),
            dosage: medication.dosage.clone(),
            times,
        })
    }
}

/// Parse an "HH:MM" reminder time into (hour, minute).
pub fn parse_reminder_time(s: &str) -> Option<(u32, u32)> {
    let (h, m) = s.split_once(':')?;
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_round_trip() {
        for status in [
            MedicationStatus::Taken,
            MedicationStatus::Skipped,
            MedicationStatus::Snoozed,
        ] {
            assert_eq!(MedicationStatus::from_label(status.label()), Some(status));
        }
        assert_eq!(MedicationStatus::from_label("Remind me later"), Some(MedicationStatus::Snoozed));
    }

    #[test]
    fn reminder_time_parsing() {
        assert_eq!(parse_reminder_time("08:00"), Some((8, 0)));
        assert_eq!(parse_reminder_time("23:59"), Some((23, 59)));
        assert_eq!(parse_reminder_time("24:00"), None);
        assert_eq!(parse_reminder_time("8pm"), None);
        assert_eq!(parse_reminder_time(""), None);
    }

    #[test]
    fn reminder_request_filters_invalid_times() {
        let mut med = Medication::new(
            1,
            "Lisinopril",
            "10mg",
            "daily",
            vec!["08:00".into(), "sometime".into(), "20:00".into()],
        );
        med.id = Some(7);

        let request = ReminderRequest::for_medication(&med).unwrap();
        assert_eq!(request.times, vec!["08:00", "20:00"]);
        assert_eq!(request.medication_id, 7);

        med.is_active = false;
        assert!(ReminderRequest::for_medication(&med).is_none());
    }

    #[test]
    fn unsaved_medication_gets_no_reminders() {
        let med = Medication::new(1, "B12", "500mcg", "daily", vec!["09:00".into()]);
        assert!(ReminderRequest::for_medication(&med).is_none());
    }
}
