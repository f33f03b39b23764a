use chrono::Utc;
use clap::Subcommand;
use pulsecor_core::medication::{Medication, MedicationLog, MedicationStatus, ReminderRequest};
use pulsecor_core::storage::Database;

#[derive(Subcommand)]
pub enum MedAction {
    /// Add a medication
    Add {
        name: String,
        /// e.g. "50mg"
        #[arg(long, default_value = "")]
        dosage: String,
        #[arg(long, default_value = "daily")]
        frequency: String,
        /// Reminder time as "HH:MM"; repeat for multiple reminders
        #[arg(long = "time")]
        times: Vec<String>,
    },
    /// List active medications
    List,
    /// Log a dose for a medication
    Log {
        id: i64,
        /// taken, skipped, or snoozed
        #[arg(long, default_value = "taken")]
        status: String,
        /// The reminder slot this dose answers, as "HH:MM"
        #[arg(long, default_value = "")]
        scheduled_time: String,
    },
    /// Deactivate a medication (its log history is kept)
    Remove { id: i64 },
    /// Print the reminder payloads a notification scheduler would consume
    Reminders,
}

pub fn run(action: MedAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let user = db.get_or_seed_user()?;

    match action {
        MedAction::Add {
            name,
            dosage,
            frequency,
            times,
        } => {
            let medication = Medication::new(user.id, &name, &dosage, &frequency, times);
            let id = db.create_medication(&medication)?;
            println!("Medication created: {id}");
        }
        MedAction::List => {
            let medications = db.medications(user.id)?;
            println!("{}", serde_json::to_string_pretty(&medications)?);
        }
        MedAction::Log {
            id,
            status,
            scheduled_time,
        } => {
            let status = parse_status(&status)
                .ok_or_else(|| format!("unknown status '{status}' (taken/skipped/snoozed)"))?;
            let log_id = db.log_medication(&MedicationLog {
                id: None,
                medication_id: id,
                status,
                timestamp: Utc::now(),
                scheduled_time,
            })?;
            println!("Dose logged: {log_id}");
        }
        MedAction::Remove { id } => {
            db.deactivate_medication(id)?;
            println!("Medication deactivated: {id}");
        }
        MedAction::Reminders => {
            let requests: Vec<ReminderRequest> = db
                .medications(user.id)?
                .iter()
                .filter_map(ReminderRequest::for_medication)
                .collect();
            println!("{}", serde_json::to_string_pretty(&requests)?);
        }
    }
    Ok(())
}

fn parse_status(s: &str) -> Option<MedicationStatus> {
    match s.to_lowercase().as_str() {
        "taken" => Some(MedicationStatus::Taken),
        "skipped" => Some(MedicationStatus::Skipped),
        "snoozed" | "later" => Some(MedicationStatus::Snoozed),
        _ => MedicationStatus::from_label(s),
    }
}
