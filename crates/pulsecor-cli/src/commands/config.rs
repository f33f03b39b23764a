use clap::Subcommand;
use pulsecor_core::storage::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the current configuration
    Show,
    /// Set the daily check-in reminder time ("HH:MM", 24-hour)
    SetReminder { time: String },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let cfg = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
        ConfigAction::SetReminder { time } => {
            let mut cfg = Config::load()?;
            cfg.set_check_in_time(&time)?;
            println!("Reminder time updated: {time}");
        }
    }
    Ok(())
}
