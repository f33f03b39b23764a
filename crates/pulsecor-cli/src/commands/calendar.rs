use chrono::{Datelike, Local, Months, NaiveDate};
use clap::Subcommand;
use pulsecor_core::storage::{Config, Database};

#[derive(Subcommand)]
pub enum CalendarAction {
    /// Print the month-grouped calendar view
    Show {
        /// Start the view this many months before the current one,
        /// instead of at the configured app start date
        #[arg(long)]
        months_back: Option<u32>,
    },
}

pub fn run(action: CalendarAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let user = db.get_or_seed_user()?;
    let today = Local::now().date_naive();

    match action {
        CalendarAction::Show { months_back } => {
            let app_start = match months_back {
                Some(n) => first_of_month(today) - Months::new(n),
                None => Config::load_or_default().calendar.app_start_date,
            };
            let view = db.calendar_view(user.id, app_start, today)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }
    Ok(())
}

fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}
