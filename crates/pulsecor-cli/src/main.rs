use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pulsecor-cli", version, about = "PulseCor CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Daily check-in conversation with Cora
    Checkin {
        #[command(subcommand)]
        action: commands::checkin::CheckinAction,
    },
    /// Monthly calendar of check-ins and medication logs
    Calendar {
        #[command(subcommand)]
        action: commands::calendar::CalendarAction,
    },
    /// Check-in streak
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Medication management
    Med {
        #[command(subcommand)]
        action: commands::med::MedAction,
    },
    /// User profile
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Checkin { action } => commands::checkin::run(action),
        Commands::Calendar { action } => commands::calendar::run(action),
        Commands::Streak { action } => commands::streak::run(action),
        Commands::Med { action } => commands::med::run(action),
        Commands::User { action } => commands::user::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
