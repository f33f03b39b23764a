use clap::Subcommand;
use pulsecor_core::storage::Database;

#[derive(Subcommand)]
pub enum UserAction {
    /// Show the user profile
    Show,
    /// Set the user's display name
    SetName { name: String },
}

pub fn run(action: UserAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let user = db.get_or_seed_user()?;

    match action {
        UserAction::Show => {
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        UserAction::SetName { name } => {
            db.set_user_name(user.id, &name)?;
            println!("Name updated: {name}");
        }
    }
    Ok(())
}
