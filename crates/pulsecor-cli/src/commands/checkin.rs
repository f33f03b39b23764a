use clap::Subcommand;
use pulsecor_core::flow::ChatMessage;
use pulsecor_core::session::ConversationSession;
use pulsecor_core::storage::Database;
use serde::Serialize;

#[derive(Subcommand)]
pub enum CheckinAction {
    /// Start today's check-in, or replay the history of a resumed one
    Start,
    /// Send a reply to Cora
    Reply {
        /// The reply text (quick-reply label or free text)
        text: String,
    },
    /// Show the quick replies offered at the current step
    Replies,
    /// Today's check-in status
    Status,
}

/// One CLI-visible turn: Cora's messages plus what to answer with.
#[derive(Serialize)]
struct Turn {
    messages: Vec<ChatMessage>,
    quick_replies: Vec<String>,
}

#[derive(Serialize)]
struct Status {
    checked_in_today: bool,
    weekly_check_ins: u32,
    current_streak: u32,
    conversation_active: bool,
}

pub fn run(action: CheckinAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut session = ConversationSession::open(&db)?;

    match action {
        CheckinAction::Start => {
            let messages = session.start_check_in()?;
            print_turn(&session, messages)?;
        }
        CheckinAction::Reply { text } => {
            let messages = session.respond(&text);
            print_turn(&session, messages)?;
        }
        CheckinAction::Replies => {
            println!(
                "{}",
                serde_json::to_string_pretty(&session.current_quick_replies())?
            );
        }
        CheckinAction::Status => {
            let today = chrono::Local::now().date_naive();
            let user = session.user();
            let status = Status {
                checked_in_today: db.has_checked_in(user.id, today)?,
                weekly_check_ins: db.weekly_check_in_count(user.id, today)?,
                current_streak: user.current_streak,
                conversation_active: session.active_flow().is_some(),
            };
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }
    Ok(())
}

fn print_turn(
    session: &ConversationSession<'_>,
    messages: Vec<ChatMessage>,
) -> Result<(), Box<dyn std::error::Error>> {
    let turn = Turn {
        messages,
        quick_replies: session.current_quick_replies(),
    };
    println!("{}", serde_json::to_string_pretty(&turn)?);
    Ok(())
}
