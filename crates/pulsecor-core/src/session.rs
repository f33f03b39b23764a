//! Resumable conversation session over the flow engine and record store.
//!
//! [`ConversationSession`] is the seam the CLI (or any shell) talks to: it
//! loads the user and their at-most-one incomplete flow, feeds replies
//! through the stateless [`FlowEngine`], and persists every step so the
//! dialogue survives a process restart mid-conversation.
//!
//! Storage failures never escape [`ConversationSession::respond`]; they
//! degrade to an apology message in Cora's voice, matching the chat UX
//! contract that no user input ever produces a hard error.

use chrono::Local;

use crate::checkin::{keys, DailyCheckIn};
use crate::error::Result;
use crate::flow::{
    ChatMessage, ConversationFlow, ConversationStep, FlowEngine, FlowOutcome, FlowType, Prompt,
};
use crate::storage::Database;
use crate::user::UserProfile;

/// One user's live conversation state, bound to an open database.
pub struct ConversationSession<'a> {
    db: &'a Database,
    engine: FlowEngine,
    user: UserProfile,
    flow: Option<ConversationFlow>,
}

impl<'a> ConversationSession<'a> {
    /// Load the user (seeding on first run) and any incomplete flow.
    pub fn open(db: &'a Database) -> Result<Self> {
        let user = db.get_or_seed_user()?;
        let flow = db.active_flow(user.id)?;
        Ok(Self {
            db,
            engine: FlowEngine::new(),
            user,
            flow,
        })
    }

    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    pub fn active_flow(&self) -> Option<&ConversationFlow> {
        self.flow.as_ref()
    }

    /// Begin (or resume) the daily check-in dialogue.
    ///
    /// Resuming replays the persisted history so a relaunch shows exactly
    /// what a live session would have; a fresh start emits the greeting.
    pub fn start_check_in(&mut self) -> Result<Vec<ChatMessage>> {
        if let Some(flow) = &self.flow {
            return self.db.messages_for_session(&flow.session_id);
        }
        let today = Local::now().date_naive();
        if self.db.has_checked_in(self.user.id, today)? {
            // Not persisted: no session to attach it to.
            return Ok(vec![ChatMessage::system(
                "",
                "You've already checked in today. Come back tomorrow to continue your streak!",
            )]);
        }
        self.start_flow(FlowType::DailyCheckIn, self.engine.greeting())
    }

    /// Begin the one-time onboarding dialogue (name capture + consent).
    pub fn start_onboarding(&mut self) -> Result<Vec<ChatMessage>> {
        if let Some(flow) = &self.flow {
            return self.db.messages_for_session(&flow.session_id);
        }
        self.start_flow(FlowType::Onboarding, self.engine.welcome())
    }

    fn start_flow(&mut self, flow_type: FlowType, opening: Prompt) -> Result<Vec<ChatMessage>> {
        let flow = ConversationFlow::new(self.user.id, flow_type);
        self.db.save_flow(&flow)?;
        let message = ChatMessage::cora(&flow.session_id, &opening.content, opening.quick_replies);
        self.db.append_message(&message)?;
        self.flow = Some(flow);
        Ok(vec![message])
    }

    /// Feed one user reply through the dialogue. Never fails: storage
    /// trouble comes back as an apology message instead of an error.
    pub fn respond(&mut self, text: &str) -> Vec<ChatMessage> {
        match self.try_respond(text) {
            Ok(messages) => messages,
            Err(e) => {
                let session_id = self
                    .flow
                    .as_ref()
                    .map(|f| f.session_id.clone())
                    .unwrap_or_default();
                vec![ChatMessage::cora(&session_id, &e.user_message(), Vec::new())]
            }
        }
    }

    fn try_respond(&mut self, text: &str) -> Result<Vec<ChatMessage>> {
        // A reply with nothing active starts a fresh check-in; the stray
        // text is kept in the history but drives no transition.
        let Some(current) = &self.flow else {
            let mut messages = self.start_flow(FlowType::DailyCheckIn, self.engine.greeting())?;
            if let Some(flow) = &self.flow {
                let user_message = ChatMessage::user(&flow.session_id, text);
                self.db.append_message(&user_message)?;
                messages.insert(0, user_message);
            }
            return Ok(messages);
        };
        let mut flow = current.clone();

        let user_message = ChatMessage::user(&flow.session_id, text);
        self.db.append_message(&user_message)?;

        let advance = self.engine.advance(flow.current_step, text, &flow.temp_data);
        for (key, value) in &advance.patch {
            flow.temp_data.insert(key.clone(), value.clone());
        }
        flow.current_step = advance.next_step;

        let mut outgoing: Vec<ChatMessage> = advance
            .messages
            .iter()
            .map(|p| ChatMessage::cora(&flow.session_id, &p.content, p.quick_replies.clone()))
            .collect();

        match advance.outcome {
            FlowOutcome::Continue => {
                if advance.is_terminal() {
                    flow.complete();
                }
            }
            FlowOutcome::EarlyExit => flow.complete(),
            FlowOutcome::CheckInReady => {
                let today = Local::now().date_naive();
                let check_in = DailyCheckIn::from_temp_data(self.user.id, today, &flow.temp_data);
                let update = self.user.streak_update(today);
                match self.db.complete_check_in(&check_in, &update) {
                    Ok(()) => {
                        self.user.current_streak = update.current_streak;
                        self.user.longest_streak = update.longest_streak;
                        self.user.last_check_in_date = Some(update.last_check_in);
                        outgoing.push(ChatMessage::cora(
                            &flow.session_id,
                            &format!(
                                "Perfect, you're all done for the day! You're on a {}-day streak! 🎉 See you tomorrow!",
                                update.current_streak
                            ),
                            Vec::new(),
                        ));
                        flow.complete();
                    }
                    Err(_) => {
                        // Step back to the final question so the next reply
                        // re-attempts the save with the answers intact.
                        flow.current_step = ConversationStep::AskActivity;
                        outgoing.push(ChatMessage::cora(
                            &flow.session_id,
                            "I had a little trouble saving your check-in. 💙",
                            Vec::new(),
                        ));
                    }
                }
            }
            FlowOutcome::OnboardingComplete => {
                if let Some(name) = flow.temp_data.get(keys::NAME) {
                    self.db.set_user_name(self.user.id, name)?;
                    self.user.name = name.clone();
                }
                flow.complete();
            }
        }

        self.db.save_flow(&flow)?;
        for message in &outgoing {
            self.db.append_message(message)?;
        }

        self.flow = if flow.is_complete { None } else { Some(flow) };
        Ok(outgoing)
    }

    /// Quick replies to show for the current step, empty when idle.
    pub fn current_quick_replies(&self) -> Vec<String> {
        self.flow
            .as_ref()
            .map(|f| self.engine.quick_replies(f.current_step))
            .unwrap_or_default()
    }

    /// Persisted history of the active flow's session, oldest first.
    pub fn messages(&self) -> Result<Vec<ChatMessage>> {
        match &self.flow {
            Some(flow) => self.db.messages_for_session(&flow.session_id),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{MessageSender, MessageType};

    fn complete_check_in(session: &mut ConversationSession<'_>) {
        session.start_check_in().unwrap();
        for reply in [
            "Yes, let's do it!",
            "Refreshed",
            "7-8 hours",
            "5-6 glasses",
            "Calm",
            "High",
            "Medium",
        ] {
            session.respond(reply);
        }
    }

    #[test]
    fn full_check_in_updates_streak_and_completes_flow() {
        let db = Database::open_memory().unwrap();
        let mut session = ConversationSession::open(&db).unwrap();

        complete_check_in(&mut session);

        assert!(session.active_flow().is_none());
        assert_eq!(session.user().current_streak, 1);
        assert_eq!(session.user().longest_streak, 1);

        let today = Local::now().date_naive();
        assert!(db.has_checked_in(session.user().id, today).unwrap());
    }

    #[test]
    fn final_message_reports_the_streak() {
        let db = Database::open_memory().unwrap();
        let mut session = ConversationSession::open(&db).unwrap();
        session.start_check_in().unwrap();
        for reply in ["yes", "Okay", "8+ hours", "7+ glasses", "Calm", "High"] {
            session.respond(reply);
        }

        let messages = session.respond("Low");
        let last = messages.last().unwrap();
        assert!(last.content.contains("1-day streak"));
        assert!(last.content.contains("See you tomorrow"));
    }

    #[test]
    fn starting_again_after_todays_check_in_nudges_instead_of_greeting() {
        let db = Database::open_memory().unwrap();
        let mut session = ConversationSession::open(&db).unwrap();
        complete_check_in(&mut session);

        let messages = session.start_check_in().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_type, MessageType::SystemInfo);
        assert!(messages[0].content.contains("already checked in today"));
        assert!(session.active_flow().is_none());
    }

    #[test]
    fn declining_the_greeting_ends_the_flow_without_a_check_in() {
        let db = Database::open_memory().unwrap();
        let mut session = ConversationSession::open(&db).unwrap();
        session.start_check_in().unwrap();

        let messages = session.respond("Not right now");
        assert!(messages[0].content.contains("No problem"));
        assert!(session.active_flow().is_none());

        let today = Local::now().date_naive();
        assert!(!db.has_checked_in(session.user().id, today).unwrap());
        assert_eq!(session.user().current_streak, 0);
    }

    #[test]
    fn reply_without_active_flow_starts_fresh() {
        let db = Database::open_memory().unwrap();
        let mut session = ConversationSession::open(&db).unwrap();

        let messages = session.respond("hello?");
        // Stray text is kept, then the greeting is shown.
        assert_eq!(messages[0].sender, MessageSender::User);
        assert!(messages[1].content.contains("Ready to check in"));
        assert!(session.active_flow().is_some());
    }

    #[test]
    fn session_resumes_across_reopen_with_identical_quick_replies() {
        let db = Database::open_memory().unwrap();
        let expected = {
            let mut session = ConversationSession::open(&db).unwrap();
            session.start_check_in().unwrap();
            session.respond("Yes, let's do it!");
            session.current_quick_replies()
        };

        // A new session over the same database picks up mid-dialogue.
        let mut reopened = ConversationSession::open(&db).unwrap();
        assert!(reopened.active_flow().is_some());
        assert_eq!(reopened.current_quick_replies(), expected);

        // start_check_in on a resumed session replays history rather than
        // greeting again.
        let history = reopened.start_check_in().unwrap();
        assert!(history
            .iter()
            .any(|m| m.content.contains("How did you sleep")));
    }

    #[test]
    fn failed_save_keeps_answers_and_retries_on_the_next_reply() {
        let db = Database::open_memory().unwrap();
        {
            let mut session = ConversationSession::open(&db).unwrap();
            session.start_check_in().unwrap();
            for reply in ["yes", "Okay", "8+ hours", "7+ glasses", "Calm", "High"] {
                session.respond(reply);
            }

            // Hide the table so the final write fails.
            db.conn()
                .execute(
                    "ALTER TABLE daily_check_ins RENAME TO daily_check_ins_offline",
                    [],
                )
                .unwrap();
            let messages = session.respond("Medium");
            assert!(messages.last().unwrap().content.contains("trouble saving"));
            assert!(session.active_flow().is_some());
        }

        db.conn()
            .execute(
                "ALTER TABLE daily_check_ins_offline RENAME TO daily_check_ins",
                [],
            )
            .unwrap();

        // The next interaction, even after a restart, lands the check-in.
        let mut reopened = ConversationSession::open(&db).unwrap();
        assert!(reopened.active_flow().is_some());
        let messages = reopened.respond("Medium");
        assert!(messages.last().unwrap().content.contains("1-day streak"));
        assert!(reopened.active_flow().is_none());

        let today = Local::now().date_naive();
        assert!(db.has_checked_in(reopened.user().id, today).unwrap());
    }

    #[test]
    fn onboarding_captures_the_name() {
        let db = Database::open_memory().unwrap();
        let mut session = ConversationSession::open(&db).unwrap();

        let opening = session.start_onboarding().unwrap();
        assert!(opening[0].content.contains("I'm Cora"));

        session.respond("hi");
        session.respond("Maya");
        let messages = session.respond("Sure!");

        assert!(messages.last().unwrap().content.contains("All set"));
        assert_eq!(session.user().name, "Maya");
        assert_eq!(db.get_or_seed_user().unwrap().name, "Maya");
        assert!(session.active_flow().is_none());
    }

    #[test]
    fn history_is_persisted_per_session() {
        let db = Database::open_memory().unwrap();
        let mut session = ConversationSession::open(&db).unwrap();
        session.start_check_in().unwrap();
        session.respond("yes");

        let history = session.messages().unwrap();
        // Greeting, user reply, first question.
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].sender, MessageSender::User);
        assert_eq!(history[1].content, "yes");
    }
}
