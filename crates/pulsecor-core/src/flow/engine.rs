//! Conversation flow engine.
//!
//! The engine is a stateless transition table over [`ConversationStep`]: it
//! never touches storage and holds no mutable state of its own, so a flow
//! restored from disk mid-dialogue is indistinguishable from a live one.
//!
//! ## Step groups
//!
//! ```text
//! greeting -> askSleepQuality -> askSleepHours -> askWater
//!          -> askStress -> askEnergy -> askActivity -> completion
//! welcome  -> getName -> healthKitAuth -> completion
//! ```
//!
//! The only branch is at `greeting`: an affirmative reply enters the
//! question sequence, anything else exits early with the flow still marked
//! complete. Every other (step, reply) pair produces a deterministic next
//! state -- this is a chat UX, not a validator, so no input is ever
//! rejected.

use std::collections::HashMap;

use super::responses;
use super::ConversationStep;
use crate::checkin::{
    keys, ActivityLevel, EnergyLevel, Scale, SleepHours, SleepQuality, StressLevel, WaterIntake,
};

/// Quick replies offered at the greeting step.
pub const GREETING_REPLIES: [&str; 2] = ["Yes, let's do it!", "Not right now"];
/// Quick replies offered at the health-data consent step.
pub const HEALTH_AUTH_REPLIES: [&str; 2] = ["Sure!", "Maybe later"];

/// One outgoing Cora message, with the quick replies to show alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub content: String,
    pub quick_replies: Vec<String>,
}

impl Prompt {
    fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            quick_replies: Vec::new(),
        }
    }

    fn with_replies(content: impl Into<String>, quick_replies: Vec<String>) -> Self {
        Self {
            content: content.into(),
            quick_replies,
        }
    }
}

/// What the caller must do after applying a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Dialogue continues; persist the step and wait for the next reply.
    Continue,
    /// User declined at the greeting; mark the flow complete, no check-in.
    EarlyExit,
    /// All six answers collected; persist the check-in and update the streak.
    CheckInReady,
    /// Onboarding finished; apply the collected name to the user profile.
    OnboardingComplete,
}

/// Result of one [`FlowEngine::advance`] call.
#[derive(Debug, Clone)]
pub struct Advance {
    pub next_step: ConversationStep,
    /// Temp-data entries to merge into the flow before persisting.
    pub patch: Vec<(String, String)>,
    pub messages: Vec<Prompt>,
    pub outcome: FlowOutcome,
}

impl Advance {
    pub fn is_terminal(&self) -> bool {
        self.next_step == ConversationStep::Completion
    }

    fn new(next_step: ConversationStep, outcome: FlowOutcome) -> Self {
        Self {
            next_step,
            patch: Vec::new(),
            messages: Vec::new(),
            outcome,
        }
    }

    fn store(mut self, key: &str, value: &str) -> Self {
        self.patch.push((key.to_string(), value.to_string()));
        self
    }

    fn say(mut self, prompt: Prompt) -> Self {
        self.messages.push(prompt);
        self
    }
}

/// Stateless conversation state machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowEngine;

impl FlowEngine {
    pub fn new() -> Self {
        Self
    }

    /// The opening message for a fresh daily check-in flow.
    pub fn greeting(&self) -> Prompt {
        Prompt::with_replies("Hey there! Ready to check in? 🌟", reply_strings(&GREETING_REPLIES))
    }

    /// The opening message for a fresh onboarding flow.
    pub fn welcome(&self) -> Prompt {
        Prompt::text("Hi, I'm Cora! 👋 I'll be checking in with you every day.")
    }

    /// Compute the transition for a user reply at the given step.
    ///
    /// `temp_data` is read-only here; collected answers come back in
    /// [`Advance::patch`] for the caller to merge and persist.
    pub fn advance(
        &self,
        current_step: ConversationStep,
        reply: &str,
        temp_data: &HashMap<String, String>,
    ) -> Advance {
        use ConversationStep::*;

        match current_step {
            Greeting => {
                let lowered = reply.to_lowercase();
                if lowered.contains("yes") || lowered.contains("do it") {
                    Advance::new(AskSleepQuality, FlowOutcome::Continue).say(Prompt::with_replies(
                        "Awesome! Let's start. How did you sleep last night? 😴",
                        SleepQuality::quick_replies(),
                    ))
                } else {
                    Advance::new(Completion, FlowOutcome::EarlyExit)
                        .say(Prompt::text("No problem! Check in when you're ready 💙"))
                }
            }

            AskSleepQuality => Advance::new(AskSleepHours, FlowOutcome::Continue)
                .store(keys::SLEEP_QUALITY, reply)
                .say(Prompt::text(responses::sleep_quality(reply)))
                .say(Prompt::with_replies(
                    "And how many hours did you get? 🌙",
                    SleepHours::quick_replies(),
                )),

            AskSleepHours => Advance::new(AskWater, FlowOutcome::Continue)
                .store(keys::SLEEP_HOURS, reply)
                .say(Prompt::text(responses::sleep_hours(reply)))
                .say(Prompt::with_replies(
                    "Thanks for sharing! Now, water time — how many glasses have you had today? 💧",
                    WaterIntake::quick_replies(),
                )),

            AskWater => Advance::new(AskStress, FlowOutcome::Continue)
                .store(keys::WATER, reply)
                .say(Prompt::text(responses::water(reply)))
                .say(Prompt::with_replies(
                    "Nice! Quick stress check — how are you feeling today?",
                    StressLevel::quick_replies(),
                )),

            AskStress => Advance::new(AskEnergy, FlowOutcome::Continue)
                .store(keys::STRESS, reply)
                .say(Prompt::text(responses::stress(reply)))
                .say(Prompt::with_replies(
                    "I hear you. Now, energy check — how are your levels today? ⚡",
                    EnergyLevel::quick_replies(),
                )),

            AskEnergy => Advance::new(AskActivity, FlowOutcome::Continue)
                .store(keys::ENERGY, reply)
                .say(Prompt::text(responses::energy(reply)))
                .say(Prompt::with_replies(
                    "Got it! Last thing — how active have you been today? 🏃‍♀️",
                    ActivityLevel::quick_replies(),
                )),

            AskActivity => Advance::new(Completion, FlowOutcome::CheckInReady)
                .store(keys::ACTIVITY, reply)
                .say(Prompt::text(responses::activity(reply))),

            Welcome => Advance::new(GetName, FlowOutcome::Continue)
                .say(Prompt::text("Nice to meet you! What should I call you? 😊")),

            GetName => {
                let name = if reply.trim().is_empty() { "User" } else { reply.trim() };
                Advance::new(HealthKitAuth, FlowOutcome::Continue)
                    .store(keys::NAME, name)
                    .say(Prompt::with_replies(
                        format!(
                            "Lovely to meet you, {name}! Would you like to connect your health data?"
                        ),
                        reply_strings(&HEALTH_AUTH_REPLIES),
                    ))
            }

            HealthKitAuth => Advance::new(Completion, FlowOutcome::OnboardingComplete)
                .store(keys::HEALTH_AUTH, reply)
                .say(Prompt::text("All set! I'll check in with you every day 🌟")),

            // A reply at the terminal step has nothing left to collect;
            // stay terminal rather than erroring.
            Completion => {
                let _ = temp_data;
                Advance::new(Completion, FlowOutcome::Continue)
            }
        }
    }

    /// Reproduce the quick-reply set for a step, used when a persisted flow
    /// is restored so a relaunch looks identical to a live session.
    pub fn quick_replies(&self, step: ConversationStep) -> Vec<String> {
        use ConversationStep::*;
        match step {
            Greeting => reply_strings(&GREETING_REPLIES),
            AskSleepQuality => SleepQuality::quick_replies(),
            AskSleepHours => SleepHours::quick_replies(),
            AskWater => WaterIntake::quick_replies(),
            AskStress => StressLevel::quick_replies(),
            AskEnergy => EnergyLevel::quick_replies(),
            AskActivity => ActivityLevel::quick_replies(),
            HealthKitAuth => reply_strings(&HEALTH_AUTH_REPLIES),
            Welcome | GetName | Completion => Vec::new(),
        }
    }
}

fn reply_strings(replies: &[&str]) -> Vec<String> {
    replies.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advance_chain(replies: &[&str]) -> (Vec<ConversationStep>, HashMap<String, String>) {
        let engine = FlowEngine::new();
        let mut step = ConversationStep::Greeting;
        let mut temp = HashMap::new();
        let mut visited = vec![step];
        for reply in replies {
            let adv = engine.advance(step, reply, &temp);
            for (k, v) in adv.patch {
                temp.insert(k, v);
            }
            step = adv.next_step;
            visited.push(step);
        }
        (visited, temp)
    }

    #[test]
    fn daily_flow_visits_each_step_once_in_fixed_order() {
        let (visited, temp) = advance_chain(&[
            "Yes, let's do it!",
            "Okay",
            "7-8 hours",
            "3-4 glasses",
            "A bit stressed",
            "Medium",
            "Medium",
        ]);

        use ConversationStep::*;
        assert_eq!(
            visited,
            vec![
                Greeting,
                AskSleepQuality,
                AskSleepHours,
                AskWater,
                AskStress,
                AskEnergy,
                AskActivity,
                Completion
            ]
        );
        assert_eq!(temp.get("sleepQuality").map(String::as_str), Some("Okay"));
        assert_eq!(temp.get("activity").map(String::as_str), Some("Medium"));
    }

    #[test]
    fn order_is_fixed_regardless_of_reply_content() {
        // Free-text answers advance exactly the same way as quick replies.
        let (visited, temp) =
            advance_chain(&["yes please", "terribly", "dunno", "loads", "fine", "??", "!!"]);
        assert_eq!(visited.last(), Some(&ConversationStep::Completion));
        assert_eq!(visited.len(), 8);
        assert_eq!(temp.get("water").map(String::as_str), Some("loads"));
    }

    #[test]
    fn greeting_decline_exits_early() {
        let engine = FlowEngine::new();
        let adv = engine.advance(ConversationStep::Greeting, "not right now", &HashMap::new());
        assert_eq!(adv.next_step, ConversationStep::Completion);
        assert_eq!(adv.outcome, FlowOutcome::EarlyExit);
        assert!(adv.is_terminal());
        assert!(adv.messages[0].content.contains("No problem"));
    }

    #[test]
    fn greeting_accepts_do_it_phrasing() {
        let engine = FlowEngine::new();
        let adv = engine.advance(ConversationStep::Greeting, "ok do it", &HashMap::new());
        assert_eq!(adv.next_step, ConversationStep::AskSleepQuality);
    }

    #[test]
    fn final_answer_yields_check_in_ready() {
        let engine = FlowEngine::new();
        let adv = engine.advance(ConversationStep::AskActivity, "Low", &HashMap::new());
        assert_eq!(adv.outcome, FlowOutcome::CheckInReady);
        assert!(adv.is_terminal());
        assert_eq!(adv.patch, vec![("activity".to_string(), "Low".to_string())]);
    }

    #[test]
    fn quick_replies_match_the_prompt_sent_for_that_step() {
        // Resuming mid-dialogue must reproduce exactly what a live session
        // would have shown.
        let engine = FlowEngine::new();
        let adv = engine.advance(ConversationStep::AskSleepQuality, "Okay", &HashMap::new());
        let question = adv.messages.last().unwrap();
        assert_eq!(
            question.quick_replies,
            engine.quick_replies(ConversationStep::AskSleepHours)
        );

        assert_eq!(
            engine.quick_replies(ConversationStep::AskWater),
            vec!["7+ glasses", "5-6 glasses", "3-4 glasses", "0-2 glasses"]
        );
        assert_eq!(
            engine.quick_replies(ConversationStep::Greeting),
            vec!["Yes, let's do it!", "Not right now"]
        );
    }

    #[test]
    fn reply_at_completion_is_a_harmless_no_op() {
        let engine = FlowEngine::new();
        let adv = engine.advance(ConversationStep::Completion, "hello?", &HashMap::new());
        assert_eq!(adv.next_step, ConversationStep::Completion);
        assert!(adv.patch.is_empty());
        assert!(adv.messages.is_empty());
    }

    #[test]
    fn onboarding_flow_collects_name_and_consent() {
        let engine = FlowEngine::new();
        let mut temp = HashMap::new();

        let adv = engine.advance(ConversationStep::Welcome, "hi", &temp);
        assert_eq!(adv.next_step, ConversationStep::GetName);

        let adv = engine.advance(ConversationStep::GetName, "  Maya  ", &temp);
        assert_eq!(adv.next_step, ConversationStep::HealthKitAuth);
        assert_eq!(adv.patch, vec![("name".to_string(), "Maya".to_string())]);
        assert!(adv.messages[0].content.contains("Maya"));
        for (k, v) in adv.patch {
            temp.insert(k, v);
        }

        let adv = engine.advance(ConversationStep::HealthKitAuth, "Sure!", &temp);
        assert_eq!(adv.outcome, FlowOutcome::OnboardingComplete);
        assert!(adv.is_terminal());
    }
}
