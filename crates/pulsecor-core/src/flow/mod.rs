//! Conversation flow state: the persisted dialogue session and its steps.
//!
//! A [`ConversationFlow`] is one instance of a guided dialogue with Cora.
//! It records which step the dialogue is on and the answers collected so
//! far, so an abandoned session resumes exactly where it left off. The
//! transition logic lives in [`engine`]; this module is pure state.

pub mod engine;
mod message;
mod responses;

pub use engine::{Advance, FlowEngine, FlowOutcome, Prompt};
pub use message::{ChatMessage, MessageSender, MessageType};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Which guided dialogue a flow instance belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowType {
    Onboarding,
    DailyCheckIn,
    MedicationReminder,
    WeeklyReflection,
}

impl FlowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowType::Onboarding => "onboarding",
            FlowType::DailyCheckIn => "daily_check_in",
            FlowType::MedicationReminder => "medication_reminder",
            FlowType::WeeklyReflection => "weekly_reflection",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "onboarding" => FlowType::Onboarding,
            "medication_reminder" => FlowType::MedicationReminder,
            "weekly_reflection" => FlowType::WeeklyReflection,
            _ => FlowType::DailyCheckIn,
        }
    }

    /// First step of this flow's step group.
    ///
    /// Medication-reminder and weekly-reflection flows are persisted but
    /// have no dialogue group; they open already at the terminal step.
    pub fn initial_step(&self) -> ConversationStep {
        match self {
            FlowType::Onboarding => ConversationStep::Welcome,
            FlowType::DailyCheckIn => ConversationStep::Greeting,
            FlowType::MedicationReminder | FlowType::WeeklyReflection => {
                ConversationStep::Completion
            }
        }
    }
}

/// A named state in the dialogue state machine.
///
/// Two disjoint step groups share the enum: onboarding
/// (`Welcome -> GetName -> HealthKitAuth -> Completion`) and the daily
/// check-in (`Greeting -> AskSleepQuality -> ... -> AskActivity ->
/// Completion`). They never interleave within one flow instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConversationStep {
    // Onboarding
    Welcome,
    GetName,
    HealthKitAuth,

    // Daily check-in
    Greeting,
    AskSleepQuality,
    AskSleepHours,
    AskWater,
    AskStress,
    AskEnergy,
    AskActivity,

    // Shared terminal
    Completion,
}

impl ConversationStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStep::Welcome => "welcome",
            ConversationStep::GetName => "getName",
            ConversationStep::HealthKitAuth => "healthKitAuth",
            ConversationStep::Greeting => "greeting",
            ConversationStep::AskSleepQuality => "askSleepQuality",
            ConversationStep::AskSleepHours => "askSleepHours",
            ConversationStep::AskWater => "askWater",
            ConversationStep::AskStress => "askStress",
            ConversationStep::AskEnergy => "askEnergy",
            ConversationStep::AskActivity => "askActivity",
            ConversationStep::Completion => "completion",
        }
    }

    /// Parse a persisted step name. Unknown names resolve to `Completion`
    /// so a corrupted row degrades to "flow finished" rather than an error.
    pub fn parse(s: &str) -> Self {
        match s {
            "welcome" => ConversationStep::Welcome,
            "getName" => ConversationStep::GetName,
            "healthKitAuth" => ConversationStep::HealthKitAuth,
            "greeting" => ConversationStep::Greeting,
            "askSleepQuality" => ConversationStep::AskSleepQuality,
            "askSleepHours" => ConversationStep::AskSleepHours,
            "askWater" => ConversationStep::AskWater,
            "askStress" => ConversationStep::AskStress,
            "askEnergy" => ConversationStep::AskEnergy,
            "askActivity" => ConversationStep::AskActivity,
            _ => ConversationStep::Completion,
        }
    }
}

/// One persisted dialogue session.
///
/// Invariant: at most one incomplete flow exists per user; the session
/// layer enforces this by resuming the open flow before creating another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationFlow {
    pub session_id: String,
    pub user_id: i64,
    pub flow_type: FlowType,
    pub current_step: ConversationStep,
    pub is_complete: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Answers collected so far, keyed by the fixed temp-data keys.
    pub temp_data: HashMap<String, String>,
}

impl ConversationFlow {
    pub fn new(user_id: i64, flow_type: FlowType) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            user_id,
            flow_type,
            current_step: flow_type.initial_step(),
            is_complete: false,
            started_at: Utc::now(),
            completed_at: None,
            temp_data: HashMap::new(),
        }
    }

    pub fn complete(&mut self) {
        self.is_complete = true;
        self.completed_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_names_round_trip() {
        for step in [
            ConversationStep::Welcome,
            ConversationStep::GetName,
            ConversationStep::HealthKitAuth,
            ConversationStep::Greeting,
            ConversationStep::AskSleepQuality,
            ConversationStep::AskSleepHours,
            ConversationStep::AskWater,
            ConversationStep::AskStress,
            ConversationStep::AskEnergy,
            ConversationStep::AskActivity,
            ConversationStep::Completion,
        ] {
            assert_eq!(ConversationStep::parse(step.as_str()), step);
        }
    }

    #[test]
    fn unknown_step_degrades_to_completion() {
        assert_eq!(
            ConversationStep::parse("askSymptoms"),
            ConversationStep::Completion
        );
    }

    #[test]
    fn new_flow_starts_at_group_entry() {
        let flow = ConversationFlow::new(1, FlowType::DailyCheckIn);
        assert_eq!(flow.current_step, ConversationStep::Greeting);
        assert!(!flow.is_complete);
        assert!(flow.temp_data.is_empty());

        let onboarding = ConversationFlow::new(1, FlowType::Onboarding);
        assert_eq!(onboarding.current_step, ConversationStep::Welcome);
    }
}
