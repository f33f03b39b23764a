//! # PulseCor Core Library
//!
//! This library provides the core business logic for PulseCor, a personal
//! wellness check-in app. It implements a CLI-first philosophy where all
//! operations are available via a standalone CLI binary, with any GUI layer
//! being a thin shell over the same core library.
//!
//! ## Architecture
//!
//! - **Flow Engine**: A stateless conversation state machine for the guided
//!   "Cora" check-in dialogue -- given the persisted step and a user reply it
//!   computes the next step, collected answers, and outgoing messages
//! - **Streak**: Pure consecutive-day streak recurrence plus a retrospective
//!   repair scan over check-in history
//! - **Calendar**: Pure month/week grid aggregation over pre-grouped
//!   check-in days and medication logs
//! - **Session**: Orchestrates flow, streak, and storage into the resumable
//!   user-facing check-in conversation
//! - **Storage**: SQLite record store and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`FlowEngine`]: Conversation state machine
//! - [`ConversationSession`]: Resumable check-in dialogue orchestrator
//! - [`Database`]: Check-in, chat, and medication persistence
//! - [`Config`]: Application configuration management

pub mod calendar;
pub mod checkin;
pub mod error;
pub mod flow;
pub mod medication;
pub mod session;
pub mod storage;
pub mod streak;
pub mod user;

pub use calendar::{CalendarView, DayStatus, MonthGroup};
pub use checkin::{
    ActivityLevel, Answer, DailyCheckIn, EnergyLevel, SleepHours, SleepQuality, StressLevel,
    WaterIntake,
};
pub use error::{CoreError, DatabaseError, Result};
pub use flow::{
    ChatMessage, ConversationFlow, ConversationStep, FlowEngine, FlowType, MessageSender,
    MessageType,
};
pub use medication::{
    Medication, MedicationLog, MedicationLogEntry, MedicationStatus, ReminderRequest,
};
pub use session::ConversationSession;
pub use storage::{Config, Database};
pub use streak::StreakUpdate;
pub use user::UserProfile;
