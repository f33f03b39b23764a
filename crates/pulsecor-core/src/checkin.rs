//! Daily check-in record and its categorical answer scales.
//!
//! Each scale is a small closed enum whose labels are exactly the quick-reply
//! strings shown in the chat. Parsing is total: a reply either matches a
//! known label, or is carried along verbatim as [`Answer::Unrecognized`] --
//! the dialogue never rejects an answer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Temp-data keys the conversation flow stores answers under.
pub mod keys {
    pub const SLEEP_QUALITY: &str = "sleepQuality";
    pub const SLEEP_HOURS: &str = "sleepHours";
    pub const WATER: &str = "water";
    pub const STRESS: &str = "stress";
    pub const ENERGY: &str = "energy";
    pub const ACTIVITY: &str = "activity";
    pub const NAME: &str = "name";
    pub const HEALTH_AUTH: &str = "healthAuth";
}

/// A closed categorical scale with fixed display labels.
pub trait Scale: Sized + Copy + 'static {
    /// All variants, in quick-reply display order.
    const ALL: &'static [Self];

    /// The display label, identical to the quick-reply string.
    fn label(&self) -> &'static str;

    /// Exact label match.
    fn from_label(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.label() == s)
    }

    /// Labels rendered as selectable quick replies.
    fn quick_replies() -> Vec<String> {
        Self::ALL.iter().map(|v| v.label().to_string()).collect()
    }
}

macro_rules! scale {
    ($(#[$doc:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl Scale for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }
    };
}

scale! {
    /// How rested the user felt on waking.
    SleepQuality {
        Refreshed => "Refreshed",
        Okay => "Okay",
        Groggy => "Groggy",
    }
}

scale! {
    /// Bucketed hours of sleep.
    SleepHours {
        EightPlus => "8+ hours",
        SevenToEight => "7-8 hours",
        SixToSeven => "6-7 hours",
        LessThanSix => "Less than 6",
    }
}

scale! {
    /// Bucketed glasses of water so far today.
    WaterIntake {
        VeryHigh => "7+ glasses",
        High => "5-6 glasses",
        Moderate => "3-4 glasses",
        Low => "0-2 glasses",
    }
}

scale! {
    /// Self-reported stress.
    StressLevel {
        Calm => "Calm",
        Moderate => "A bit stressed",
        High => "Very stressed",
    }
}

scale! {
    /// Self-reported energy.
    EnergyLevel {
        High => "High",
        Medium => "Medium",
        Low => "Low",
    }
}

scale! {
    /// Self-reported activity.
    ActivityLevel {
        High => "High",
        Medium => "Medium",
        Low => "Low",
        None => "None",
    }
}

/// A parsed answer that never fails.
///
/// Free-text replies that match no label are preserved verbatim rather than
/// coerced to a default, so unmatched input stays observable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Answer<T> {
    Known(T),
    Unrecognized(String),
    NoAnswer,
}

impl<T> Default for Answer<T> {
    fn default() -> Self {
        Answer::NoAnswer
    }
}

impl<T: Scale> Answer<T> {
    /// Parse a raw reply. Blank input means the question was never answered.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Answer::NoAnswer;
        }
        match T::from_label(trimmed) {
            Some(v) => Answer::Known(v),
            None => Answer::Unrecognized(trimmed.to_string()),
        }
    }

    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some(s) => Self::parse(s),
            None => Answer::NoAnswer,
        }
    }

    /// The string persisted to storage: the label for known values, the
    /// original text for unrecognized ones.
    pub fn raw(&self) -> Option<String> {
        match self {
            Answer::Known(v) => Some(v.label().to_string()),
            Answer::Unrecognized(s) => Some(s.clone()),
            Answer::NoAnswer => None,
        }
    }

    pub fn known(&self) -> Option<T> {
        match self {
            Answer::Known(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_answered(&self) -> bool {
        !matches!(self, Answer::NoAnswer)
    }
}

/// One completed (or in-progress) daily check-in.
///
/// Created at the terminal step of a completed conversation flow and never
/// mutated afterward. The store keeps at most one row per (user, day).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCheckIn {
    pub id: Option<i64>,
    pub user_id: i64,
    pub date: NaiveDate,
    pub sleep_quality: Answer<SleepQuality>,
    pub sleep_hours: Answer<SleepHours>,
    pub water_glasses: Answer<WaterIntake>,
    pub stress_level: Answer<StressLevel>,
    pub energy_level: Answer<EnergyLevel>,
    pub activity_level: Answer<ActivityLevel>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_complete: bool,
}

impl DailyCheckIn {
    /// Build a completed check-in from the flow's collected temp data.
    ///
    /// Missing or unparseable values degrade to `NoAnswer`/`Unrecognized`,
    /// never an error.
    pub fn from_temp_data(user_id: i64, date: NaiveDate, temp: &HashMap<String, String>) -> Self {
        let answer = |key: &str| temp.get(key).map(String::as_str);
        let now = Utc::now();
        Self {
            id: None,
            user_id,
            date,
            sleep_quality: Answer::from_raw(answer(keys::SLEEP_QUALITY)),
            sleep_hours: Answer::from_raw(answer(keys::SLEEP_HOURS)),
            water_glasses: Answer::from_raw(answer(keys::WATER)),
            stress_level: Answer::from_raw(answer(keys::STRESS)),
            energy_level: Answer::from_raw(answer(keys::ENERGY)),
            activity_level: Answer::from_raw(answer(keys::ACTIVITY)),
            created_at: now,
            completed_at: Some(now),
            is_complete: true,
        }
    }
}
