//! Cora's canned empathetic responses.
//!
//! Each responder keys off the parsed answer; free-text replies fall back to
//! a neutral acknowledgment, so the dialogue never rejects an answer.

use crate::checkin::{
    ActivityLevel, Answer, EnergyLevel, SleepHours, SleepQuality, StressLevel, WaterIntake,
};

pub fn sleep_quality(reply: &str) -> &'static str {
    match Answer::<SleepQuality>::parse(reply).known() {
        Some(SleepQuality::Refreshed) => {
            "That's wonderful! Good sleep makes such a difference ✨"
        }
        Some(SleepQuality::Okay) => "Fair enough. At least you got some rest 😊",
        Some(SleepQuality::Groggy) => "I hear you. Some nights are harder than others 💙",
        None => "Thanks for sharing how you slept! 😴",
    }
}

pub fn sleep_hours(reply: &str) -> &'static str {
    match Answer::<SleepHours>::parse(reply).known() {
        Some(SleepHours::EightPlus) | Some(SleepHours::SevenToEight) => {
            "That's really good! Right in the sweet spot ✨"
        }
        Some(SleepHours::SixToSeven) => "Not too bad, but maybe a little more rest tonight? 🌙",
        Some(SleepHours::LessThanSix) => "I understand. Hope you can catch up on rest soon 💙",
        None => "Got it, thanks for tracking your rest! 🌙",
    }
}

pub fn water(reply: &str) -> &'static str {
    match Answer::<WaterIntake>::parse(reply).known() {
        Some(WaterIntake::VeryHigh) => "Wow! You're absolutely crushing hydration today!",
        Some(WaterIntake::High) => "Great job! You're keeping yourself well hydrated!",
        Some(WaterIntake::Moderate) => "Nice! You're on the right track 💙",
        Some(WaterIntake::Low) => {
            "No worries! There's still time to catch up. Your body will thank you 💧"
        }
        None => "Thanks for letting me know! 💧",
    }
}

pub fn stress(reply: &str) -> &'static str {
    match Answer::<StressLevel>::parse(reply).known() {
        Some(StressLevel::Calm) => "That's so good to hear! Keep riding that peaceful wave 😌✨",
        Some(StressLevel::Moderate) => {
            "I hear you. Remember, you're doing your best. Take a deep breath. 🌬️"
        }
        Some(StressLevel::High) => {
            "I'm sorry it's a tough day. One step at a time, you've got this. 💙"
        }
        None => "Thanks for checking in with your stress levels. 💙",
    }
}

pub fn energy(reply: &str) -> &'static str {
    match Answer::<EnergyLevel>::parse(reply).known() {
        Some(EnergyLevel::High) => "Love that! You're crushing it today 🚀",
        Some(EnergyLevel::Medium) => "Steady and balanced — that's great! ⚡",
        Some(EnergyLevel::Low) => "Listen to your body today. It's okay to take it slow. 🛌",
        None => "Thanks for sharing your energy levels! ⚡",
    }
}

pub fn activity(reply: &str) -> &'static str {
    match Answer::<ActivityLevel>::parse(reply).known() {
        Some(ActivityLevel::High) => {
            "Wow, look at you go! Movement is such a great mood booster. 🚀"
        }
        Some(ActivityLevel::Medium) => "Nice job getting some movement in today! ✨",
        Some(ActivityLevel::Low) | Some(ActivityLevel::None) => {
            "That's okay! Rest is just as important as movement. 💙"
        }
        None => "Thanks for sharing how active you've been! 🏃‍♀️",
    }
}
