pub mod calendar;
pub mod checkin;
pub mod config;
pub mod med;
pub mod streak;
pub mod user;
